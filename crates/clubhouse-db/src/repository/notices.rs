//! Notice repository. Deleted notices are invisible to every read.

use clubhouse_common::models::{Notice, NoticeFilter};
use clubhouse_common::pagination::{PageWindow, like_pattern};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

pub async fn create_notice(
    pool: &PgPool,
    id: Uuid,
    title: &str,
    content: Option<&str>,
    created_by: Uuid,
) -> Result<Notice, sqlx::Error> {
    sqlx::query_as::<_, Notice>(
        r#"
        INSERT INTO notices (id, title, content, published, is_deleted, created_by, created_at, updated_at)
        VALUES ($1, $2, $3, FALSE, FALSE, $4, NOW(), NOW())
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(title)
    .bind(content)
    .bind(created_by)
    .fetch_one(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Notice>, sqlx::Error> {
    sqlx::query_as::<_, Notice>("SELECT * FROM notices WHERE id = $1 AND is_deleted = FALSE")
        .bind(id)
        .fetch_optional(pool)
        .await
}

fn push_filter(query: &mut QueryBuilder<'_, Postgres>, filter: &NoticeFilter) {
    query.push(" WHERE is_deleted = FALSE");
    if let Some(title) = &filter.title {
        query.push(" AND title ILIKE ").push_bind(like_pattern(title));
    }
    if let Some(published) = filter.published {
        query.push(" AND published = ").push_bind(published);
    }
}

/// Page of notices, newest first unless asked otherwise.
pub async fn list_notices(
    pool: &PgPool,
    filter: &NoticeFilter,
    window: &PageWindow,
) -> Result<Vec<Notice>, sqlx::Error> {
    let mut query = QueryBuilder::new("SELECT * FROM notices");
    push_filter(&mut query, filter);
    query
        .push(" ORDER BY created_at ")
        .push(window.sort_order.as_sql())
        .push(" LIMIT ")
        .push_bind(i64::from(window.limit))
        .push(" OFFSET ")
        .push_bind(window.offset());
    query.build_query_as().fetch_all(pool).await
}

pub async fn count_notices(pool: &PgPool, filter: &NoticeFilter) -> Result<i64, sqlx::Error> {
    let mut query = QueryBuilder::new("SELECT COUNT(*) FROM notices");
    push_filter(&mut query, filter);
    query.build_query_scalar().fetch_one(pool).await
}

pub async fn update_notice(
    pool: &PgPool,
    id: Uuid,
    title: Option<&str>,
    content: Option<&str>,
) -> Result<Option<Notice>, sqlx::Error> {
    sqlx::query_as::<_, Notice>(
        r#"
        UPDATE notices SET
            title = COALESCE($2, title),
            content = COALESCE($3, content),
            updated_at = NOW()
        WHERE id = $1 AND is_deleted = FALSE
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(title)
    .bind(content)
    .fetch_optional(pool)
    .await
}

/// Publish a notice, stamping the publication time.
pub async fn publish_notice(pool: &PgPool, id: Uuid) -> Result<Option<Notice>, sqlx::Error> {
    sqlx::query_as::<_, Notice>(
        r#"
        UPDATE notices SET
            published = TRUE,
            published_at = NOW(),
            updated_at = NOW()
        WHERE id = $1 AND is_deleted = FALSE
        RETURNING *
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn soft_delete_notice(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE notices SET is_deleted = TRUE, updated_at = NOW() WHERE id = $1 AND is_deleted = FALSE",
    )
    .bind(id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}
