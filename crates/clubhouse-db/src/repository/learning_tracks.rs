//! Learning track repository.

use clubhouse_common::models::{
    CreateLearningTrackRequest, LearningTrack, LearningTrackFilter, UpdateLearningTrackRequest,
};
use clubhouse_common::pagination::{PageWindow, like_pattern};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

/// Create a track under an already-derived slug. Trips `learning_tracks_slug_key`
/// on a duplicate.
pub async fn create_track(
    pool: &PgPool,
    id: Uuid,
    slug: &str,
    req: &CreateLearningTrackRequest,
) -> Result<LearningTrack, sqlx::Error> {
    sqlx::query_as::<_, LearningTrack>(
        r#"
        INSERT INTO learning_tracks (id, name, slug, short_desc, long_desc, duration,
                                     difficulty, icon, is_active, is_deleted, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, FALSE, NOW(), NOW())
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(req.name.trim())
    .bind(slug)
    .bind(req.short_desc.as_deref())
    .bind(req.long_desc.as_deref())
    .bind(req.duration.as_deref())
    .bind(req.difficulty)
    .bind(req.icon.as_deref())
    .bind(req.is_active)
    .fetch_one(pool)
    .await
}

fn push_filter(query: &mut QueryBuilder<'_, Postgres>, filter: &LearningTrackFilter) {
    query.push(" WHERE is_deleted = FALSE");
    if let Some(term) = &filter.search {
        let pattern = like_pattern(term);
        query
            .push(" AND (name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR short_desc ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    if let Some(difficulty) = filter.difficulty {
        query.push(" AND difficulty = ").push_bind(difficulty);
    }
    if let Some(active) = filter.is_active {
        query.push(" AND is_active = ").push_bind(active);
    }
}

pub async fn list_tracks(
    pool: &PgPool,
    filter: &LearningTrackFilter,
    window: &PageWindow,
) -> Result<Vec<LearningTrack>, sqlx::Error> {
    let mut query = QueryBuilder::new("SELECT * FROM learning_tracks");
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

pub async fn count_tracks(pool: &PgPool, filter: &LearningTrackFilter) -> Result<i64, sqlx::Error> {
    let mut query = QueryBuilder::new("SELECT COUNT(*) FROM learning_tracks");
    push_filter(&mut query, filter);
    query.build_query_scalar().fetch_one(pool).await
}

pub async fn find_by_slug(pool: &PgPool, slug: &str) -> Result<Option<LearningTrack>, sqlx::Error> {
    sqlx::query_as::<_, LearningTrack>(
        "SELECT * FROM learning_tracks WHERE slug = $1 AND is_deleted = FALSE",
    )
    .bind(slug)
    .fetch_optional(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<LearningTrack>, sqlx::Error> {
    sqlx::query_as::<_, LearningTrack>(
        "SELECT * FROM learning_tracks WHERE id = $1 AND is_deleted = FALSE",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Apply the given fields. `None` if there is no live track with that ID.
pub async fn update_track(
    pool: &PgPool,
    id: Uuid,
    req: &UpdateLearningTrackRequest,
) -> Result<Option<LearningTrack>, sqlx::Error> {
    sqlx::query_as::<_, LearningTrack>(
        r#"
        UPDATE learning_tracks SET
            name = COALESCE($2, name),
            short_desc = COALESCE($3, short_desc),
            long_desc = COALESCE($4, long_desc),
            duration = COALESCE($5, duration),
            difficulty = COALESCE($6, difficulty),
            icon = COALESCE($7, icon),
            is_active = COALESCE($8, is_active),
            updated_at = NOW()
        WHERE id = $1 AND is_deleted = FALSE
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(req.name.as_deref().map(str::trim))
    .bind(req.short_desc.as_deref())
    .bind(req.long_desc.as_deref())
    .bind(req.duration.as_deref())
    .bind(req.difficulty)
    .bind(req.icon.as_deref())
    .bind(req.is_active)
    .fetch_optional(pool)
    .await
}

pub async fn soft_delete_track(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE learning_tracks SET is_deleted = TRUE, updated_at = NOW() WHERE id = $1 AND is_deleted = FALSE",
    )
    .bind(id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}
