//! Academic session repository.

use clubhouse_common::models::Session;
use sqlx::PgPool;
use uuid::Uuid;

/// Create a session. Trips `sessions_name_key` on a duplicate name.
pub async fn create_session(pool: &PgPool, id: Uuid, name: &str) -> Result<Session, sqlx::Error> {
    sqlx::query_as::<_, Session>(
        r#"
        INSERT INTO sessions (id, name, is_deleted, created_at)
        VALUES ($1, $2, FALSE, NOW())
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(name)
    .fetch_one(pool)
    .await
}

/// Live sessions, newest first.
pub async fn list_sessions(pool: &PgPool) -> Result<Vec<Session>, sqlx::Error> {
    sqlx::query_as::<_, Session>(
        "SELECT * FROM sessions WHERE is_deleted = FALSE ORDER BY created_at DESC",
    )
    .fetch_all(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Session>, sqlx::Error> {
    sqlx::query_as::<_, Session>("SELECT * FROM sessions WHERE id = $1 AND is_deleted = FALSE")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn soft_delete_session(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE sessions SET is_deleted = TRUE, deleted_at = NOW() WHERE id = $1 AND is_deleted = FALSE",
    )
    .bind(id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}
