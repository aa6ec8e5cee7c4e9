//! Member repository: profiles created by application approval.

use clubhouse_common::models::Member;
use clubhouse_membership::NewMember;
use sqlx::PgExecutor;
use uuid::Uuid;

pub async fn find_by_user<'e>(
    executor: impl PgExecutor<'e>,
    user_id: Uuid,
) -> Result<Option<Member>, sqlx::Error> {
    sqlx::query_as::<_, Member>("SELECT * FROM members WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(executor)
        .await
}

/// Insert a member row. Trips `members_user_id_key` if the user already has one.
pub async fn insert_member<'e>(executor: impl PgExecutor<'e>, new: &NewMember) -> Result<Member, sqlx::Error> {
    sqlx::query_as::<_, Member>(
        r#"
        INSERT INTO members (id, user_id, student_id, department_id, session_id,
                             learning_track_id, profile_image, joined_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING *
        "#,
    )
    .bind(new.id)
    .bind(new.user_id)
    .bind(&new.student_id)
    .bind(new.department_id)
    .bind(new.session_id)
    .bind(new.learning_track_id)
    .bind(new.profile_image.as_deref())
    .bind(new.joined_at)
    .fetch_one(executor)
    .await
}
