//! Role profile repository: admin, mentor and moderator rows.
//!
//! Member rows live in [`super::members`]; [`find_profile`] covers all four.

use clubhouse_common::models::{
    AdminProfile, MentorProfile, ModeratorProfile, NewAdminProfile, NewMentorProfile,
    NewModeratorProfile, ProfileKind, RoleProfile, UserRole,
};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use super::members;

pub async fn insert_admin<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
    user_id: Uuid,
    profile: &NewAdminProfile,
) -> Result<AdminProfile, sqlx::Error> {
    sqlx::query_as::<_, AdminProfile>(
        r#"
        INSERT INTO admins (id, user_id, admin_level, profile_image, created_at)
        VALUES ($1, $2, $3, $4, NOW())
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(profile.admin_level)
    .bind(profile.profile_image.as_deref())
    .fetch_one(executor)
    .await
}

pub async fn insert_mentor<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
    user_id: Uuid,
    profile: &NewMentorProfile,
) -> Result<MentorProfile, sqlx::Error> {
    sqlx::query_as::<_, MentorProfile>(
        r#"
        INSERT INTO mentors (id, user_id, expertise, bio, profile_image, created_at)
        VALUES ($1, $2, $3, $4, $5, NOW())
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(profile.expertise.as_deref())
    .bind(profile.bio.as_deref())
    .bind(profile.profile_image.as_deref())
    .fetch_one(executor)
    .await
}

pub async fn insert_moderator<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
    user_id: Uuid,
    profile: &NewModeratorProfile,
) -> Result<ModeratorProfile, sqlx::Error> {
    sqlx::query_as::<_, ModeratorProfile>(
        r#"
        INSERT INTO moderators (id, user_id, scope, created_at)
        VALUES ($1, $2, $3, NOW())
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(profile.scope.as_deref())
    .fetch_one(executor)
    .await
}

/// The profile row matching the user's current role, if one exists.
pub async fn find_profile(
    pool: &PgPool,
    user_id: Uuid,
    role: UserRole,
) -> Result<Option<RoleProfile>, sqlx::Error> {
    let Some(kind) = ProfileKind::for_role(role) else {
        return Ok(None);
    };

    let profile = match kind {
        ProfileKind::Admin => {
            sqlx::query_as::<_, AdminProfile>("SELECT * FROM admins WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(pool)
                .await?
                .map(RoleProfile::Admin)
        }
        ProfileKind::Member => members::find_by_user(pool, user_id)
            .await?
            .map(RoleProfile::Member),
        ProfileKind::Mentor => {
            sqlx::query_as::<_, MentorProfile>("SELECT * FROM mentors WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(pool)
                .await?
                .map(RoleProfile::Mentor)
        }
        ProfileKind::Moderator => {
            sqlx::query_as::<_, ModeratorProfile>("SELECT * FROM moderators WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(pool)
                .await?
                .map(RoleProfile::Moderator)
        }
    };
    Ok(profile)
}
