//! User repository: accounts and their role.

use clubhouse_common::models::{User, UserFilter, UserRole};
use clubhouse_common::pagination::{PageWindow, like_pattern};
use sqlx::{PgExecutor, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

/// Everything needed to insert an account.
#[derive(Debug, Clone)]
pub struct NewUser<'a> {
    pub id: Uuid,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub phone: Option<&'a str>,
    pub role: UserRole,
    pub is_verified: bool,
}

/// Create a user account.
pub async fn create_user<'e>(executor: impl PgExecutor<'e>, new: &NewUser<'_>) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (id, first_name, last_name, email, password_hash, phone, role,
                           is_active, is_verified, is_deleted, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, TRUE, $8, FALSE, NOW(), NOW())
        RETURNING *
        "#,
    )
    .bind(new.id)
    .bind(new.first_name)
    .bind(new.last_name)
    .bind(new.email)
    .bind(new.password_hash)
    .bind(new.phone)
    .bind(new.role)
    .bind(new.is_verified)
    .fetch_one(executor)
    .await
}

/// Find a user by their unique ID, deleted or not.
pub async fn find_by_id<'e>(executor: impl PgExecutor<'e>, id: Uuid) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(executor)
        .await
}

/// Find a user by email. Emails are stored lower-cased.
pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = LOWER($1)")
        .bind(email)
        .fetch_optional(pool)
        .await
}

pub async fn email_exists(pool: &PgPool, email: &str) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = LOWER($1))")
        .bind(email)
        .fetch_one(pool)
        .await
}

/// Self-service update. `None` keeps the current value.
pub async fn update_profile(
    pool: &PgPool,
    id: Uuid,
    first_name: Option<&str>,
    last_name: Option<&str>,
    phone: Option<&str>,
) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(
        r#"
        UPDATE users SET
            first_name = COALESCE($2, first_name),
            last_name = COALESCE($3, last_name),
            phone = COALESCE($4, phone),
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(first_name)
    .bind(last_name)
    .bind(phone)
    .fetch_one(pool)
    .await
}

/// Change a user's role and, when given, their phone.
pub async fn set_role<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
    role: UserRole,
    phone: Option<&str>,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        r#"
        UPDATE users SET
            role = $2,
            phone = COALESCE($3, phone),
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(role)
    .bind(phone)
    .fetch_optional(executor)
    .await
}

/// Soft delete: hide the account and block sign-in.
pub async fn soft_delete_user(pool: &PgPool, id: Uuid) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        r#"
        UPDATE users SET
            is_deleted = TRUE,
            is_active = FALSE,
            deleted_at = NOW(),
            updated_at = NOW()
        WHERE id = $1 AND is_deleted = FALSE
        RETURNING *
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

fn push_filter(query: &mut QueryBuilder<'_, Postgres>, filter: &UserFilter) {
    query.push(" WHERE is_deleted = FALSE");
    if let Some(term) = &filter.search {
        let pattern = like_pattern(term);
        query
            .push(" AND (first_name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR last_name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR email ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    if let Some(role) = filter.role {
        query.push(" AND role = ").push_bind(role);
    }
    if let Some(active) = filter.is_active {
        query.push(" AND is_active = ").push_bind(active);
    }
    if let Some(verified) = filter.is_verified {
        query.push(" AND is_verified = ").push_bind(verified);
    }
}

/// Page of non-deleted users, newest first unless asked otherwise.
pub async fn list_users(
    pool: &PgPool,
    filter: &UserFilter,
    window: &PageWindow,
) -> Result<Vec<User>, sqlx::Error> {
    let mut query = QueryBuilder::new("SELECT * FROM users");
    push_filter(&mut query, filter);
    query
        .push(" ORDER BY created_at ")
        .push(window.sort_order.as_sql())
        .push(", id ")
        .push(window.sort_order.as_sql())
        .push(" LIMIT ")
        .push_bind(i64::from(window.limit))
        .push(" OFFSET ")
        .push_bind(window.offset());
    query.build_query_as().fetch_all(pool).await
}

pub async fn count_users(pool: &PgPool, filter: &UserFilter) -> Result<i64, sqlx::Error> {
    let mut query = QueryBuilder::new("SELECT COUNT(*) FROM users");
    push_filter(&mut query, filter);
    query.build_query_scalar().fetch_one(pool).await
}
