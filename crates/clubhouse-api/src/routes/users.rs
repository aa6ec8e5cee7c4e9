//! User routes: the caller's own profile plus admin account management.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query, State},
    routing::{get, patch, post},
};
use chrono::Utc;
use clubhouse_common::{
    error::{ClubError, ClubResult},
    models::{
        CreateRoleUserRequest, MeResponse, NewRoleProfile, RoleProfile, UpdateMeRequest,
        UserFilter, UserResponse, UserRole,
    },
    pagination::{Paginated, SortOrder, search_term},
    snowflake,
    validation::{normalize_email, validate_request},
};
use clubhouse_db::repository::{
    members, profiles,
    users::{self, NewUser},
};
use clubhouse_membership::NewMember;
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    AppState, auth,
    middleware::{ADMIN, AuthContext, authenticated, guarded},
    response::ApiResponse,
    routes::{page_window, write_error},
};

pub fn router() -> Router<Arc<AppState>> {
    let own = Router::new().route("/users/me", get(get_me).patch(update_me));

    let admin = Router::new()
        .route("/users", get(list_users))
        .route("/users/role-user", post(create_role_user))
        .route("/users/{user_id}/soft-delete", patch(soft_delete_user));

    authenticated(own).merge(guarded(admin, ADMIN))
}

#[derive(Debug, Deserialize)]
struct ListUsersQuery {
    search: Option<String>,
    role: Option<UserRole>,
    is_active: Option<bool>,
    is_verified: Option<bool>,
    page: Option<u32>,
    limit: Option<u32>,
    sort_order: Option<SortOrder>,
}

/// GET /api/v1/users: search and filter live accounts.
async fn list_users(
    State(state): State<Arc<AppState>>,
    Query(q): Query<ListUsersQuery>,
) -> ClubResult<ApiResponse<Vec<UserResponse>>> {
    let window = page_window(q.page, q.limit, q.sort_order);
    let filter = UserFilter {
        search: search_term(q.search.as_deref()),
        role: q.role,
        is_active: q.is_active,
        is_verified: q.is_verified,
    };

    let rows = users::list_users(&state.db.pg, &filter, &window).await?;
    let total = users::count_users(&state.db.pg, &filter).await?;
    let data = rows.into_iter().map(UserResponse::from).collect();

    Ok(ApiResponse::page("Users retrieved", Paginated::new(&window, total, data)))
}

/// GET /api/v1/users/me: the caller plus their role profile.
async fn get_me(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
) -> ClubResult<ApiResponse<MeResponse>> {
    let user = users::find_by_id(&state.db.pg, auth.user_id)
        .await?
        .filter(|u| u.can_act())
        .ok_or_else(|| ClubError::not_found("User"))?;

    let profile = profiles::find_profile(&state.db.pg, user.id, user.role).await?;
    Ok(ApiResponse::ok("Profile retrieved", MeResponse::new(user, profile)))
}

/// PATCH /api/v1/users/me
async fn update_me(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<UpdateMeRequest>,
) -> ClubResult<ApiResponse<UserResponse>> {
    validate_request(&body)?;

    let user = users::update_profile(
        &state.db.pg,
        auth.user_id,
        body.first_name.as_deref().map(str::trim),
        body.last_name.as_deref().map(str::trim),
        body.phone.as_deref().map(str::trim),
    )
    .await?;

    Ok(ApiResponse::ok("Profile updated", user.into()))
}

/// POST /api/v1/users/role-user: create an account with a role and its profile.
async fn create_role_user(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateRoleUserRequest>,
) -> ClubResult<ApiResponse<MeResponse>> {
    let CreateRoleUserRequest { account, profile } = body;
    validate_request(&account)?;
    let email = normalize_email(&account.email);

    if users::email_exists(&state.db.pg, &email).await? {
        return Err(ClubError::AlreadyExists {
            resource: "Email".into(),
        });
    }
    let password_hash = auth::hash_password(&account.password)
        .map_err(|e| ClubError::Internal(anyhow::anyhow!("{e}")))?;

    let mut tx = state.db.pg.begin().await?;
    let user = users::create_user(
        &mut *tx,
        &NewUser {
            id: snowflake::generate_id(),
            first_name: account.first_name.trim(),
            last_name: account.last_name.trim(),
            email: &email,
            password_hash: &password_hash,
            phone: account.phone.as_deref().map(str::trim),
            role: profile.role(),
            is_verified: true,
        },
    )
    .await
    .map_err(write_error("Email"))?;

    let profile = match profile {
        NewRoleProfile::Admin(p) => RoleProfile::Admin(
            profiles::insert_admin(&mut *tx, snowflake::generate_id(), user.id, &p)
                .await
                .map_err(write_error("Admin profile"))?,
        ),
        NewRoleProfile::Mentor(p) => RoleProfile::Mentor(
            profiles::insert_mentor(&mut *tx, snowflake::generate_id(), user.id, &p)
                .await
                .map_err(write_error("Mentor profile"))?,
        ),
        NewRoleProfile::Moderator(p) => RoleProfile::Moderator(
            profiles::insert_moderator(&mut *tx, snowflake::generate_id(), user.id, &p)
                .await
                .map_err(write_error("Moderator profile"))?,
        ),
        NewRoleProfile::Member(p) => {
            let student_id = p.student_id.trim();
            if student_id.is_empty() {
                return Err(ClubError::validation("Student ID is required"));
            }
            let new = NewMember {
                id: snowflake::generate_id(),
                user_id: user.id,
                student_id: student_id.to_string(),
                department_id: p.department_id,
                session_id: p.session_id,
                learning_track_id: p.learning_track_id,
                profile_image: p.profile_image,
                joined_at: Utc::now(),
            };
            RoleProfile::Member(
                members::insert_member(&mut *tx, &new)
                    .await
                    .map_err(write_error("Member profile"))?,
            )
        }
    };
    tx.commit().await?;

    tracing::info!(user_id = %user.id, role = %user.role, "Role user created");
    Ok(ApiResponse::created("User created", MeResponse::new(user, Some(profile))))
}

/// PATCH /api/v1/users/{user_id}/soft-delete
async fn soft_delete_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
) -> ClubResult<ApiResponse<UserResponse>> {
    let target = users::find_by_id(&state.db.pg, user_id)
        .await?
        .filter(|u| !u.is_deleted)
        .ok_or_else(|| ClubError::not_found("User"))?;
    if target.role == UserRole::SuperAdmin {
        return Err(ClubError::Forbidden);
    }

    let user = users::soft_delete_user(&state.db.pg, user_id)
        .await?
        .ok_or_else(|| ClubError::not_found("User"))?;

    tracing::info!(user_id = %user.id, "User soft-deleted");
    Ok(ApiResponse::ok("User deleted", user.into()))
}
