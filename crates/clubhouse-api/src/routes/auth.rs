//! Account routes. Registration needs a verified email; login and refresh issue tokens.

use std::sync::Arc;

use axum::{Json, Router, extract::State, routing::post};
use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use clubhouse_common::{
    auth::validate_token,
    error::{ClubError, ClubResult},
    models::{LoginRequest, RegisterRequest, User, UserResponse, UserRole},
    snowflake,
    validation::{normalize_email, validate_request},
};
use clubhouse_db::repository::users::{self, NewUser};
use serde::{Deserialize, Serialize};

use crate::{
    AppState,
    auth::{self, TokenPair},
    middleware::{ACCESS_COOKIE, REFRESH_COOKIE},
    response::ApiResponse,
    routes::write_error,
};

/// Auth router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh_token))
}

#[derive(Serialize)]
struct AuthResponse {
    user: UserResponse,
    #[serde(flatten)]
    tokens: TokenPair,
}

#[derive(Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct RefreshRequest {
    refresh_token: Option<String>,
}

fn issue_tokens(user: &User) -> ClubResult<TokenPair> {
    let config = clubhouse_common::config::get();
    auth::generate_token_pair(
        user,
        &config.auth.jwt_secret,
        config.auth.access_token_ttl_secs,
        config.auth.refresh_token_ttl_secs,
    )
    .map_err(|e| ClubError::Internal(e.into()))
}

fn with_token_cookies(jar: CookieJar, tokens: &TokenPair) -> CookieJar {
    let cookie = |name: &'static str, value: &str| {
        Cookie::build((name, value.to_string()))
            .http_only(true)
            .secure(true)
            .same_site(SameSite::Lax)
            .path("/")
            .build()
    };
    jar.add(cookie(ACCESS_COOKIE, &tokens.access_token))
        .add(cookie(REFRESH_COOKIE, &tokens.refresh_token))
}

/// POST /api/v1/auth/register
///
/// Create a GUEST account for an email that just passed OTP verification.
async fn register(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RegisterRequest>,
) -> ClubResult<ApiResponse<UserResponse>> {
    validate_request(&body)?;
    let email = normalize_email(&body.email);

    if users::email_exists(&state.db.pg, &email).await? {
        return Err(ClubError::AlreadyExists {
            resource: "Email".into(),
        });
    }
    if !state.otp.consume_verified(&email).await? {
        return Err(ClubError::validation(
            "Verify your email with an OTP before registering",
        ));
    }

    let password_hash =
        auth::hash_password(&body.password).map_err(|e| ClubError::Internal(anyhow::anyhow!("{e}")))?;

    let user = users::create_user(
        &state.db.pg,
        &NewUser {
            id: snowflake::generate_id(),
            first_name: body.first_name.trim(),
            last_name: body.last_name.trim(),
            email: &email,
            password_hash: &password_hash,
            phone: None,
            role: UserRole::Guest,
            is_verified: true,
        },
    )
    .await
    .map_err(write_error("Email"))?;

    tracing::info!(user_id = %user.id, "New user registered");
    Ok(ApiResponse::created("Registration successful", user.into()))
}

/// POST /api/v1/auth/login
///
/// Authenticate with email + password. Tokens are returned and set as cookies.
async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(body): Json<LoginRequest>,
) -> ClubResult<(CookieJar, ApiResponse<AuthResponse>)> {
    validate_request(&body)?;

    let user = users::find_by_email(&state.db.pg, &normalize_email(&body.email))
        .await?
        .ok_or(ClubError::InvalidCredentials)?;

    let valid = auth::verify_password(&body.password, &user.password_hash)
        .map_err(|_| ClubError::InvalidCredentials)?;
    if !valid {
        return Err(ClubError::InvalidCredentials);
    }
    if !user.can_act() {
        return Err(ClubError::AccountDisabled);
    }

    let tokens = issue_tokens(&user)?;
    tracing::info!(user_id = %user.id, role = %user.role, "User logged in");

    let jar = with_token_cookies(jar, &tokens);
    Ok((
        jar,
        ApiResponse::ok("Login successful", AuthResponse {
            user: user.into(),
            tokens,
        }),
    ))
}

/// POST /api/v1/auth/refresh
///
/// Exchange a refresh token (body or cookie) for a new pair carrying the user's current role.
async fn refresh_token(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    body: Option<Json<RefreshRequest>>,
) -> ClubResult<(CookieJar, ApiResponse<TokenPair>)> {
    let config = clubhouse_common::config::get();
    let body = body.map(|Json(b)| b).unwrap_or_default();

    let token = body
        .refresh_token
        .or_else(|| jar.get(REFRESH_COOKIE).map(|c| c.value().to_string()))
        .ok_or(ClubError::Unauthorized)?;

    let claims =
        validate_token(&token, &config.auth.jwt_secret).map_err(|_| ClubError::InvalidToken)?;
    if claims.token_type != auth::REFRESH {
        return Err(ClubError::InvalidToken);
    }
    let user_id: uuid::Uuid = claims.sub.parse().map_err(|_| ClubError::InvalidToken)?;

    let user = users::find_by_id(&state.db.pg, user_id)
        .await?
        .ok_or(ClubError::InvalidToken)?;
    if !user.can_act() {
        return Err(ClubError::AccountDisabled);
    }

    let tokens = issue_tokens(&user)?;
    let jar = with_token_cookies(jar, &tokens);
    Ok((jar, ApiResponse::ok("Token refreshed", tokens)))
}
