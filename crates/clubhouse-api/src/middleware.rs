//! Request middleware: token authentication and role guards.

use std::sync::Arc;

use axum::{
    Router,
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::{self, Next},
    response::Response,
};
use axum_extra::extract::CookieJar;
use clubhouse_common::auth::{Claims, validate_token};
use clubhouse_common::error::ClubError;
use clubhouse_common::models::UserRole;
use uuid::Uuid;

use crate::{AppState, auth};

/// Cookie the access token is also accepted from.
pub const ACCESS_COOKIE: &str = "access_token";
pub const REFRESH_COOKIE: &str = "refresh_token";

/// Roles accepted by admin-only routes. SUPER_ADMIN passes through [`UserRole::satisfies`].
pub const ADMIN: &[UserRole] = &[UserRole::Admin];
pub const GUEST: &[UserRole] = &[UserRole::Guest];

/// Authenticated caller, inserted into request extensions.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub email: String,
    pub role: UserRole,
}

impl AuthContext {
    /// Build the context from an access token's claims.
    pub fn from_claims(claims: Claims) -> Result<Self, ClubError> {
        if claims.token_type != auth::ACCESS {
            return Err(ClubError::InvalidToken);
        }
        let user_id = claims.sub.parse().map_err(|_| ClubError::InvalidToken)?;
        Ok(Self {
            user_id,
            email: claims.email,
            role: claims.role,
        })
    }

    /// Whether the caller holds one of `allowed`.
    pub fn allows(&self, allowed: &[UserRole]) -> bool {
        allowed.iter().any(|required| self.role.satisfies(*required))
    }
}

/// `Authorization: Bearer <token>` wins over the cookie.
pub fn access_token(headers: &HeaderMap, jar: &CookieJar) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .or_else(|| jar.get(ACCESS_COOKIE).map(|c| c.value().to_string()))
}

/// Validate the caller's access token and attach an [`AuthContext`].
pub async fn auth_middleware(
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, ClubError> {
    let token = access_token(request.headers(), &jar).ok_or(ClubError::Unauthorized)?;

    let config = clubhouse_common::config::get();
    let claims =
        validate_token(&token, &config.auth.jwt_secret).map_err(|_| ClubError::InvalidToken)?;
    let auth_ctx = AuthContext::from_claims(claims)?;

    request.extensions_mut().insert(auth_ctx);
    Ok(next.run(request).await)
}

/// Reject callers whose role is not in the allowed set. Runs after [`auth_middleware`].
pub async fn require_roles(
    State(allowed): State<&'static [UserRole]>,
    request: Request,
    next: Next,
) -> Result<Response, ClubError> {
    let auth_ctx = request
        .extensions()
        .get::<AuthContext>()
        .ok_or(ClubError::Unauthorized)?;
    if !auth_ctx.allows(allowed) {
        tracing::debug!(user_id = %auth_ctx.user_id, role = %auth_ctx.role, "Role guard rejected request");
        return Err(ClubError::Forbidden);
    }
    Ok(next.run(request).await)
}

/// Every route in `router` requires a valid access token.
pub fn authenticated(router: Router<Arc<AppState>>) -> Router<Arc<AppState>> {
    router.route_layer(middleware::from_fn(auth_middleware))
}

/// Every route in `router` requires a valid access token and one of `allowed`.
pub fn guarded(router: Router<Arc<AppState>>, allowed: &'static [UserRole]) -> Router<Arc<AppState>> {
    router
        .route_layer(middleware::from_fn_with_state(allowed, require_roles))
        .route_layer(middleware::from_fn(auth_middleware))
}

// ── Security headers ──────────────────────────────────────────────────────────

/// Add security headers to every HTTP response.
pub async fn security_headers(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let h = response.headers_mut();

    for (name, value) in [
        ("x-content-type-options", "nosniff"),
        ("x-frame-options", "DENY"),
        ("referrer-policy", "strict-origin-when-cross-origin"),
        ("strict-transport-security", "max-age=63072000; includeSubDomains"),
        ("content-security-policy", "default-src 'none'; frame-ancestors 'none'"),
    ] {
        h.insert(
            header::HeaderName::from_static(name),
            header::HeaderValue::from_static(value),
        );
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use axum_extra::extract::cookie::Cookie;

    fn ctx(role: UserRole) -> AuthContext {
        AuthContext {
            user_id: Uuid::now_v7(),
            email: "x@example.com".into(),
            role,
        }
    }

    fn claims(token_type: &str) -> Claims {
        Claims {
            sub: Uuid::now_v7().to_string(),
            email: "x@example.com".into(),
            role: UserRole::Member,
            iat: 0,
            exp: i64::MAX,
            token_type: token_type.into(),
        }
    }

    #[test]
    fn test_admin_guard() {
        assert!(ctx(UserRole::Admin).allows(ADMIN));
        assert!(ctx(UserRole::SuperAdmin).allows(ADMIN));
        assert!(!ctx(UserRole::Moderator).allows(ADMIN));
        assert!(!ctx(UserRole::Member).allows(ADMIN));
    }

    #[test]
    fn test_guest_guard_is_exact() {
        assert!(ctx(UserRole::Guest).allows(GUEST));
        assert!(!ctx(UserRole::Member).allows(GUEST));
        assert!(!ctx(UserRole::SuperAdmin).allows(GUEST));
    }

    #[test]
    fn test_refresh_token_is_not_an_access_token() {
        assert!(AuthContext::from_claims(claims(auth::ACCESS)).is_ok());
        assert!(matches!(
            AuthContext::from_claims(claims(auth::REFRESH)),
            Err(ClubError::InvalidToken)
        ));
    }

    #[test]
    fn test_garbage_subject_is_invalid() {
        let mut c = claims(auth::ACCESS);
        c.sub = "not-a-uuid".into();
        assert!(matches!(AuthContext::from_claims(c), Err(ClubError::InvalidToken)));
    }

    #[test]
    fn test_bearer_header_preferred_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer from-header"));
        let jar = CookieJar::new().add(Cookie::new(ACCESS_COOKIE, "from-cookie"));

        assert_eq!(access_token(&headers, &jar).as_deref(), Some("from-header"));
        assert_eq!(access_token(&HeaderMap::new(), &jar).as_deref(), Some("from-cookie"));
        assert_eq!(access_token(&HeaderMap::new(), &CookieJar::new()), None);
    }
}
