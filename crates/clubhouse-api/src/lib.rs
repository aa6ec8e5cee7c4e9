//! # clubhouse-api
//!
//! REST API layer for Clubhouse. HTTP endpoints for authentication, OTP
//! verification, users, the membership application workflow and the club's
//! reference data and notices.

pub mod auth;
pub mod mailer;
pub mod middleware;
pub mod otp;
pub mod response;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::http::HeaderValue;
use clubhouse_common::config::AppConfig;
use clubhouse_db::{Database, PgStore};
use clubhouse_membership::MembershipService;
use tower_http::cors::{Any, CorsLayer};

use crate::mailer::LogMailer;
use crate::otp::{OtpService, RedisOtpCache};

/// Shared application state available to all route handlers.
pub struct AppState {
    pub db: Database,
    /// Membership application lifecycle over the Postgres store.
    pub membership: MembershipService<PgStore>,
    pub otp: OtpService<RedisOtpCache, LogMailer>,
}

impl AppState {
    pub fn new(db: Database, config: &AppConfig) -> Self {
        let membership = MembershipService::new(db.store());
        let otp = OtpService::new(
            RedisOtpCache::new(db.redis.clone()),
            LogMailer::new(config.mail.from.clone()),
            config.otp.clone(),
        );
        Self { db, membership, otp }
    }
}

fn cors(origin: &str) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    match origin {
        "*" => layer.allow_origin(Any),
        origin => match origin.parse::<HeaderValue>() {
            Ok(value) => layer.allow_origin(value),
            Err(_) => {
                tracing::warn!(origin, "Invalid CORS origin, allowing any");
                layer.allow_origin(Any)
            }
        },
    }
}

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState, config: &AppConfig) -> Router {
    let api_routes = Router::new()
        .merge(routes::otp::router())
        .merge(routes::auth::router())
        .merge(routes::users::router())
        .merge(routes::members::router())
        .merge(routes::departments::router())
        .merge(routes::sessions::router())
        .merge(routes::learning_tracks::router())
        .merge(routes::notices::router())
        .merge(routes::health::router());

    Router::new()
        .nest("/api/v1", api_routes)
        .layer(axum::middleware::from_fn(middleware::security_headers))
        .layer(cors(&config.server.cors_origin))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .layer(tower_http::compression::CompressionLayer::new())
        .with_state(Arc::new(state))
}
