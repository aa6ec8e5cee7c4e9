//! OTP routes: request and check an email verification code.

use std::sync::Arc;

use axum::{Json, Router, extract::State, routing::post};
use clubhouse_common::{
    error::{ClubError, ClubResult},
    validation::{normalize_email, validate_request},
};
use clubhouse_db::repository::users;
use serde::Deserialize;
use validator::Validate;

use crate::{AppState, response::ApiResponse};

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/otp/send", post(send_otp))
        .route("/otp/verify", post(verify_otp))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
struct SendOtpRequest {
    #[validate(email(message = "Invalid email format"))]
    email: String,
    #[validate(length(min = 1, max = 128, message = "Name is required"))]
    name: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
struct VerifyOtpRequest {
    #[validate(email(message = "Invalid email format"))]
    email: String,
    #[validate(length(min = 4, max = 9, message = "Invalid OTP"))]
    otp: String,
}

/// POST /api/v1/otp/send
async fn send_otp(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SendOtpRequest>,
) -> ClubResult<ApiResponse<()>> {
    validate_request(&body)?;
    let email = normalize_email(&body.email);

    if users::email_exists(&state.db.pg, &email).await? {
        return Err(ClubError::AlreadyExists {
            resource: "Account for this email".into(),
        });
    }

    state.otp.send(&email, &body.name).await?;
    Ok(ApiResponse::ok("OTP sent to your email", ()))
}

/// POST /api/v1/otp/verify
async fn verify_otp(
    State(state): State<Arc<AppState>>,
    Json(body): Json<VerifyOtpRequest>,
) -> ClubResult<ApiResponse<()>> {
    validate_request(&body)?;
    state.otp.verify(&body.email, &body.otp).await?;
    Ok(ApiResponse::ok("Email verified", ()))
}
