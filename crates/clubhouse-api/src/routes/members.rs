//! Membership application routes.
//!
//! Handlers only parse, check references and map errors; every state
//! transition goes through [`clubhouse_membership::MembershipService`].

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query, State},
    routing::{get, patch, post},
};
use clubhouse_common::{
    error::{ClubError, ClubResult},
    models::{
        ApplicationFilter, ApplicationListItem, ApplicationSortField, ApplicationStatus,
        MembershipApplication, RejectApplicationRequest, SubmitApplicationRequest,
    },
    pagination::{SortOrder, search_term},
    validation::validate_request,
};
use clubhouse_db::repository::{departments, learning_tracks, sessions};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    AppState,
    middleware::{ADMIN, AuthContext, GUEST, authenticated, guarded},
    response::ApiResponse,
    routes::page_window,
};

pub fn router() -> Router<Arc<AppState>> {
    let applicant = Router::new().route("/members/applications", post(submit_application));
    let own = Router::new().route("/members/applications/me", get(my_application));
    let admin = Router::new()
        .route("/members/applications", get(list_applications))
        .route("/members/applications/{application_id}/approve", patch(approve_application))
        .route("/members/applications/{application_id}/reject", patch(reject_application));

    guarded(applicant, GUEST)
        .merge(authenticated(own))
        .merge(guarded(admin, ADMIN))
}

/// Referenced rows must exist and not be soft-deleted.
async fn check_references(state: &AppState, body: &SubmitApplicationRequest) -> ClubResult<()> {
    if departments::find_by_id(&state.db.pg, body.department_id).await?.is_none() {
        return Err(ClubError::not_found("Department"));
    }
    if sessions::find_by_id(&state.db.pg, body.session_id).await?.is_none() {
        return Err(ClubError::not_found("Session"));
    }
    if let Some(track_id) = body.learning_track_id {
        let track = learning_tracks::find_by_id(&state.db.pg, track_id).await?;
        if !track.is_some_and(|t| t.is_active) {
            return Err(ClubError::not_found("Learning track"));
        }
    }
    Ok(())
}

/// POST /api/v1/members/applications: submit, or resubmit after a rejection.
async fn submit_application(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<SubmitApplicationRequest>,
) -> ClubResult<ApiResponse<MembershipApplication>> {
    validate_request(&body)?;
    let max_motivation = clubhouse_common::config::get().limits.max_motivation_length as usize;
    if body.motivation.as_ref().is_some_and(|m| m.chars().count() > max_motivation) {
        return Err(ClubError::validation(format!(
            "Motivation must be at most {max_motivation} characters"
        )));
    }
    check_references(&state, &body).await?;

    let application = state.membership.submit_application(auth.user_id, body).await?;
    Ok(ApiResponse::created("Application submitted", application))
}

/// GET /api/v1/members/applications/me
async fn my_application(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
) -> ClubResult<ApiResponse<MembershipApplication>> {
    let application = state.membership.my_application(auth.user_id).await?;
    Ok(ApiResponse::ok("Application retrieved", application))
}

#[derive(Debug, Deserialize)]
struct ListApplicationsQuery {
    search: Option<String>,
    status: Option<ApplicationStatus>,
    department_id: Option<Uuid>,
    session_id: Option<Uuid>,
    learning_track_id: Option<Uuid>,
    sort_by: Option<ApplicationSortField>,
    page: Option<u32>,
    limit: Option<u32>,
    sort_order: Option<SortOrder>,
}

/// GET /api/v1/members/applications
async fn list_applications(
    State(state): State<Arc<AppState>>,
    Query(q): Query<ListApplicationsQuery>,
) -> ClubResult<ApiResponse<Vec<ApplicationListItem>>> {
    let window = page_window(q.page, q.limit, q.sort_order);
    let filter = ApplicationFilter {
        search: search_term(q.search.as_deref()),
        status: q.status,
        department_id: q.department_id,
        session_id: q.session_id,
        learning_track_id: q.learning_track_id,
        sort_by: q.sort_by.unwrap_or_default(),
    };

    let page = state.membership.list_applications(&filter, &window).await?;
    Ok(ApiResponse::page("Applications retrieved", page))
}

/// PATCH /api/v1/members/applications/{application_id}/approve
async fn approve_application(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Path(application_id): Path<Uuid>,
) -> ClubResult<ApiResponse<MembershipApplication>> {
    let application = state.membership.approve_application(application_id).await?;
    tracing::info!(reviewer = %auth.user_id, application_id = %application.id, "Approved by admin");
    Ok(ApiResponse::ok("Application approved", application))
}

/// PATCH /api/v1/members/applications/{application_id}/reject
async fn reject_application(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Path(application_id): Path<Uuid>,
    Json(body): Json<RejectApplicationRequest>,
) -> ClubResult<ApiResponse<MembershipApplication>> {
    let application = state
        .membership
        .reject_application(application_id, &body.review_comment)
        .await?;
    tracing::info!(reviewer = %auth.user_id, application_id = %application.id, "Rejected by admin");
    Ok(ApiResponse::ok("Application rejected", application))
}
