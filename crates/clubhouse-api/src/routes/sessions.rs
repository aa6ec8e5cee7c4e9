//! Academic session routes.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get, post},
};
use clubhouse_common::{
    error::{ClubError, ClubResult},
    models::{CreateSessionRequest, Session},
    snowflake,
    validation::is_valid_session_name,
};
use clubhouse_db::repository::sessions;
use uuid::Uuid;

use crate::{
    AppState,
    middleware::{ADMIN, guarded},
    response::ApiResponse,
    routes::write_error,
};

pub fn router() -> Router<Arc<AppState>> {
    let public = Router::new().route("/sessions", get(list_sessions));
    let admin = Router::new()
        .route("/sessions", post(create_session))
        .route("/sessions/{session_id}", delete(delete_session));

    public.merge(guarded(admin, ADMIN))
}

async fn create_session(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateSessionRequest>,
) -> ClubResult<ApiResponse<Session>> {
    let name = body.name.trim();
    if !is_valid_session_name(name) {
        return Err(ClubError::validation(
            "Session must look like 23-24, ending one year after it starts",
        ));
    }

    let session = sessions::create_session(&state.db.pg, snowflake::generate_id(), name)
        .await
        .map_err(write_error("Session"))?;

    tracing::info!(session_id = %session.id, name = %session.name, "Session created");
    Ok(ApiResponse::created("Session created", session))
}

async fn list_sessions(State(state): State<Arc<AppState>>) -> ClubResult<ApiResponse<Vec<Session>>> {
    let rows = sessions::list_sessions(&state.db.pg).await?;
    Ok(ApiResponse::ok("Sessions retrieved", rows))
}

async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
) -> ClubResult<ApiResponse<()>> {
    if !sessions::soft_delete_session(&state.db.pg, session_id).await? {
        return Err(ClubError::not_found("Session"));
    }
    Ok(ApiResponse::ok("Session deleted", ()))
}
