//! Learning track routes. Public reads go by slug, admin writes by ID.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, patch, post},
};
use clubhouse_common::{
    error::{ClubError, ClubResult},
    models::{
        CreateLearningTrackRequest, Difficulty, LearningTrack, LearningTrackFilter,
        UpdateLearningTrackRequest,
    },
    pagination::{Paginated, SortOrder, search_term},
    snowflake,
    validation::{slugify, validate_request},
};
use clubhouse_db::repository::learning_tracks;
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    AppState,
    middleware::{ADMIN, guarded},
    response::ApiResponse,
    routes::{page_window, write_error},
};

pub fn router() -> Router<Arc<AppState>> {
    let public = Router::new()
        .route("/learning-tracks", get(list_tracks))
        .route("/learning-tracks/{slug}", get(get_track));

    let admin = Router::new()
        .route("/learning-tracks", post(create_track))
        .route("/learning-tracks/id/{track_id}", patch(update_track).delete(delete_track));

    public.merge(guarded(admin, ADMIN))
}

async fn create_track(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateLearningTrackRequest>,
) -> ClubResult<ApiResponse<LearningTrack>> {
    validate_request(&body)?;
    let slug = slugify(&body.name);
    if slug.is_empty() {
        return Err(ClubError::validation("Track name must contain letters or digits"));
    }

    let track = learning_tracks::create_track(&state.db.pg, snowflake::generate_id(), &slug, &body)
        .await
        .map_err(write_error("Learning track"))?;

    tracing::info!(track_id = %track.id, slug = %track.slug, "Learning track created");
    Ok(ApiResponse::created("Learning track created", track))
}

#[derive(Debug, Deserialize)]
struct ListTracksQuery {
    search: Option<String>,
    difficulty: Option<Difficulty>,
    is_active: Option<bool>,
    page: Option<u32>,
    limit: Option<u32>,
    sort_order: Option<SortOrder>,
}

async fn list_tracks(
    State(state): State<Arc<AppState>>,
    Query(q): Query<ListTracksQuery>,
) -> ClubResult<ApiResponse<Vec<LearningTrack>>> {
    let window = page_window(q.page, q.limit, q.sort_order);
    let filter = LearningTrackFilter {
        search: search_term(q.search.as_deref()),
        difficulty: q.difficulty,
        is_active: q.is_active,
    };

    let rows = learning_tracks::list_tracks(&state.db.pg, &filter, &window).await?;
    let total = learning_tracks::count_tracks(&state.db.pg, &filter).await?;
    Ok(ApiResponse::page(
        "Learning tracks retrieved",
        Paginated::new(&window, total, rows),
    ))
}

async fn get_track(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> ClubResult<ApiResponse<LearningTrack>> {
    let track = learning_tracks::find_by_slug(&state.db.pg, &slug)
        .await?
        .ok_or_else(|| ClubError::not_found("Learning track"))?;
    Ok(ApiResponse::ok("Learning track retrieved", track))
}

async fn update_track(
    State(state): State<Arc<AppState>>,
    Path(track_id): Path<Uuid>,
    Json(body): Json<UpdateLearningTrackRequest>,
) -> ClubResult<ApiResponse<LearningTrack>> {
    validate_request(&body)?;
    let track = learning_tracks::update_track(&state.db.pg, track_id, &body)
        .await?
        .ok_or_else(|| ClubError::not_found("Learning track"))?;
    Ok(ApiResponse::ok("Learning track updated", track))
}

async fn delete_track(
    State(state): State<Arc<AppState>>,
    Path(track_id): Path<Uuid>,
) -> ClubResult<ApiResponse<()>> {
    if !learning_tracks::soft_delete_track(&state.db.pg, track_id).await? {
        return Err(ClubError::not_found("Learning track"));
    }
    Ok(ApiResponse::ok("Learning track deleted", ()))
}
