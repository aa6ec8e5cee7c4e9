//! Notice board routes.
//!
//! The public list only shows published notices; admins list drafts too.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query, State},
    routing::{get, patch, post},
};
use clubhouse_common::{
    error::{ClubError, ClubResult},
    models::{CreateNoticeRequest, Notice, NoticeFilter, UpdateNoticeRequest},
    pagination::{Paginated, PageWindow, SortOrder, search_term},
    snowflake,
    validation::{validate_name, validate_request},
};
use clubhouse_db::repository::notices;
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    AppState,
    middleware::{ADMIN, AuthContext, guarded},
    response::ApiResponse,
    routes::page_window,
};

pub fn router() -> Router<Arc<AppState>> {
    let public = Router::new()
        .route("/notices", get(list_published))
        .route("/notices/{notice_id}", get(get_notice));

    let admin = Router::new()
        .route("/notices", post(create_notice))
        .route("/notices/admin", get(list_all))
        .route("/notices/{notice_id}", patch(update_notice).delete(delete_notice))
        .route("/notices/{notice_id}/publish", patch(publish_notice));

    public.merge(guarded(admin, ADMIN))
}

#[derive(Debug, Deserialize)]
struct ListNoticesQuery {
    title: Option<String>,
    published: Option<bool>,
    page: Option<u32>,
    limit: Option<u32>,
    sort_order: Option<SortOrder>,
}

async fn page_of(
    state: &AppState,
    filter: NoticeFilter,
    window: PageWindow,
) -> ClubResult<ApiResponse<Vec<Notice>>> {
    let rows = notices::list_notices(&state.db.pg, &filter, &window).await?;
    let total = notices::count_notices(&state.db.pg, &filter).await?;
    Ok(ApiResponse::page("Notices retrieved", Paginated::new(&window, total, rows)))
}

async fn list_published(
    State(state): State<Arc<AppState>>,
    Query(q): Query<ListNoticesQuery>,
) -> ClubResult<ApiResponse<Vec<Notice>>> {
    let filter = NoticeFilter {
        title: search_term(q.title.as_deref()),
        published: Some(true),
    };
    page_of(&state, filter, page_window(q.page, q.limit, q.sort_order)).await
}

async fn list_all(
    State(state): State<Arc<AppState>>,
    Query(q): Query<ListNoticesQuery>,
) -> ClubResult<ApiResponse<Vec<Notice>>> {
    let filter = NoticeFilter {
        title: search_term(q.title.as_deref()),
        published: q.published,
    };
    page_of(&state, filter, page_window(q.page, q.limit, q.sort_order)).await
}

async fn get_notice(
    State(state): State<Arc<AppState>>,
    Path(notice_id): Path<Uuid>,
) -> ClubResult<ApiResponse<Notice>> {
    let notice = notices::find_by_id(&state.db.pg, notice_id)
        .await?
        .ok_or_else(|| ClubError::not_found("Notice"))?;
    Ok(ApiResponse::ok("Notice retrieved", notice))
}

async fn create_notice(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    Json(body): Json<CreateNoticeRequest>,
) -> ClubResult<ApiResponse<Notice>> {
    validate_request(&body)?;
    validate_name(&body.title)?;

    let notice = notices::create_notice(
        &state.db.pg,
        snowflake::generate_id(),
        body.title.trim(),
        body.content.as_deref(),
        auth.user_id,
    )
    .await?;

    tracing::info!(notice_id = %notice.id, created_by = %auth.user_id, "Notice created");
    Ok(ApiResponse::created("Notice created", notice))
}

async fn update_notice(
    State(state): State<Arc<AppState>>,
    Path(notice_id): Path<Uuid>,
    Json(body): Json<UpdateNoticeRequest>,
) -> ClubResult<ApiResponse<Notice>> {
    validate_request(&body)?;
    if let Some(title) = &body.title {
        validate_name(title)?;
    }

    let notice = notices::update_notice(
        &state.db.pg,
        notice_id,
        body.title.as_deref().map(str::trim),
        body.content.as_deref(),
    )
    .await?
    .ok_or_else(|| ClubError::not_found("Notice"))?;
    Ok(ApiResponse::ok("Notice updated", notice))
}

async fn publish_notice(
    State(state): State<Arc<AppState>>,
    Path(notice_id): Path<Uuid>,
) -> ClubResult<ApiResponse<Notice>> {
    let notice = notices::publish_notice(&state.db.pg, notice_id)
        .await?
        .ok_or_else(|| ClubError::not_found("Notice"))?;
    tracing::info!(notice_id = %notice.id, "Notice published");
    Ok(ApiResponse::ok("Notice published", notice))
}

async fn delete_notice(
    State(state): State<Arc<AppState>>,
    Path(notice_id): Path<Uuid>,
) -> ClubResult<ApiResponse<()>> {
    if !notices::soft_delete_notice(&state.db.pg, notice_id).await? {
        return Err(ClubError::not_found("Notice"));
    }
    Ok(ApiResponse::ok("Notice deleted", ()))
}
