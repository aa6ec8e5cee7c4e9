//! Department routes.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get, post},
};
use clubhouse_common::{
    error::{ClubError, ClubResult},
    models::{CreateDepartmentRequest, Department, DepartmentSummary},
    snowflake,
    validation::{validate_name, validate_request},
};
use clubhouse_db::repository::departments;
use uuid::Uuid;

use crate::{
    AppState,
    middleware::{ADMIN, guarded},
    response::ApiResponse,
    routes::write_error,
};

pub fn router() -> Router<Arc<AppState>> {
    let public = Router::new()
        .route("/departments", get(list_departments))
        .route("/departments/{department_id}", get(get_department));

    let admin = Router::new()
        .route("/departments", post(create_department))
        .route("/departments/{department_id}", delete(delete_department));

    public.merge(guarded(admin, ADMIN))
}

async fn create_department(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateDepartmentRequest>,
) -> ClubResult<ApiResponse<Department>> {
    validate_request(&body)?;
    validate_name(&body.name)?;

    let department = departments::create_department(&state.db.pg, snowflake::generate_id(), body.name.trim())
        .await
        .map_err(write_error("Department"))?;

    tracing::info!(department_id = %department.id, name = %department.name, "Department created");
    Ok(ApiResponse::created("Department created", department))
}

async fn list_departments(
    State(state): State<Arc<AppState>>,
) -> ClubResult<ApiResponse<Vec<DepartmentSummary>>> {
    let rows = departments::list_departments(&state.db.pg).await?;
    Ok(ApiResponse::ok("Departments retrieved", rows))
}

async fn get_department(
    State(state): State<Arc<AppState>>,
    Path(department_id): Path<Uuid>,
) -> ClubResult<ApiResponse<Department>> {
    let department = departments::find_by_id(&state.db.pg, department_id)
        .await?
        .ok_or_else(|| ClubError::not_found("Department"))?;
    Ok(ApiResponse::ok("Department retrieved", department))
}

async fn delete_department(
    State(state): State<Arc<AppState>>,
    Path(department_id): Path<Uuid>,
) -> ClubResult<ApiResponse<()>> {
    if !departments::soft_delete_department(&state.db.pg, department_id).await? {
        return Err(ClubError::not_found("Department"));
    }
    tracing::info!(department_id = %department_id, "Department deleted");
    Ok(ApiResponse::ok("Department deleted", ()))
}
