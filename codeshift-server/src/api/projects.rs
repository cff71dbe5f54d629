//! Project CRUD endpoints
//!
//! Every successful mutation emits a change event on the bus before the
//! response is returned. Deleting a project removes its files and their
//! analyses as well.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Router,
};
use codeshift_common::events::CodeshiftEvent;
use codeshift_common::models::{NewProject, Project, ProjectUpdate};

use crate::db;
use crate::error::{ApiError, ApiResult, Json};
use crate::AppState;

/// GET /api/projects
pub async fn list_projects(State(state): State<AppState>) -> ApiResult<Json<Vec<Project>>> {
    let projects = db::projects::list_projects(&state.db, None).await?;
    Ok(Json(projects))
}

/// GET /api/projects/:id
pub async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Project>> {
    let project = db::projects::get_project(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Project {} not found", id)))?;

    Ok(Json(project))
}

/// POST /api/projects
pub async fn create_project(
    State(state): State<AppState>,
    Json(new): Json<NewProject>,
) -> ApiResult<(StatusCode, Json<Project>)> {
    let project = db::projects::create_project(&state.db, &new).await?;

    state
        .event_bus
        .emit_lossy(CodeshiftEvent::ProjectCreated(project.clone()));

    Ok((StatusCode::CREATED, Json(project)))
}

/// PUT /api/projects/:id
pub async fn update_project(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(update): Json<ProjectUpdate>,
) -> ApiResult<Json<Project>> {
    let project = db::projects::update_project(&state.db, id, &update)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Project {} not found", id)))?;

    state
        .event_bus
        .emit_lossy(CodeshiftEvent::ProjectUpdated(project.clone()));

    Ok(Json(project))
}

/// DELETE /api/projects/:id
pub async fn delete_project(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    if !db::projects::delete_project(&state.db, id).await {
        return Err(ApiError::NotFound(format!("Project {} not found", id)));
    }

    state
        .event_bus
        .emit_lossy(CodeshiftEvent::ProjectDeleted { id });

    Ok(StatusCode::NO_CONTENT)
}

/// Build project routes
pub fn project_routes() -> Router<AppState> {
    Router::new()
        .route("/api/projects", get(list_projects))
        .route("/api/projects", post(create_project))
        .route("/api/projects/:id", get(get_project))
        .route("/api/projects/:id", put(update_project))
        .route("/api/projects/:id", delete(delete_project))
}
