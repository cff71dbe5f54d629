//! Migration file CRUD endpoints
//!
//! `/api/files/:project_id` lists a project's files, so the single-file
//! lookup lives under `/api/files/single/:id` to keep the two path shapes
//! from colliding.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Router,
};
use codeshift_common::events::CodeshiftEvent;
use codeshift_common::models::{FileUpdate, MigrationFile, NewFile};

use crate::db;
use crate::error::{ApiError, ApiResult, Json};
use crate::AppState;

/// GET /api/files/:project_id
pub async fn list_project_files(
    State(state): State<AppState>,
    Path(project_id): Path<i64>,
) -> ApiResult<Json<Vec<MigrationFile>>> {
    let files = db::files::get_files_by_project(&state.db, project_id).await?;
    Ok(Json(files))
}

/// GET /api/files/single/:id
pub async fn get_file(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<MigrationFile>> {
    let file = db::files::get_file(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("File {} not found", id)))?;

    Ok(Json(file))
}

/// POST /api/files
pub async fn create_file(
    State(state): State<AppState>,
    Json(new): Json<NewFile>,
) -> ApiResult<(StatusCode, Json<MigrationFile>)> {
    let file = db::files::create_file(&state.db, &new).await?;

    state
        .event_bus
        .emit_lossy(CodeshiftEvent::FileCreated(file.clone()));

    Ok((StatusCode::CREATED, Json(file)))
}

/// PUT /api/files/:id
pub async fn update_file(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(update): Json<FileUpdate>,
) -> ApiResult<Json<MigrationFile>> {
    let file = db::files::update_file(&state.db, id, &update)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("File {} not found", id)))?;

    state
        .event_bus
        .emit_lossy(CodeshiftEvent::FileUpdated(file.clone()));

    Ok(Json(file))
}

/// DELETE /api/files/:id
pub async fn delete_file(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    if !db::files::delete_file(&state.db, id).await {
        return Err(ApiError::NotFound(format!("File {} not found", id)));
    }

    state.event_bus.emit_lossy(CodeshiftEvent::FileDeleted { id });

    Ok(StatusCode::NO_CONTENT)
}

/// Build file routes
///
/// GET on `/api/files/:id` takes a project id (it lists that project's
/// files); PUT and DELETE on the same path take a file id.
pub fn file_routes() -> Router<AppState> {
    Router::new()
        .route("/api/files", post(create_file))
        .route("/api/files/single/:id", get(get_file))
        .route(
            "/api/files/:id",
            get(list_project_files).put(update_file).delete(delete_file),
        )
}
