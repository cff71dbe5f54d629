//! Migration analysis endpoints
//!
//! One analysis per file; lookups are keyed by the file id, not the
//! analysis id.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Router,
};
use codeshift_common::events::CodeshiftEvent;
use codeshift_common::models::{Analysis, NewAnalysis};

use crate::db;
use crate::error::{ApiError, ApiResult, Json};
use crate::AppState;

/// GET /api/analysis/:file_id
pub async fn get_analysis(
    State(state): State<AppState>,
    Path(file_id): Path<i64>,
) -> ApiResult<Json<Analysis>> {
    let analysis = db::analyses::get_analysis_by_file(&state.db, file_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Analysis for file {} not found", file_id)))?;

    Ok(Json(analysis))
}

/// POST /api/analysis
pub async fn create_analysis(
    State(state): State<AppState>,
    Json(new): Json<NewAnalysis>,
) -> ApiResult<(StatusCode, Json<Analysis>)> {
    let analysis = db::analyses::create_analysis(&state.db, &new).await?;

    state
        .event_bus
        .emit_lossy(CodeshiftEvent::AnalysisCreated(analysis.clone()));

    Ok((StatusCode::CREATED, Json(analysis)))
}

/// Build analysis routes
pub fn analysis_routes() -> Router<AppState> {
    Router::new()
        .route("/api/analysis/:file_id", get(get_analysis))
        .route("/api/analysis", post(create_analysis))
}
