//! Migration endpoints: single-file translate, whole-project batch, and
//! test generation
//!
//! The single-file path fails the request when the translation service
//! fails. The batch path never does: per-file failures land in that file's
//! result entry and the response is still 200 with the project analysis.

use axum::{extract::State, routing::post, Router};
use codeshift_common::events::CodeshiftEvent;
use codeshift_common::models::{AnalysisUpdate, FileUpdate, NewAnalysis};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::db;
use crate::error::{ApiResult, Json};
use crate::services::heuristics::{self, ProcessingTimer};
use crate::services::pipeline::{self, ProjectFile};
use crate::services::summarizer;
use crate::services::translator::LanguagePair;
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrateRequest {
    pub source_code: String,
    pub source_language: String,
    pub target_language: String,
    pub source_version: Option<String>,
    pub target_version: Option<String>,
    pub file_name: Option<String>,
    pub migration_type: Option<String>,
    /// When present, the translated code and analysis are persisted against
    /// this stored file
    pub file_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrateProjectRequest {
    pub project_files: Vec<ProjectFile>,
    pub source_language: String,
    pub target_language: String,
    pub source_version: Option<String>,
    pub target_version: Option<String>,
    pub project_name: Option<String>,
    pub preserve_structure: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateTestsRequest {
    pub source_code: String,
    pub target_code: String,
    pub source_language: String,
    pub target_language: String,
    pub file_id: Option<i64>,
}

fn key_changes_list(analysis: &Value) -> Vec<Value> {
    analysis["keyChanges"]
        .as_array()
        .cloned()
        .unwrap_or_default()
}

/// POST /api/migrate
///
/// Translate one snippet, analyze the result, and (when a file id was
/// supplied) persist both against the stored file.
pub async fn migrate(
    State(state): State<AppState>,
    Json(req): Json<MigrateRequest>,
) -> ApiResult<Json<Value>> {
    let pair = LanguagePair {
        source_language: req.source_language,
        source_version: req.source_version,
        target_language: req.target_language,
        target_version: req.target_version,
    };

    let timer = ProcessingTimer::start();

    let migrated_code = state
        .translator
        .translate(&req.source_code, &pair, None)
        .await?;

    let analysis_data = state
        .translator
        .analyze_migration(&req.source_code, &migrated_code, &pair)
        .await?;

    let processing_time = timer.elapsed_ms();
    info!(
        source = %pair.source_language,
        target = %pair.target_language,
        processing_time_ms = processing_time,
        "Code migration completed"
    );

    if let Some(file_id) = req.file_id {
        let update = FileUpdate {
            target_code: Some(migrated_code.clone()),
            status: Some("completed".to_string()),
            processing_time: Some(processing_time),
            ..Default::default()
        };
        if db::files::update_file(&state.db, file_id, &update)
            .await?
            .is_none()
        {
            warn!(file_id, "Migration result not persisted: no such file");
        } else {
            let key_changes = key_changes_list(&analysis_data);
            let new_analysis = NewAnalysis {
                file_id,
                key_changes: Value::Array(key_changes.clone()),
                performance_metrics: analysis_data.get("performanceMetrics").cloned(),
                business_logic_preservation: analysis_data
                    .get("businessLogicPreservation")
                    .cloned(),
                generated_tests: analysis_data["generatedTests"].as_str().map(String::from),
                compatibility_score: Some(heuristics::compatibility_score(&key_changes)),
                security_issues: None,
                optimization_suggestions: None,
                migration_complexity: Some(
                    heuristics::migration_complexity(&req.source_code, &key_changes).to_string(),
                ),
            };
            db::analyses::create_analysis(&state.db, &new_analysis).await?;

            state.event_bus.emit_lossy(CodeshiftEvent::MigrationCompleted {
                file_id,
                status: "completed".to_string(),
            });
        }
    }

    Ok(Json(json!({
        "migratedCode": migrated_code,
        "analysis": analysis_data,
    })))
}

/// POST /api/migrate-project
///
/// Translate a whole batch of files and return per-file results plus a
/// project-level analysis. Always 200 once the batch is accepted.
pub async fn migrate_project(
    State(state): State<AppState>,
    Json(req): Json<MigrateProjectRequest>,
) -> ApiResult<Json<Value>> {
    let pair = LanguagePair {
        source_language: req.source_language,
        source_version: req.source_version,
        target_language: req.target_language,
        target_version: req.target_version,
    };

    info!(
        files = req.project_files.len(),
        source = %pair.source_language,
        target = %pair.target_language,
        "Starting project migration"
    );

    let outcomes =
        pipeline::migrate_project(state.translator.as_ref(), &req.project_files, &pair).await;

    let project_analysis =
        summarizer::project_analysis(state.translator.as_ref(), &req.project_files, &outcomes, &pair)
            .await;

    Ok(Json(json!({
        "results": outcomes,
        "projectAnalysis": project_analysis,
    })))
}

/// POST /api/generate-tests
///
/// Generate validation tests for an already-translated snippet. When a file
/// id is supplied and that file has an analysis, the tests replace the
/// analysis's stored tests.
pub async fn generate_tests(
    State(state): State<AppState>,
    Json(req): Json<GenerateTestsRequest>,
) -> ApiResult<Json<Value>> {
    let pair = LanguagePair {
        source_language: req.source_language,
        source_version: None,
        target_language: req.target_language,
        target_version: None,
    };

    let generated_tests = state
        .translator
        .generate_tests(&req.source_code, &req.target_code, &pair)
        .await?;

    if let Some(file_id) = req.file_id {
        if let Some(analysis) = db::analyses::get_analysis_by_file(&state.db, file_id).await? {
            let update = AnalysisUpdate {
                generated_tests: Some(generated_tests.clone()),
                ..Default::default()
            };
            db::analyses::update_analysis(&state.db, analysis.id, &update).await?;

            state.event_bus.emit_lossy(CodeshiftEvent::TestsGenerated {
                file_id,
                generated_tests: generated_tests.clone(),
            });
        }
    }

    Ok(Json(json!({ "generatedTests": generated_tests })))
}

/// Build migration routes
pub fn migration_routes() -> Router<AppState> {
    Router::new()
        .route("/api/migrate", post(migrate))
        .route("/api/migrate-project", post(migrate_project))
        .route("/api/generate-tests", post(generate_tests))
}
