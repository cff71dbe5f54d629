//! Project-level migration report
//!
//! Builds the payload for the project analysis call (stats, file types, a
//! small sample of eligible sources) and merges the returned report with the
//! locally computed counters. The counters are authoritative: they are
//! always present and always computed from the outcomes, never taken from
//! the service response.

use crate::services::classifier::should_translate;
use crate::services::pipeline::{migration_stats, FileOutcome, ProjectFile};
use crate::services::translator::{CodeTranslator, LanguagePair};
use serde_json::{json, Map, Value};
use tracing::{error, warn};

/// At most this many source files go into the analysis payload, to keep the
/// request within the service's context limits.
const SAMPLE_SIZE: usize = 3;

fn unique_file_types(files: &[ProjectFile]) -> Vec<String> {
    let mut seen = Vec::new();
    for file in files {
        let file_type = match file.file_name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => format!(".{}", ext),
            _ => "no-extension".to_string(),
        };
        if !seen.contains(&file_type) {
            seen.push(file_type);
        }
    }
    seen
}

fn report_payload(
    files: &[ProjectFile],
    outcomes: &[FileOutcome],
    pair: &LanguagePair,
    stats_json: &Value,
) -> Value {
    let file_summaries: Vec<Value> = outcomes
        .iter()
        .map(|o| {
            let reason = o
                .reason
                .clone()
                .or_else(|| o.error.as_ref().map(|e| format!("Error: {}", e)));
            json!({
                "fileName": o.file_name,
                "migrated": o.migrated,
                "reason": reason,
            })
        })
        .collect();

    let sample_files: Vec<Value> = files
        .iter()
        .filter(|f| should_translate(&f.file_name))
        .take(SAMPLE_SIZE)
        .map(|f| json!({"fileName": f.file_name, "content": f.content}))
        .collect();

    json!({
        "projectInfo": {
            "sourceLanguage": pair.source_language,
            "targetLanguage": pair.target_language,
            "fileCount": files.len(),
            "fileTypes": unique_file_types(files),
            "migrationStats": stats_json,
        },
        "fileSummaries": file_summaries,
        "sampleFiles": sample_files,
    })
}

/// Generate the project-level analysis for a completed batch.
///
/// Never fails: when the service response is not valid JSON the report
/// degrades to a fixed overview with "Unknown" complexity, and when the call
/// itself fails the report carries the error text. The migration counters
/// are included in every case.
pub async fn project_analysis(
    translator: &dyn CodeTranslator,
    files: &[ProjectFile],
    outcomes: &[FileOutcome],
    pair: &LanguagePair,
) -> Value {
    let stats = migration_stats(outcomes);
    let stats_json = serde_json::to_value(stats).unwrap_or_else(|_| json!({}));

    let payload = report_payload(files, outcomes, pair, &stats_json);

    match translator.project_report(&payload, pair).await {
        Ok(body) => match serde_json::from_str::<Map<String, Value>>(&body) {
            Ok(mut report) => {
                report.insert("migrationStats".to_string(), stats_json);
                Value::Object(report)
            }
            Err(e) => {
                warn!(error = %e, "Project analysis was not valid JSON, returning degraded report");
                json!({
                    "projectOverview": "Analysis could not be generated",
                    "migrationComplexity": "Unknown",
                    "migrationStats": stats_json,
                })
            }
        },
        Err(e) => {
            error!(error = %e, "Project analysis request failed");
            json!({
                "projectOverview": "Error generating analysis",
                "error": e.to_string(),
                "migrationStats": stats_json,
            })
        }
    }
}
