//! Analysis database operations
//!
//! One analysis per file (one-to-one); lookups are by file id.

use super::{json_to_text, now_rfc3339, text_to_json};
use anyhow::Result;
use codeshift_common::models::{Analysis, AnalysisUpdate, NewAnalysis};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

fn analysis_from_row(row: &SqliteRow) -> Analysis {
    Analysis {
        id: row.get("id"),
        file_id: row.get("file_id"),
        key_changes: text_to_json(row.get("key_changes"))
            .unwrap_or_else(|| serde_json::Value::Array(vec![])),
        performance_metrics: text_to_json(row.get("performance_metrics")),
        business_logic_preservation: text_to_json(row.get("business_logic_preservation")),
        generated_tests: row.get("generated_tests"),
        compatibility_score: row.get("compatibility_score"),
        security_issues: text_to_json(row.get("security_issues")),
        optimization_suggestions: text_to_json(row.get("optimization_suggestions")),
        migration_complexity: row.get("migration_complexity"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// Load an analysis by id
pub async fn get_analysis(pool: &SqlitePool, id: i64) -> Result<Option<Analysis>> {
    let row = sqlx::query("SELECT * FROM analyses WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(row.as_ref().map(analysis_from_row))
}

/// Load the analysis attached to a file, if any
pub async fn get_analysis_by_file(pool: &SqlitePool, file_id: i64) -> Result<Option<Analysis>> {
    let row = sqlx::query("SELECT * FROM analyses WHERE file_id = ? LIMIT 1")
        .bind(file_id)
        .fetch_optional(pool)
        .await?;

    Ok(row.as_ref().map(analysis_from_row))
}

/// Insert a new analysis and return the stored record
pub async fn create_analysis(pool: &SqlitePool, new: &NewAnalysis) -> Result<Analysis> {
    let now = now_rfc3339();

    let result = sqlx::query(
        r#"
        INSERT INTO analyses (
            file_id, key_changes, performance_metrics, business_logic_preservation,
            generated_tests, compatibility_score, security_issues,
            optimization_suggestions, migration_complexity, created_at, updated_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(new.file_id)
    .bind(new.key_changes.to_string())
    .bind(json_to_text(&new.performance_metrics))
    .bind(json_to_text(&new.business_logic_preservation))
    .bind(&new.generated_tests)
    .bind(new.compatibility_score)
    .bind(json_to_text(&new.security_issues))
    .bind(json_to_text(&new.optimization_suggestions))
    .bind(&new.migration_complexity)
    .bind(&now)
    .bind(&now)
    .execute(pool)
    .await?;

    let id = result.last_insert_rowid();
    let analysis = get_analysis(pool, id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Analysis {} vanished after insert", id))?;

    Ok(analysis)
}

/// Apply a partial update; returns None when the analysis does not exist
pub async fn update_analysis(
    pool: &SqlitePool,
    id: i64,
    update: &AnalysisUpdate,
) -> Result<Option<Analysis>> {
    let Some(mut analysis) = get_analysis(pool, id).await? else {
        return Ok(None);
    };

    if let Some(val) = &update.key_changes {
        analysis.key_changes = val.clone();
    }
    if update.performance_metrics.is_some() {
        analysis.performance_metrics = update.performance_metrics.clone();
    }
    if update.business_logic_preservation.is_some() {
        analysis.business_logic_preservation = update.business_logic_preservation.clone();
    }
    if let Some(val) = &update.generated_tests {
        analysis.generated_tests = Some(val.clone());
    }
    if let Some(val) = update.compatibility_score {
        analysis.compatibility_score = Some(val);
    }
    if update.security_issues.is_some() {
        analysis.security_issues = update.security_issues.clone();
    }
    if update.optimization_suggestions.is_some() {
        analysis.optimization_suggestions = update.optimization_suggestions.clone();
    }
    if let Some(val) = &update.migration_complexity {
        analysis.migration_complexity = Some(val.clone());
    }
    analysis.updated_at = now_rfc3339();

    sqlx::query(
        r#"
        UPDATE analyses SET
            key_changes = ?, performance_metrics = ?, business_logic_preservation = ?,
            generated_tests = ?, compatibility_score = ?, security_issues = ?,
            optimization_suggestions = ?, migration_complexity = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(analysis.key_changes.to_string())
    .bind(json_to_text(&analysis.performance_metrics))
    .bind(json_to_text(&analysis.business_logic_preservation))
    .bind(&analysis.generated_tests)
    .bind(analysis.compatibility_score)
    .bind(json_to_text(&analysis.security_issues))
    .bind(json_to_text(&analysis.optimization_suggestions))
    .bind(&analysis.migration_complexity)
    .bind(&analysis.updated_at)
    .bind(id)
    .execute(pool)
    .await?;

    Ok(Some(analysis))
}
