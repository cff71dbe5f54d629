//! Database models and API payload types
//!
//! Wire format is camelCase to match the browser client; column names in the
//! database are snake_case. Timestamps are RFC 3339 TEXT. JSON columns
//! (key changes, metrics, error payloads) are stored as TEXT and surfaced as
//! `serde_json::Value`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Placeholder account record. No authentication logic exists; `user_id` on
/// projects is an optional foreign key and nothing verifies credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password: String,
    pub created_at: String,
}

/// A migration project: one source→target language/framework pairing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    /// One of: "version-upgrade", "framework-transition", "api-adaptation",
    /// "architectural-shift", "full-rewrite"
    pub migration_type: String,
    pub source_language: String,
    pub source_version: Option<String>,
    pub target_language: String,
    pub target_version: Option<String>,
    /// pending, in-progress, completed, failed
    pub status: String,
    pub total_files: i64,
    pub completed_files: i64,
    pub failed_files: i64,
    pub started_at: Option<String>,
    pub completed_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub user_id: Option<i64>,
}

/// One source file attached to a project, with its optional translation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationFile {
    pub id: i64,
    pub project_id: i64,
    pub file_name: String,
    pub file_path: Option<String>,
    pub file_type: Option<String>,
    pub file_size: Option<i64>,
    pub source_code: String,
    pub target_code: Option<String>,
    /// pending, completed, failed
    pub status: String,
    /// Milliseconds spent translating this file
    pub processing_time: Option<i64>,
    pub migration_errors: Option<Value>,
    pub created_at: String,
    pub updated_at: String,
}

/// Per-file translation quality report, one-to-one with a file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    pub id: i64,
    pub file_id: i64,
    pub key_changes: Value,
    pub performance_metrics: Option<Value>,
    pub business_logic_preservation: Option<Value>,
    pub generated_tests: Option<String>,
    /// 0-100
    pub compatibility_score: Option<i64>,
    pub security_issues: Option<Value>,
    pub optimization_suggestions: Option<Value>,
    /// low, medium, high
    pub migration_complexity: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

// ============================================================================
// Insert payloads
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProject {
    pub name: String,
    pub description: Option<String>,
    pub migration_type: String,
    pub source_language: String,
    pub source_version: Option<String>,
    pub target_language: String,
    pub target_version: Option<String>,
    pub status: Option<String>,
    pub user_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFile {
    pub project_id: i64,
    pub file_name: String,
    pub file_path: Option<String>,
    pub file_type: Option<String>,
    pub file_size: Option<i64>,
    pub source_code: String,
    pub target_code: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAnalysis {
    pub file_id: i64,
    pub key_changes: Value,
    pub performance_metrics: Option<Value>,
    pub business_logic_preservation: Option<Value>,
    pub generated_tests: Option<String>,
    pub compatibility_score: Option<i64>,
    pub security_issues: Option<Value>,
    pub optimization_suggestions: Option<Value>,
    pub migration_complexity: Option<String>,
}

// ============================================================================
// Partial update payloads (PUT bodies; absent fields keep current values)
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub migration_type: Option<String>,
    pub source_language: Option<String>,
    pub source_version: Option<String>,
    pub target_language: Option<String>,
    pub target_version: Option<String>,
    pub status: Option<String>,
    pub total_files: Option<i64>,
    pub completed_files: Option<i64>,
    pub failed_files: Option<i64>,
    pub started_at: Option<String>,
    pub completed_at: Option<String>,
    pub user_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileUpdate {
    pub file_name: Option<String>,
    pub file_path: Option<String>,
    pub file_type: Option<String>,
    pub file_size: Option<i64>,
    pub source_code: Option<String>,
    pub target_code: Option<String>,
    pub status: Option<String>,
    pub processing_time: Option<i64>,
    pub migration_errors: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisUpdate {
    pub key_changes: Option<Value>,
    pub performance_metrics: Option<Value>,
    pub business_logic_preservation: Option<Value>,
    pub generated_tests: Option<String>,
    pub compatibility_score: Option<i64>,
    pub security_issues: Option<Value>,
    pub optimization_suggestions: Option<Value>,
    pub migration_complexity: Option<String>,
}
