//! Database access for the codeshift server
//!
//! SQLite via sqlx. Four tables: users, projects, files, analyses.
//! Cascade deletes are performed by the caller-facing delete functions as
//! sequential statements, not foreign-key actions; a crash mid-delete can
//! leave orphaned rows (accepted, last-write-wins store).

pub mod analyses;
pub mod files;
pub mod projects;
pub mod users;

use anyhow::Result;
use sqlx::SqlitePool;
use std::path::Path;

/// Initialize database connection pool and schema
pub async fn init_database_pool(db_path: &Path) -> Result<SqlitePool> {
    // Ensure parent directory exists
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    // Proper SQLite URI with mode=rwc (read, write, create)
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    tracing::debug!("Connecting to database: {}", db_url);

    let pool = SqlitePool::connect(&db_url).await?;
    init_tables(&pool).await?;

    Ok(pool)
}

/// Create tables if they don't exist
///
/// Public so tests can initialize an in-memory pool.
pub async fn init_tables(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL UNIQUE,
            password TEXT NOT NULL,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS projects (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            description TEXT,
            migration_type TEXT NOT NULL,
            source_language TEXT NOT NULL,
            source_version TEXT,
            target_language TEXT NOT NULL,
            target_version TEXT,
            status TEXT NOT NULL DEFAULT 'pending',
            total_files INTEGER NOT NULL DEFAULT 0,
            completed_files INTEGER NOT NULL DEFAULT 0,
            failed_files INTEGER NOT NULL DEFAULT 0,
            started_at TEXT,
            completed_at TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            user_id INTEGER REFERENCES users(id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS files (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            project_id INTEGER NOT NULL REFERENCES projects(id),
            file_name TEXT NOT NULL,
            file_path TEXT,
            file_type TEXT,
            file_size INTEGER,
            source_code TEXT NOT NULL,
            target_code TEXT,
            status TEXT NOT NULL DEFAULT 'pending',
            processing_time INTEGER,
            migration_errors TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS analyses (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            file_id INTEGER NOT NULL REFERENCES files(id),
            key_changes TEXT NOT NULL,
            performance_metrics TEXT,
            business_logic_preservation TEXT,
            generated_tests TEXT,
            compatibility_score INTEGER,
            security_issues TEXT,
            optimization_suggestions TEXT,
            migration_complexity TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    tracing::info!("Database tables initialized (users, projects, files, analyses)");

    Ok(())
}

/// RFC 3339 timestamp for created_at/updated_at columns
pub(crate) fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Serialize an optional JSON column value to TEXT
pub(crate) fn json_to_text(value: &Option<serde_json::Value>) -> Option<String> {
    value.as_ref().map(|v| v.to_string())
}

/// Parse an optional JSON TEXT column back to a value.
///
/// Unparseable stored text becomes None rather than an error; these columns
/// are display-only payloads.
pub(crate) fn text_to_json(text: Option<String>) -> Option<serde_json::Value> {
    text.and_then(|t| serde_json::from_str(&t).ok())
}
