//! File database operations

use super::{json_to_text, now_rfc3339, text_to_json};
use anyhow::Result;
use codeshift_common::models::{FileUpdate, MigrationFile, NewFile};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

fn file_from_row(row: &SqliteRow) -> MigrationFile {
    MigrationFile {
        id: row.get("id"),
        project_id: row.get("project_id"),
        file_name: row.get("file_name"),
        file_path: row.get("file_path"),
        file_type: row.get("file_type"),
        file_size: row.get("file_size"),
        source_code: row.get("source_code"),
        target_code: row.get("target_code"),
        status: row.get("status"),
        processing_time: row.get("processing_time"),
        migration_errors: text_to_json(row.get("migration_errors")),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// Load a file by id
pub async fn get_file(pool: &SqlitePool, id: i64) -> Result<Option<MigrationFile>> {
    let row = sqlx::query("SELECT * FROM files WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(row.as_ref().map(file_from_row))
}

/// List all files attached to a project
pub async fn get_files_by_project(pool: &SqlitePool, project_id: i64) -> Result<Vec<MigrationFile>> {
    let rows = sqlx::query("SELECT * FROM files WHERE project_id = ? ORDER BY id")
        .bind(project_id)
        .fetch_all(pool)
        .await?;

    Ok(rows.iter().map(file_from_row).collect())
}

/// Insert a new file and return the stored record.
///
/// Missing file_type is derived from the file name; missing file_size is the
/// byte length of the source code.
pub async fn create_file(pool: &SqlitePool, new: &NewFile) -> Result<MigrationFile> {
    let now = now_rfc3339();
    let status = new.status.clone().unwrap_or_else(|| "pending".to_string());
    let file_type = new
        .file_type
        .clone()
        .unwrap_or_else(|| crate::services::heuristics::file_type(&new.file_name));
    let file_size = new
        .file_size
        .unwrap_or(new.source_code.len() as i64);

    let result = sqlx::query(
        r#"
        INSERT INTO files (
            project_id, file_name, file_path, file_type, file_size,
            source_code, target_code, status, created_at, updated_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(new.project_id)
    .bind(&new.file_name)
    .bind(&new.file_path)
    .bind(&file_type)
    .bind(file_size)
    .bind(&new.source_code)
    .bind(&new.target_code)
    .bind(&status)
    .bind(&now)
    .bind(&now)
    .execute(pool)
    .await?;

    let id = result.last_insert_rowid();
    let file = get_file(pool, id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("File {} vanished after insert", id))?;

    Ok(file)
}

/// Apply a partial update; returns None when the file does not exist
pub async fn update_file(
    pool: &SqlitePool,
    id: i64,
    update: &FileUpdate,
) -> Result<Option<MigrationFile>> {
    let Some(mut file) = get_file(pool, id).await? else {
        return Ok(None);
    };

    if let Some(val) = &update.file_name {
        file.file_name = val.clone();
    }
    if let Some(val) = &update.file_path {
        file.file_path = Some(val.clone());
    }
    if let Some(val) = &update.file_type {
        file.file_type = Some(val.clone());
    }
    if let Some(val) = update.file_size {
        file.file_size = Some(val);
    }
    if let Some(val) = &update.source_code {
        file.source_code = val.clone();
    }
    if let Some(val) = &update.target_code {
        file.target_code = Some(val.clone());
    }
    if let Some(val) = &update.status {
        file.status = val.clone();
    }
    if let Some(val) = update.processing_time {
        file.processing_time = Some(val);
    }
    if update.migration_errors.is_some() {
        file.migration_errors = update.migration_errors.clone();
    }
    file.updated_at = now_rfc3339();

    sqlx::query(
        r#"
        UPDATE files SET
            file_name = ?, file_path = ?, file_type = ?, file_size = ?,
            source_code = ?, target_code = ?, status = ?,
            processing_time = ?, migration_errors = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&file.file_name)
    .bind(&file.file_path)
    .bind(&file.file_type)
    .bind(file.file_size)
    .bind(&file.source_code)
    .bind(&file.target_code)
    .bind(&file.status)
    .bind(file.processing_time)
    .bind(json_to_text(&file.migration_errors))
    .bind(&file.updated_at)
    .bind(id)
    .execute(pool)
    .await?;

    Ok(Some(file))
}

/// Delete a file plus its analysis.
///
/// Same caller-driven cascade semantics as project deletion.
pub async fn delete_file(pool: &SqlitePool, id: i64) -> bool {
    let result: Result<bool> = async {
        sqlx::query("DELETE FROM analyses WHERE file_id = ?")
            .bind(id)
            .execute(pool)
            .await?;

        let deleted = sqlx::query("DELETE FROM files WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(deleted.rows_affected() > 0)
    }
    .await;

    match result {
        Ok(deleted) => deleted,
        Err(e) => {
            tracing::error!("Error deleting file {}: {}", id, e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codeshift_common::models::NewProject;

    async fn test_pool_with_project() -> (SqlitePool, i64) {
        let pool = SqlitePool::connect("sqlite::memory:")
            .await
            .expect("Failed to create in-memory database");
        crate::db::init_tables(&pool).await.unwrap();

        let project = crate::db::projects::create_project(
            &pool,
            &NewProject {
                name: "Payment Module".to_string(),
                description: None,
                migration_type: "framework-transition".to_string(),
                source_language: "Angular".to_string(),
                source_version: Some("11".to_string()),
                target_language: "React".to_string(),
                target_version: Some("18".to_string()),
                status: None,
                user_id: None,
            },
        )
        .await
        .unwrap();

        (pool, project.id)
    }

    #[tokio::test]
    async fn test_create_file_derives_type_and_size() {
        let (pool, project_id) = test_pool_with_project().await;

        let file = create_file(
            &pool,
            &NewFile {
                project_id,
                file_name: "app.py".to_string(),
                file_path: Some("src/app.py".to_string()),
                file_type: None,
                file_size: None,
                source_code: "print('hi')".to_string(),
                target_code: None,
                status: None,
            },
        )
        .await
        .unwrap();

        assert_eq!(file.file_type.as_deref(), Some("py"));
        assert_eq!(file.file_size, Some(11));
        assert_eq!(file.status, "pending");
    }

    #[tokio::test]
    async fn test_update_file_records_translation() {
        let (pool, project_id) = test_pool_with_project().await;
        let file = create_file(
            &pool,
            &NewFile {
                project_id,
                file_name: "main.py".to_string(),
                file_path: None,
                file_type: None,
                file_size: None,
                source_code: "print('hi')".to_string(),
                target_code: None,
                status: None,
            },
        )
        .await
        .unwrap();

        let update = FileUpdate {
            target_code: Some("console.log('hi');".to_string()),
            status: Some("completed".to_string()),
            processing_time: Some(1234),
            ..Default::default()
        };
        let updated = update_file(&pool, file.id, &update).await.unwrap().unwrap();

        assert_eq!(updated.target_code.as_deref(), Some("console.log('hi');"));
        assert_eq!(updated.status, "completed");
        assert_eq!(updated.processing_time, Some(1234));
        assert_eq!(updated.source_code, "print('hi')");
    }

    #[tokio::test]
    async fn test_migration_errors_json_round_trip() {
        let (pool, project_id) = test_pool_with_project().await;
        let file = create_file(
            &pool,
            &NewFile {
                project_id,
                file_name: "broken.py".to_string(),
                file_path: None,
                file_type: None,
                file_size: None,
                source_code: "???".to_string(),
                target_code: None,
                status: None,
            },
        )
        .await
        .unwrap();

        let update = FileUpdate {
            status: Some("failed".to_string()),
            migration_errors: Some(serde_json::json!({"message": "service timeout"})),
            ..Default::default()
        };
        update_file(&pool, file.id, &update).await.unwrap();

        let loaded = get_file(&pool, file.id).await.unwrap().unwrap();
        assert_eq!(
            loaded.migration_errors.unwrap()["message"],
            "service timeout"
        );
    }

    #[tokio::test]
    async fn test_delete_file_removes_analysis() {
        let (pool, project_id) = test_pool_with_project().await;
        let file = create_file(
            &pool,
            &NewFile {
                project_id,
                file_name: "x.py".to_string(),
                file_path: None,
                file_type: None,
                file_size: None,
                source_code: "pass".to_string(),
                target_code: None,
                status: None,
            },
        )
        .await
        .unwrap();

        crate::db::analyses::create_analysis(
            &pool,
            &codeshift_common::models::NewAnalysis {
                file_id: file.id,
                key_changes: serde_json::json!([]),
                performance_metrics: None,
                business_logic_preservation: None,
                generated_tests: None,
                compatibility_score: None,
                security_issues: None,
                optimization_suggestions: None,
                migration_complexity: None,
            },
        )
        .await
        .unwrap();

        assert!(delete_file(&pool, file.id).await);

        let analysis = crate::db::analyses::get_analysis_by_file(&pool, file.id)
            .await
            .unwrap();
        assert!(analysis.is_none());
    }
}
