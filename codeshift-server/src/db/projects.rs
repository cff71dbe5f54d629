//! Project database operations

use super::now_rfc3339;
use anyhow::Result;
use codeshift_common::models::{NewProject, Project, ProjectUpdate};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

fn project_from_row(row: &SqliteRow) -> Project {
    Project {
        id: row.get("id"),
        name: row.get("name"),
        description: row.get("description"),
        migration_type: row.get("migration_type"),
        source_language: row.get("source_language"),
        source_version: row.get("source_version"),
        target_language: row.get("target_language"),
        target_version: row.get("target_version"),
        status: row.get("status"),
        total_files: row.get("total_files"),
        completed_files: row.get("completed_files"),
        failed_files: row.get("failed_files"),
        started_at: row.get("started_at"),
        completed_at: row.get("completed_at"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
        user_id: row.get("user_id"),
    }
}

/// Load a project by id
pub async fn get_project(pool: &SqlitePool, id: i64) -> Result<Option<Project>> {
    let row = sqlx::query("SELECT * FROM projects WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(row.as_ref().map(project_from_row))
}

/// List all projects, optionally scoped to one user
pub async fn list_projects(pool: &SqlitePool, user_id: Option<i64>) -> Result<Vec<Project>> {
    let rows = match user_id {
        Some(uid) => {
            sqlx::query("SELECT * FROM projects WHERE user_id = ? ORDER BY id")
                .bind(uid)
                .fetch_all(pool)
                .await?
        }
        None => {
            sqlx::query("SELECT * FROM projects ORDER BY id")
                .fetch_all(pool)
                .await?
        }
    };

    Ok(rows.iter().map(project_from_row).collect())
}

/// Insert a new project and return the stored record
pub async fn create_project(pool: &SqlitePool, new: &NewProject) -> Result<Project> {
    let now = now_rfc3339();
    let status = new.status.clone().unwrap_or_else(|| "pending".to_string());

    let result = sqlx::query(
        r#"
        INSERT INTO projects (
            name, description, migration_type,
            source_language, source_version, target_language, target_version,
            status, created_at, updated_at, user_id
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&new.name)
    .bind(&new.description)
    .bind(&new.migration_type)
    .bind(&new.source_language)
    .bind(&new.source_version)
    .bind(&new.target_language)
    .bind(&new.target_version)
    .bind(&status)
    .bind(&now)
    .bind(&now)
    .bind(new.user_id)
    .execute(pool)
    .await?;

    let id = result.last_insert_rowid();
    let project = get_project(pool, id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Project {} vanished after insert", id))?;

    Ok(project)
}

/// Apply a partial update; returns None when the project does not exist.
/// Last write wins, no versioning.
pub async fn update_project(
    pool: &SqlitePool,
    id: i64,
    update: &ProjectUpdate,
) -> Result<Option<Project>> {
    let Some(mut project) = get_project(pool, id).await? else {
        return Ok(None);
    };

    if let Some(val) = &update.name {
        project.name = val.clone();
    }
    if let Some(val) = &update.description {
        project.description = Some(val.clone());
    }
    if let Some(val) = &update.migration_type {
        project.migration_type = val.clone();
    }
    if let Some(val) = &update.source_language {
        project.source_language = val.clone();
    }
    if let Some(val) = &update.source_version {
        project.source_version = Some(val.clone());
    }
    if let Some(val) = &update.target_language {
        project.target_language = val.clone();
    }
    if let Some(val) = &update.target_version {
        project.target_version = Some(val.clone());
    }
    if let Some(val) = &update.status {
        project.status = val.clone();
    }
    if let Some(val) = update.total_files {
        project.total_files = val;
    }
    if let Some(val) = update.completed_files {
        project.completed_files = val;
    }
    if let Some(val) = update.failed_files {
        project.failed_files = val;
    }
    if let Some(val) = &update.started_at {
        project.started_at = Some(val.clone());
    }
    if let Some(val) = &update.completed_at {
        project.completed_at = Some(val.clone());
    }
    if let Some(val) = update.user_id {
        project.user_id = Some(val);
    }
    project.updated_at = now_rfc3339();

    sqlx::query(
        r#"
        UPDATE projects SET
            name = ?, description = ?, migration_type = ?,
            source_language = ?, source_version = ?,
            target_language = ?, target_version = ?,
            status = ?, total_files = ?, completed_files = ?, failed_files = ?,
            started_at = ?, completed_at = ?, updated_at = ?, user_id = ?
        WHERE id = ?
        "#,
    )
    .bind(&project.name)
    .bind(&project.description)
    .bind(&project.migration_type)
    .bind(&project.source_language)
    .bind(&project.source_version)
    .bind(&project.target_language)
    .bind(&project.target_version)
    .bind(&project.status)
    .bind(project.total_files)
    .bind(project.completed_files)
    .bind(project.failed_files)
    .bind(&project.started_at)
    .bind(&project.completed_at)
    .bind(&project.updated_at)
    .bind(project.user_id)
    .bind(id)
    .execute(pool)
    .await?;

    Ok(Some(project))
}

/// Delete a project plus its files and their analyses.
///
/// Sequential statements, not a transaction. Returns false when the project
/// does not exist or when any statement fails (error is logged, not raised).
pub async fn delete_project(pool: &SqlitePool, id: i64) -> bool {
    let result: Result<bool> = async {
        let file_ids: Vec<i64> =
            sqlx::query_scalar("SELECT id FROM files WHERE project_id = ?")
                .bind(id)
                .fetch_all(pool)
                .await?;

        for file_id in &file_ids {
            sqlx::query("DELETE FROM analyses WHERE file_id = ?")
                .bind(file_id)
                .execute(pool)
                .await?;
        }

        sqlx::query("DELETE FROM files WHERE project_id = ?")
            .bind(id)
            .execute(pool)
            .await?;

        let deleted = sqlx::query("DELETE FROM projects WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(deleted.rows_affected() > 0)
    }
    .await;

    match result {
        Ok(deleted) => deleted,
        Err(e) => {
            tracing::error!("Error deleting project {}: {}", id, e);
            false
        }
    }
}
