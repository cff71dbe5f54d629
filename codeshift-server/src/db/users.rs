//! User database operations
//!
//! Users exist only as a foreign-key target for projects. There is no
//! session handling and no credential verification anywhere in the service.

use super::now_rfc3339;
use anyhow::Result;
use codeshift_common::models::{NewUser, User};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

fn user_from_row(row: &SqliteRow) -> User {
    User {
        id: row.get("id"),
        username: row.get("username"),
        password: row.get("password"),
        created_at: row.get("created_at"),
    }
}

/// Load a user by id
pub async fn get_user(pool: &SqlitePool, id: i64) -> Result<Option<User>> {
    let row = sqlx::query("SELECT * FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(row.as_ref().map(user_from_row))
}

/// Load a user by unique username
pub async fn get_user_by_username(pool: &SqlitePool, username: &str) -> Result<Option<User>> {
    let row = sqlx::query("SELECT * FROM users WHERE username = ?")
        .bind(username)
        .fetch_optional(pool)
        .await?;

    Ok(row.as_ref().map(user_from_row))
}

/// Insert a new user and return the stored record
pub async fn create_user(pool: &SqlitePool, new: &NewUser) -> Result<User> {
    let now = now_rfc3339();

    let result = sqlx::query("INSERT INTO users (username, password, created_at) VALUES (?, ?, ?)")
        .bind(&new.username)
        .bind(&new.password)
        .bind(&now)
        .execute(pool)
        .await?;

    let id = result.last_insert_rowid();
    let user = get_user(pool, id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("User {} vanished after insert", id))?;

    Ok(user)
}
