//! Health check endpoint

use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;

use crate::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status (e.g., "ok")
    pub status: String,
    /// Module name ("codeshift-server")
    pub module: String,
    /// Crate version from Cargo.toml
    pub version: String,
    /// Seconds since service started
    pub uptime_seconds: u64,
    /// Whether a translation API key is configured
    pub api_configured: bool,
}

/// GET /health
///
/// Health check endpoint for monitoring. Reports whether the translation
/// API key was configured so clients can warn before attempting a migration.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let uptime = Utc::now().signed_duration_since(state.startup_time);
    let uptime_seconds = uptime.num_seconds().max(0) as u64;

    Json(HealthResponse {
        status: "ok".to_string(),
        module: "codeshift-server".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds,
        api_configured: state.api_configured,
    })
}

/// Build health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
