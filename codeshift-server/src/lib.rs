//! codeshift-server library interface for testing
//!
//! Exposes public APIs for integration testing

pub mod api;
pub mod db;
pub mod error;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use codeshift_common::events::EventBus;
use services::translator::CodeTranslator;
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Event bus for SSE broadcasting
    pub event_bus: EventBus,
    /// Translation service client
    pub translator: Arc<dyn CodeTranslator>,
    /// Whether a translation API key was configured at startup
    pub api_configured: bool,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(
        db: SqlitePool,
        event_bus: EventBus,
        translator: Arc<dyn CodeTranslator>,
        api_configured: bool,
    ) -> Self {
        Self {
            db,
            event_bus,
            translator,
            api_configured,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    Router::new()
        .merge(api::health_routes())
        .merge(api::project_routes())
        .merge(api::file_routes())
        .merge(api::analysis_routes())
        .merge(api::migration_routes())
        .route("/api/events", get(api::event_stream))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
