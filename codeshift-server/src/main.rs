//! codeshift-server - Code Migration Service
//!
//! HTTP service that manages migration projects, stores their source files,
//! drives translation through an external chat-completions API, and
//! broadcasts change events to connected clients over SSE.

use anyhow::Result;
use codeshift_common::config::{ServerConfig, TomlConfig};
use codeshift_common::events::EventBus;
use codeshift_server::services::translator::LlmClient;
use codeshift_server::AppState;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting codeshift-server (Code Migration Service)");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let toml_config = TomlConfig::load(Path::new("codeshift.toml"))?;
    let config = ServerConfig::resolve(&toml_config)?;
    info!("Database: {}", config.database_path.display());
    info!("Model: {}", config.model);

    let db_pool = codeshift_server::db::init_database_pool(&config.database_path).await?;
    codeshift_server::db::init_tables(&db_pool).await?;
    info!("Database connection established");

    // Event bus for SSE broadcasting
    let event_bus = EventBus::new(100); // 100 event capacity
    info!("Event bus initialized");

    let translator =
        Arc::new(LlmClient::new(&config).map_err(|e| anyhow::anyhow!("{}", e))?);
    let api_configured = config.api_configured();

    let state = AppState::new(db_pool, event_bus, translator, api_configured);
    let app = codeshift_server::build_router(state);

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", config.port)).await?;
    info!("Listening on http://127.0.0.1:{}", config.port);
    info!("Health check: http://127.0.0.1:{}/health", config.port);

    axum::serve(listener, app).await?;

    Ok(())
}
