//! Configuration loading for the codeshift server
//!
//! Resolution priority for every value: environment variable, then TOML
//! config file, then compiled default. There is no database tier; codeshift
//! has no settings UI.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Default listen port for the codeshift server
pub const DEFAULT_PORT: u16 = 5730;

/// Default chat-completions endpoint base URL
pub const DEFAULT_API_BASE_URL: &str = "https://api.openai.com/v1";

/// Default model requested for translation and analysis
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// TOML configuration file contents
///
/// All fields optional; missing values fall back to environment variables
/// and then to compiled defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    pub port: Option<u16>,
    pub database_path: Option<String>,
    pub api_base_url: Option<String>,
    pub api_key: Option<String>,
    pub model: Option<String>,
}

impl TomlConfig {
    /// Load a TOML config from `path`, returning defaults when the file is
    /// missing. A malformed file is a hard error rather than a silent default.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read config failed: {}", e)))?;
        toml::from_str(&content).map_err(|e| Error::Config(format!("Parse config failed: {}", e)))
    }
}

/// Fully resolved server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub database_path: PathBuf,
    pub api_base_url: String,
    pub api_key: Option<String>,
    pub model: String,
}

impl ServerConfig {
    /// Resolve configuration: ENV overrides TOML, TOML overrides defaults.
    ///
    /// Environment variables: `CODESHIFT_PORT`, `CODESHIFT_DATABASE_PATH`,
    /// `CODESHIFT_API_BASE_URL`, `CODESHIFT_API_KEY`, `CODESHIFT_MODEL`.
    pub fn resolve(toml_config: &TomlConfig) -> Result<Self> {
        let port = match std::env::var("CODESHIFT_PORT") {
            Ok(v) => v
                .parse::<u16>()
                .map_err(|_| Error::Config(format!("Invalid CODESHIFT_PORT: {}", v)))?,
            Err(_) => toml_config.port.unwrap_or(DEFAULT_PORT),
        };

        let database_path = std::env::var("CODESHIFT_DATABASE_PATH")
            .ok()
            .or_else(|| toml_config.database_path.clone())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("codeshift.db"));

        let api_base_url = std::env::var("CODESHIFT_API_BASE_URL")
            .ok()
            .or_else(|| toml_config.api_base_url.clone())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());

        let api_key = resolve_api_key(toml_config);

        let model = std::env::var("CODESHIFT_MODEL")
            .ok()
            .or_else(|| toml_config.model.clone())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        Ok(Self {
            port,
            database_path,
            api_base_url,
            api_key,
            model,
        })
    }

    /// Whether a translation API key is configured. Reported by the health
    /// endpoint; migration endpoints fail per-request when this is false.
    pub fn api_configured(&self) -> bool {
        self.api_key.as_deref().map(is_valid_key).unwrap_or(false)
    }
}

/// Resolve the translation API key from ENV then TOML.
///
/// Warns when both sources are set: the environment wins, and a stale TOML
/// key is a common misconfiguration.
fn resolve_api_key(toml_config: &TomlConfig) -> Option<String> {
    let env_key = std::env::var("CODESHIFT_API_KEY").ok().filter(|k| is_valid_key(k));
    let toml_key = toml_config.api_key.clone().filter(|k| is_valid_key(k));

    match (&env_key, &toml_key) {
        (Some(_), Some(_)) => {
            warn!("API key found in both environment and TOML config; using environment");
        }
        (Some(_), None) => info!("API key loaded from environment variable"),
        (None, Some(_)) => info!("API key loaded from TOML config"),
        (None, None) => {
            warn!("No API key configured; translation endpoints will return errors")
        }
    }

    env_key.or(toml_key)
}

/// Validate an API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}
