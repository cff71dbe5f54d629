//! Translation service client
//!
//! Wraps the external chat-completions API. One network call per invocation;
//! the raw completion text is taken as the translated code verbatim — no
//! syntax check, no retry, no caching. The `CodeTranslator` trait is the
//! seam the pipeline and handlers depend on, so tests can substitute a mock.

use async_trait::async_trait;
use codeshift_common::config::ServerConfig;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Request timeout; a hung upstream call hangs the whole request, so this is
/// the only bound on end-to-end latency.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Translation/analysis call failure
#[derive(Debug, Error)]
pub enum TranslateError {
    /// Transport-level failure (connect, timeout, TLS)
    #[error("Translation service request failed: {0}")]
    Network(String),

    /// Service returned a non-success status
    #[error("Translation service error: {0}")]
    Api(String),

    /// Response body did not have the expected shape
    #[error("Failed to parse translation service response: {0}")]
    Parse(String),

    /// No API key configured
    #[error("Translation API key not configured")]
    NotConfigured,
}

/// Source/target language pairing for one request
#[derive(Debug, Clone)]
pub struct LanguagePair {
    pub source_language: String,
    pub source_version: Option<String>,
    pub target_language: String,
    pub target_version: Option<String>,
}

impl LanguagePair {
    /// "Python 3.8" or just "Python"
    pub fn source_label(&self) -> String {
        match &self.source_version {
            Some(v) => format!("{} {}", self.source_language, v),
            None => self.source_language.clone(),
        }
    }

    pub fn target_label(&self) -> String {
        match &self.target_version {
            Some(v) => format!("{} {}", self.target_language, v),
            None => self.target_language.clone(),
        }
    }
}

/// Optional per-file context included in the translation instruction
#[derive(Debug, Clone, Default)]
pub struct FileContext {
    pub file_name: Option<String>,
    pub file_path: Option<String>,
}

/// The seam between handlers/pipeline and the external service
#[async_trait]
pub trait CodeTranslator: Send + Sync {
    /// Translate one code snippet; the returned string is the target code
    async fn translate(
        &self,
        code: &str,
        pair: &LanguagePair,
        context: Option<&FileContext>,
    ) -> Result<String, TranslateError>;

    /// Structured per-file migration analysis (key changes, metrics, tests)
    async fn analyze_migration(
        &self,
        source_code: &str,
        target_code: &str,
        pair: &LanguagePair,
    ) -> Result<Value, TranslateError>;

    /// Unit tests validating that the target code preserves the source's
    /// behavior; returned as plain code text
    async fn generate_tests(
        &self,
        source_code: &str,
        target_code: &str,
        pair: &LanguagePair,
    ) -> Result<String, TranslateError>;

    /// Project-level report request. Returns the raw completion text; the
    /// summarizer owns parsing and its degraded fallback.
    async fn project_report(
        &self,
        payload: &Value,
        pair: &LanguagePair,
    ) -> Result<String, TranslateError>;
}

// ============================================================================
// Chat-completions wire types
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

/// Chat-completions API client
pub struct LlmClient {
    http_client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl LlmClient {
    pub fn new(config: &ServerConfig) -> Result<Self, TranslateError> {
        let http_client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| TranslateError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: config.api_base_url.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        })
    }

    /// One chat-completions round trip; returns the first choice's content
    async fn chat(
        &self,
        system: String,
        user: String,
        json_mode: bool,
        max_tokens: Option<u32>,
    ) -> Result<String, TranslateError> {
        let api_key = self.api_key.as_ref().ok_or(TranslateError::NotConfigured)?;

        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage { role: "system", content: system },
                ChatMessage { role: "user", content: user },
            ],
            temperature: if json_mode { 0.3 } else { 0.2 },
            max_tokens,
            response_format: json_mode.then_some(ResponseFormat { format_type: "json_object" }),
        };

        let url = format!("{}/chat/completions", self.base_url);
        debug!(model = %self.model, json_mode, "Sending chat completion request");

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| TranslateError::Network(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(TranslateError::Api(format!(
                "Service returned error {}: {}",
                status, body
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| TranslateError::Parse(format!("Invalid response body: {}", e)))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();

        Ok(content)
    }
}

#[async_trait]
impl CodeTranslator for LlmClient {
    async fn translate(
        &self,
        code: &str,
        pair: &LanguagePair,
        context: Option<&FileContext>,
    ) -> Result<String, TranslateError> {
        let mut system = format!(
            "You are an Intelligent Code Migration Agent specializing in migrating code from {} to {} \
             while preserving business logic and functionality.",
            pair.source_language, pair.target_language
        );

        if let Some(ctx) = context {
            system.push_str(&format!(
                "\n\nThis file is part of a larger project with the following context:\n\
                 - Source Language: {}\n\
                 - Target Language: {}\n",
                pair.source_label(),
                pair.target_label()
            ));
            if let Some(path) = &ctx.file_path {
                system.push_str(&format!("- File Path: {}\n", path));
            }
            if let Some(name) = &ctx.file_name {
                system.push_str(&format!("- File Name: {}\n", name));
            }
        }

        system.push_str(
            "\nUse appropriate idioms, patterns, and best practices for the target language. \
             Return only the migrated code without explanations.",
        );

        let user = format!(
            "Please migrate this {} code to {}:\n\n{}",
            pair.source_label(),
            pair.target_label(),
            code
        );

        self.chat(system, user, false, Some(4000)).await
    }

    async fn analyze_migration(
        &self,
        source_code: &str,
        target_code: &str,
        pair: &LanguagePair,
    ) -> Result<Value, TranslateError> {
        let system = format!(
            "You are an expert code reviewer specializing in analyzing code migrations from {} to {}. \
             Analyze the source and target code to identify key changes, performance implications, \
             and business logic preservation. Respond with a detailed analysis in JSON format.",
            pair.source_language, pair.target_language
        );

        let user = format!(
            "Source ({}):\n{}\n\nTarget ({}):\n{}\n\n\
             Provide a detailed analysis including: keyChanges (array of changes with category, \
             description, severity), performanceMetrics (object with ratings), \
             businessLogicPreservation (object with ratings), and generatedTests (string with example tests).",
            pair.source_language, source_code, pair.target_language, target_code
        );

        let content = self.chat(system, user, true, None).await?;
        serde_json::from_str(&content)
            .map_err(|e| TranslateError::Parse(format!("Analysis was not valid JSON: {}", e)))
    }

    async fn generate_tests(
        &self,
        source_code: &str,
        target_code: &str,
        pair: &LanguagePair,
    ) -> Result<String, TranslateError> {
        let system = format!(
            "You are an expert in writing tests for {} code. Generate comprehensive unit tests for \
             the provided code that validate all the key functionality and edge cases. Focus on \
             ensuring that the business logic from the original code is preserved in the migrated \
             code. Return only the test code.",
            pair.target_language
        );

        let user = format!(
            "Original {} code:\n{}\n\nMigrated {} code:\n{}\n\n\
             Generate unit tests that validate the migrated code preserves the functionality of the \
             original code.",
            pair.source_language, source_code, pair.target_language, target_code
        );

        self.chat(system, user, false, None).await
    }

    async fn project_report(
        &self,
        payload: &Value,
        pair: &LanguagePair,
    ) -> Result<String, TranslateError> {
        let system = format!(
            "You are an expert in code migration and analysis. Analyze this project migration from \
             {} to {}.\n\
             Generate a comprehensive analysis with the following sections:\n\
             1. Project Overview - High-level description of what the project appears to do\n\
             2. Migration Complexity - Assessment of how complex this migration is (Simple/Moderate/Complex)\n\
             3. Key Challenges - Major challenges in migrating this codebase\n\
             4. Recommended Changes - Recommended architectural or structural changes for the target language\n\
             5. Dependencies - List of likely dependencies needed in the target language\n\
             6. Testing Strategy - Recommended approach for testing the migrated code\n\n\
             Respond in JSON format with these sections as keys.",
            pair.source_language, pair.target_language
        );

        self.chat(system, payload.to_string(), true, None).await
    }
}
