//! Integration tests for codeshift-server API endpoints
//!
//! Every test runs against an in-memory database and a scripted translator,
//! so no network access is needed.

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use codeshift_common::events::EventBus;
use codeshift_server::services::translator::{
    CodeTranslator, FileContext, LanguagePair, TranslateError,
};
use codeshift_server::AppState;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::util::ServiceExt;

/// Translator stub: deterministic output, no network
struct StubTranslator {
    fail: bool,
}

#[async_trait]
impl CodeTranslator for StubTranslator {
    async fn translate(
        &self,
        code: &str,
        pair: &LanguagePair,
        _context: Option<&FileContext>,
    ) -> Result<String, TranslateError> {
        if self.fail {
            return Err(TranslateError::Api("service unavailable".to_string()));
        }
        Ok(format!("// migrated to {}\n{}", pair.target_language, code))
    }

    async fn analyze_migration(
        &self,
        _source_code: &str,
        _target_code: &str,
        _pair: &LanguagePair,
    ) -> Result<Value, TranslateError> {
        if self.fail {
            return Err(TranslateError::Api("service unavailable".to_string()));
        }
        Ok(json!({
            "keyChanges": [
                {"category": "syntax", "description": "loop rewritten", "severity": "warning"}
            ],
            "performanceMetrics": {"memory": "similar"},
            "businessLogicPreservation": {"rating": "high"},
            "generatedTests": "assert true"
        }))
    }

    async fn generate_tests(
        &self,
        _source_code: &str,
        _target_code: &str,
        _pair: &LanguagePair,
    ) -> Result<String, TranslateError> {
        if self.fail {
            return Err(TranslateError::Api("service unavailable".to_string()));
        }
        Ok("def test_migrated(): assert True".to_string())
    }

    async fn project_report(
        &self,
        _payload: &Value,
        _pair: &LanguagePair,
    ) -> Result<String, TranslateError> {
        Ok(r#"{"projectOverview": "CLI tool", "migrationComplexity": "Simple"}"#.to_string())
    }
}

/// Test helper: create test app with in-memory database
async fn create_test_app_with(translator: StubTranslator) -> (axum::Router, sqlx::SqlitePool) {
    let pool = sqlx::SqlitePool::connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database");

    codeshift_server::db::init_tables(&pool)
        .await
        .expect("Failed to initialize database schema");

    let event_bus = EventBus::new(100);
    let state = AppState::new(pool.clone(), event_bus, Arc::new(translator), true);
    let app = codeshift_server::build_router(state);

    (app, pool)
}

async fn create_test_app() -> (axum::Router, sqlx::SqlitePool) {
    create_test_app_with(StubTranslator { fail: false }).await
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).expect("Response body should be JSON")
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn sample_project() -> Value {
    json!({
        "name": "Payments service",
        "migrationType": "framework-transition",
        "sourceLanguage": "Python",
        "sourceVersion": "3.8",
        "targetLanguage": "Go",
        "targetVersion": "1.21"
    })
}

async fn create_project(app: &axum::Router) -> Value {
    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/projects", sample_project()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

async fn create_file(app: &axum::Router, project_id: i64) -> Value {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/files",
            json!({
                "projectId": project_id,
                "fileName": "app.py",
                "filePath": "src/app.py",
                "sourceCode": "print('hello')"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

#[tokio::test]
async fn test_health_endpoint() {
    let (app, _pool) = create_test_app().await;

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "codeshift-server");
    assert_eq!(body["api_configured"], true);
}

#[tokio::test]
async fn test_project_crud_cycle() {
    let (app, _pool) = create_test_app().await;

    let project = create_project(&app).await;
    assert_eq!(project["name"], "Payments service");
    assert_eq!(project["status"], "pending");
    let id = project["id"].as_i64().unwrap();

    // Listed
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/projects")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let list = body_json(response).await;
    assert_eq!(list.as_array().unwrap().len(), 1);

    // Partial update
    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/projects/{}", id),
            json!({"status": "in-progress"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert_eq!(updated["status"], "in-progress");
    assert_eq!(updated["name"], "Payments service");

    // Delete
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(&format!("/api/projects/{}", id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // Gone
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(&format!("/api/projects/{}", id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_missing_project_returns_404_with_error_envelope() {
    let (app, _pool) = create_test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/projects/999")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_non_numeric_id_returns_400() {
    let (app, _pool) = create_test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/projects/abc")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_invalid_body_returns_400() {
    let (app, _pool) = create_test_app().await;

    // Required fields missing from the payload
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/projects",
            json!({"name": "incomplete"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "BAD_REQUEST");

    let response = app
        .oneshot(json_request("POST", "/api/files", json!({"projectId": 1})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_missing_project_returns_404() {
    let (app, _pool) = create_test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/projects/42")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_file_crud_and_type_derivation() {
    let (app, _pool) = create_test_app().await;

    let project = create_project(&app).await;
    let project_id = project["id"].as_i64().unwrap();

    let file = create_file(&app, project_id).await;
    assert_eq!(file["fileType"], "py");
    assert_eq!(file["status"], "pending");
    let file_id = file["id"].as_i64().unwrap();

    // Listed under the project
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(&format!("/api/files/{}", project_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let list = body_json(response).await;
    assert_eq!(list.as_array().unwrap().len(), 1);

    // Single-file lookup
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(&format!("/api/files/single/{}", file_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Update with translation
    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/files/{}", file_id),
            json!({"targetCode": "fmt.Println(\"hello\")", "status": "completed"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert_eq!(updated["status"], "completed");
}

#[tokio::test]
async fn test_project_delete_cascades_to_files_and_analyses() {
    let (app, pool) = create_test_app().await;

    let project = create_project(&app).await;
    let project_id = project["id"].as_i64().unwrap();
    let file = create_file(&app, project_id).await;
    let file_id = file["id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/analysis",
            json!({
                "fileId": file_id,
                "keyChanges": [{"category": "syntax", "severity": "info"}]
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(&format!("/api/projects/{}", project_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let files: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM files")
        .fetch_one(&pool)
        .await
        .unwrap();
    let analyses: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM analyses")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(files, 0);
    assert_eq!(analyses, 0);
}

#[tokio::test]
async fn test_analysis_lookup_is_by_file_id() {
    let (app, _pool) = create_test_app().await;

    let project = create_project(&app).await;
    let file = create_file(&app, project["id"].as_i64().unwrap()).await;
    let file_id = file["id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/analysis",
            json!({"fileId": file_id, "keyChanges": []}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(&format!("/api/analysis/{}", file_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let analysis = body_json(response).await;
    assert_eq!(analysis["fileId"], file_id);

    // No analysis for an unknown file
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/analysis/9999")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_migrate_returns_code_and_analysis() {
    let (app, _pool) = create_test_app().await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/migrate",
            json!({
                "sourceCode": "print('hello')",
                "sourceLanguage": "Python",
                "targetLanguage": "Go"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["migratedCode"]
        .as_str()
        .unwrap()
        .contains("migrated to Go"));
    assert!(body["analysis"]["keyChanges"].is_array());
}

#[tokio::test]
async fn test_migrate_with_file_id_persists_result() {
    let (app, _pool) = create_test_app().await;

    let project = create_project(&app).await;
    let file = create_file(&app, project["id"].as_i64().unwrap()).await;
    let file_id = file["id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/migrate",
            json!({
                "sourceCode": "print('hello')",
                "sourceLanguage": "Python",
                "targetLanguage": "Go",
                "fileId": file_id
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // File now carries the translation
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(&format!("/api/files/single/{}", file_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let stored = body_json(response).await;
    assert_eq!(stored["status"], "completed");
    assert!(stored["targetCode"].as_str().unwrap().contains("migrated"));
    assert!(stored["processingTime"].is_i64());

    // Analysis was created with locally computed score and complexity
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(&format!("/api/analysis/{}", file_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let analysis = body_json(response).await;
    // One warning change: 100 - 5
    assert_eq!(analysis["compatibilityScore"], 95);
    assert_eq!(analysis["migrationComplexity"], "low");
}

#[tokio::test]
async fn test_migrate_fails_when_service_fails() {
    let (app, _pool) = create_test_app_with(StubTranslator { fail: true }).await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/migrate",
            json!({
                "sourceCode": "print('hello')",
                "sourceLanguage": "Python",
                "targetLanguage": "Go"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "UPSTREAM_ERROR");
}

#[tokio::test]
async fn test_migrate_project_batch_succeeds_despite_failures() {
    let (app, _pool) = create_test_app_with(StubTranslator { fail: true }).await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/migrate-project",
            json!({
                "projectFiles": [
                    {"fileName": "app.py", "filePath": "app.py", "content": "x = 1"},
                    {"fileName": "logo.png", "filePath": "logo.png", "content": "<binary>"}
                ],
                "sourceLanguage": "Python",
                "targetLanguage": "Go"
            }),
        ))
        .await
        .unwrap();

    // Per-file failures never fail the batch
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["migrated"], false);
    assert!(results[0]["error"].is_string());
    assert_eq!(results[1]["migrated"], false);
    assert_eq!(results[1]["reason"], "File type doesn't require migration");

    let stats = &body["projectAnalysis"]["migrationStats"];
    assert_eq!(stats["totalFiles"], 2);
    assert_eq!(stats["migratedFiles"], 0);
    assert_eq!(stats["skippedFiles"], 1);
    assert_eq!(stats["failedFiles"], 1);
}

#[tokio::test]
async fn test_migrate_project_merges_report() {
    let (app, _pool) = create_test_app().await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/migrate-project",
            json!({
                "projectFiles": [
                    {"fileName": "app.py", "filePath": "app.py", "content": "x = 1"}
                ],
                "sourceLanguage": "Python",
                "targetLanguage": "Go"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["results"][0]["migrated"], true);
    assert_eq!(body["projectAnalysis"]["projectOverview"], "CLI tool");
    assert_eq!(body["projectAnalysis"]["migrationStats"]["migratedFiles"], 1);
}

#[tokio::test]
async fn test_generate_tests_updates_existing_analysis() {
    let (app, _pool) = create_test_app().await;

    let project = create_project(&app).await;
    let file = create_file(&app, project["id"].as_i64().unwrap()).await;
    let file_id = file["id"].as_i64().unwrap();

    // Seed an analysis without tests
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/analysis",
            json!({"fileId": file_id, "keyChanges": []}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/generate-tests",
            json!({
                "sourceCode": "print('hello')",
                "targetCode": "fmt.Println(\"hello\")",
                "sourceLanguage": "Python",
                "targetLanguage": "Go",
                "fileId": file_id
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["generatedTests"].as_str().unwrap().contains("assert"));

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(&format!("/api/analysis/{}", file_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let analysis = body_json(response).await;
    assert!(analysis["generatedTests"]
        .as_str()
        .unwrap()
        .contains("test_migrated"));
}

#[tokio::test]
async fn test_events_reach_sse_subscribers() {
    // Exercise the bus the same way the SSE handler consumes it
    let pool = sqlx::SqlitePool::connect("sqlite::memory:").await.unwrap();
    codeshift_server::db::init_tables(&pool).await.unwrap();
    let event_bus = EventBus::new(100);
    let mut rx = event_bus.subscribe();

    let state = AppState::new(
        pool,
        event_bus,
        Arc::new(StubTranslator { fail: false }),
        true,
    );
    let app = codeshift_server::build_router(state);

    let response = app
        .oneshot(json_request("POST", "/api/projects", sample_project()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let event = rx.try_recv().expect("Mutation should emit an event");
    assert_eq!(event.event_type(), "project_created");
    let envelope = serde_json::to_value(&event).unwrap();
    assert_eq!(envelope["type"], "project_created");
    assert_eq!(envelope["data"]["name"], "Payments service");
}
