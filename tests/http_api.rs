//! End-to-end tests of the HTTP surface with a scripted LLM client.

use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use admissions_assist::llm::{ChatRequest, CompletionClient, LlmError, ResponseFormat};
use admissions_assist::prompt::FORM_FIELDS;
use admissions_assist::server::{build_router, AppState};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

/// Replies with a fixed string (or error) and counts calls.
struct MockLlm {
    reply: Result<String, ()>,
    calls: AtomicUsize,
}

impl MockLlm {
    fn replying(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(reply.to_string()),
            calls: AtomicUsize::new(0),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            reply: Err(()),
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionClient for MockLlm {
    async fn complete(&self, _request: &ChatRequest) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.reply.clone().map_err(|_| LlmError::Status {
            status: 429,
            body: "rate limited: org-secret-123".to_string(),
        })
    }
}

/// Checks the extraction request shape before answering.
struct StrictJsonLlm;

#[async_trait]
impl CompletionClient for StrictJsonLlm {
    async fn complete(&self, request: &ChatRequest) -> Result<String, LlmError> {
        assert_eq!(request.response_format, Some(ResponseFormat::JsonObject));
        Ok(r#"{"name":"Jane Doe","email":"jane@example.com","city":"Leeds"}"#.to_string())
    }
}

async fn post_json(client: Arc<dyn CompletionClient>, uri: &str, body: &str) -> (StatusCode, Value) {
    let app = build_router(AppState::new(client, 20_000));
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value: Value = serde_json::from_slice(&bytes).unwrap();
    (status, value)
}

fn folder_body(dir: &std::path::Path) -> String {
    json!({ "folder_path": dir.display().to_string() }).to_string()
}

#[tokio::test]
async fn folder_assist_success_has_exact_fields() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("cv.txt"), "Jane Doe\njane@example.com\nLeeds").unwrap();

    let (status, body) = post_json(
        Arc::new(StrictJsonLlm),
        "/folder-assist",
        &folder_body(dir.path()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let obj = body.as_object().unwrap();
    assert!(obj.get("error").is_none());
    for field in FORM_FIELDS {
        assert!(obj[*field].is_string(), "missing field {}", field);
    }
    assert_eq!(obj["name"], "Jane Doe");
    assert_eq!(obj["phone"], "");
    assert!(obj["elapsed_seconds"].is_f64());
    assert_eq!(obj.len(), FORM_FIELDS.len() + 2);

    let files = obj["files"].as_array().unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0]["filename"], "cv.txt");
    assert_eq!(files[0]["extension"], ".txt");
    assert_eq!(files[0]["had_text"], true);
}

#[tokio::test]
async fn folder_assist_blank_path() {
    let llm = MockLlm::replying("{}");
    let (status, body) = post_json(llm.clone(), "/folder-assist", r#"{"folder_path":"  "}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "error": "no folder path provided" }));
    assert_eq!(llm.calls(), 0);
}

#[tokio::test]
async fn folder_assist_unparseable_body_counts_as_missing_path() {
    let llm = MockLlm::replying("{}");
    let (status, body) = post_json(llm, "/folder-assist", "definitely not json").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["error"], "no folder path provided");
}

#[tokio::test]
async fn folder_assist_nonexistent_folder() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nobody-here");
    let llm = MockLlm::replying("{}");

    let (status, body) = post_json(llm.clone(), "/folder-assist", &folder_body(&missing)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "error": format!("folder does not exist: {}", missing.display()) })
    );
    assert_eq!(llm.calls(), 0);
}

#[tokio::test]
async fn folder_assist_no_readable_text() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("scan.pdf"), b"%PDF-garbage").unwrap();
    fs::write(dir.path().join("blank.txt"), "   ").unwrap();
    let llm = MockLlm::replying("{}");

    let (status, body) = post_json(llm.clone(), "/folder-assist", &folder_body(dir.path())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["error"], "no readable text found");
    assert_eq!(body["files"].as_array().unwrap().len(), 2);
    assert_eq!(llm.calls(), 0);
}

#[tokio::test]
async fn folder_assist_invalid_json_from_llm() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("cv.txt"), "Jane Doe").unwrap();
    let llm = MockLlm::replying("Here you go: name=Jane");

    let (status, body) = post_json(llm, "/folder-assist", &folder_body(dir.path())).await;
    assert_eq!(status, StatusCode::OK);

    let obj = body.as_object().unwrap();
    assert!(obj["error"].as_str().unwrap().contains("malformed json"));
    assert_eq!(obj["files"].as_array().unwrap().len(), 1);
    for field in FORM_FIELDS {
        assert!(obj.get(*field).is_none(), "field {} leaked into error payload", field);
    }
}

#[tokio::test]
async fn folder_assist_provider_failure() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("cv.txt"), "Jane Doe").unwrap();
    let llm = MockLlm::failing();

    let (status, body) = post_json(llm.clone(), "/folder-assist", &folder_body(dir.path())).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("error while contacting the ai service"));
    assert_eq!(body["files"][0]["filename"], "cv.txt");
    assert_eq!(llm.calls(), 1);
}

#[tokio::test]
async fn ai_assist_success() {
    let llm = MockLlm::replying("I am deeply motivated to study physics.");
    let (status, body) = post_json(llm, "/ai-assist", r#"{"raw_text":"i like physics"}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "improved_text": "I am deeply motivated to study physics." })
    );
}

#[tokio::test]
async fn ai_assist_empty_text_is_400_without_llm_call() {
    let llm = MockLlm::replying("unused");
    let (status, body) = post_json(llm.clone(), "/ai-assist", r#"{"raw_text":""}"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "no text provided" }));

    let (status, _) = post_json(llm.clone(), "/ai-assist", "{}").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(llm.calls(), 0);
}

#[tokio::test]
async fn ai_assist_provider_failure_is_generic_500() {
    let llm = MockLlm::failing();
    let (status, body) = post_json(llm, "/ai-assist", r#"{"raw_text":"hello"}"#).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "error while contacting the ai service" }));
    assert!(!body.to_string().contains("org-secret"));
}

#[tokio::test]
async fn index_and_health() {
    let app = build_router(AppState::new(MockLlm::replying("{}"), 20_000));

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = response.into_body().collect().await.unwrap().to_bytes();
    assert!(String::from_utf8_lossy(&html).contains("/folder-assist"));

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "ok");
}
