//! HTTP endpoint layer.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/` | Static application form page |
//! | `POST` | `/folder-assist` | Scan a folder and extract form fields |
//! | `POST` | `/ai-assist` | Rewrite a free-text statement |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! # Status codes
//!
//! `/folder-assist` always answers `200`; callers branch on the presence of
//! an `error` key. `/ai-assist` uses `400` for blank input and `500` for
//! provider failures. Both error bodies look like `{"error": "..."}`.
//!
//! Request bodies are parsed leniently: anything that is not a JSON object
//! with the expected field is treated as if the field were missing.

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::assist::assist_folder;
use crate::config::Config;
use crate::error::AssistError;
use crate::llm::CompletionClient;
use crate::models::FolderAssistResponse;
use crate::rewrite::improve_text;

pub const PROVIDER_ERROR_MESSAGE: &str = "error while contacting the ai service";

const INDEX_HTML: &str = include_str!("../static/index.html");

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    /// LLM adapter, constructed once at startup.
    pub client: Arc<dyn CompletionClient>,
    /// Character cap for the text sent to the extraction prompt.
    pub max_chars: usize,
}

impl AppState {
    pub fn new(client: Arc<dyn CompletionClient>, max_chars: usize) -> Self {
        Self { client, max_chars }
    }
}

/// Builds the router without binding a socket.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handle_index))
        .route("/folder-assist", post(handle_folder_assist))
        .route("/ai-assist", post(handle_ai_assist))
        .route("/health", get(handle_health))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Binds `config.server.bind` and serves until the process is terminated.
pub async fn run_server(config: &Config, client: Arc<dyn CompletionClient>) -> anyhow::Result<()> {
    let state = AppState::new(client, config.extraction.max_chars);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    tracing::info!(bind = %config.server.bind, "admissions assistant listening");
    axum::serve(listener, app).await?;

    Ok(())
}

fn parse_lenient<T: DeserializeOwned + Default>(body: &[u8]) -> T {
    serde_json::from_slice(body).unwrap_or_default()
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

struct AppError {
    status: StatusCode,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}

impl From<AssistError> for AppError {
    fn from(err: AssistError) -> Self {
        match err {
            AssistError::EmptyInput(msg) => AppError {
                status: StatusCode::BAD_REQUEST,
                message: msg.to_string(),
            },
            _ => AppError {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                message: PROVIDER_ERROR_MESSAGE.to_string(),
            },
        }
    }
}

// ============ GET / ============

async fn handle_index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ POST /folder-assist ============

#[derive(Deserialize, Default)]
struct FolderAssistRequest {
    #[serde(default)]
    folder_path: Option<String>,
}

async fn handle_folder_assist(
    State(state): State<AppState>,
    body: Bytes,
) -> Json<FolderAssistResponse> {
    let request: FolderAssistRequest = parse_lenient(&body);
    let folder_path = request.folder_path.unwrap_or_default();

    let response = assist_folder(state.client.as_ref(), &folder_path, state.max_chars).await;
    Json(response)
}

// ============ POST /ai-assist ============

#[derive(Deserialize, Default)]
struct AiAssistRequest {
    #[serde(default)]
    raw_text: Option<String>,
}

#[derive(Serialize)]
struct AiAssistResponse {
    improved_text: String,
}

async fn handle_ai_assist(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<AiAssistResponse>, AppError> {
    let request: AiAssistRequest = parse_lenient(&body);
    let raw_text = request.raw_text.unwrap_or_default();

    // Provider detail stays in the log.
    let improved_text = improve_text(state.client.as_ref(), &raw_text)
        .await
        .inspect_err(|e| {
            if !matches!(e, AssistError::EmptyInput(_)) {
                tracing::error!(error = %e, "/ai-assist failed");
            }
        })?;
    Ok(Json(AiAssistResponse { improved_text }))
}
