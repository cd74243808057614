//! LLM client adapter.
//!
//! [`CompletionClient`] is the seam the pipeline talks to: one request in,
//! one completion string (or a typed failure) out. [`OpenAIClient`] implements
//! it against any OpenAI-compatible `POST /chat/completions` endpoint.
//!
//! There is no retry and no streaming: every logical call is exactly one
//! HTTP round trip.

use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

use crate::config::LlmConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Constrains the shape of the completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponseFormat {
    JsonObject,
}

/// A provider-agnostic chat completion request. The model is chosen by the client.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_completion_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
}

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("API key not set (expected in ${0})")]
    MissingApiKey(String),
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("provider returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("invalid provider response: {0}")]
    InvalidResponse(String),
    #[error("provider returned an empty completion")]
    EmptyCompletion,
    #[error("completion was cut off by the token limit")]
    Truncated,
}

/// Single-shot chat completion.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Sends `request` and returns the text of the first choice.
    async fn complete(&self, request: &ChatRequest) -> Result<String, LlmError>;
}

/// Client for OpenAI-compatible chat completion APIs.
///
/// Built once at startup and shared read-only across requests.
pub struct OpenAIClient {
    http: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    api_key_env: String,
}

#[derive(Serialize)]
struct WireRequest<'a> {
    model: &'a str,
    #[serde(flatten)]
    request: &'a ChatRequest,
}

impl OpenAIClient {
    /// Creates a client. A missing `api_key` is not an error here; each call
    /// fails with [`LlmError::MissingApiKey`] instead.
    pub fn new(config: &LlmConfig, api_key: Option<String>) -> anyhow::Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            http: builder.build()?,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
            api_key,
            api_key_env: config.api_key_env.clone(),
        })
    }

    /// Creates a client whose key comes from `config.api_key_env`.
    pub fn from_env(config: &LlmConfig) -> anyhow::Result<Self> {
        let api_key = config.api_key_from_env();
        if api_key.is_none() {
            tracing::warn!(
                var = %config.api_key_env,
                "LLM API key not set; AI requests will fail until it is provided"
            );
        }
        Self::new(config, api_key)
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl CompletionClient for OpenAIClient {
    async fn complete(&self, request: &ChatRequest) -> Result<String, LlmError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| LlmError::MissingApiKey(self.api_key_env.clone()))?;

        let body = WireRequest {
            model: &self.model,
            request,
        };

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let json: serde_json::Value = response.json().await?;
        parse_completion(&json)
    }
}

/// Pulls `choices[0].message.content` out of a chat completion response.
fn parse_completion(json: &serde_json::Value) -> Result<String, LlmError> {
    let choice = json
        .get("choices")
        .and_then(|c| c.as_array())
        .and_then(|c| c.first())
        .ok_or_else(|| LlmError::InvalidResponse("missing choices array".to_string()))?;

    if choice.get("finish_reason").and_then(|f| f.as_str()) == Some("length") {
        return Err(LlmError::Truncated);
    }

    let content = choice
        .get("message")
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
        .ok_or(LlmError::EmptyCompletion)?;

    if content.is_empty() {
        return Err(LlmError::EmptyCompletion);
    }
    Ok(content.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_first_choice_content() {
        let body = json!({
            "choices": [
                { "message": { "role": "assistant", "content": "{\"name\":\"Ada\"}" }, "finish_reason": "stop" }
            ]
        });
        assert_eq!(parse_completion(&body).unwrap(), "{\"name\":\"Ada\"}");
    }

    #[test]
    fn length_finish_is_truncated() {
        let body = json!({
            "choices": [ { "message": { "content": "{\"name\":" }, "finish_reason": "length" } ]
        });
        assert!(matches!(parse_completion(&body), Err(LlmError::Truncated)));
    }

    #[test]
    fn missing_choices_is_invalid() {
        assert!(matches!(
            parse_completion(&json!({ "error": "x" })),
            Err(LlmError::InvalidResponse(_))
        ));
        assert!(matches!(
            parse_completion(&json!({ "choices": [] })),
            Err(LlmError::InvalidResponse(_))
        ));
    }

    #[test]
    fn null_content_is_empty_completion() {
        let body = json!({ "choices": [ { "message": { "content": null } } ] });
        assert!(matches!(parse_completion(&body), Err(LlmError::EmptyCompletion)));
    }

    #[test]
    fn wire_request_shape() {
        let request = ChatRequest {
            messages: vec![ChatMessage::system("sys"), ChatMessage::user("hi")],
            temperature: 0.25,
            max_completion_tokens: 500,
            response_format: Some(ResponseFormat::JsonObject),
        };
        let wire = serde_json::to_value(WireRequest {
            model: "gpt-4.1-mini",
            request: &request,
        })
        .unwrap();

        assert_eq!(wire["model"], "gpt-4.1-mini");
        assert_eq!(wire["messages"][0], json!({ "role": "system", "content": "sys" }));
        assert_eq!(wire["messages"][1]["role"], "user");
        assert_eq!(wire["temperature"], 0.25);
        assert_eq!(wire["max_completion_tokens"], 500);
        assert_eq!(wire["response_format"], json!({ "type": "json_object" }));
    }

    #[test]
    fn wire_request_omits_absent_response_format() {
        let request = ChatRequest {
            messages: vec![ChatMessage::user("hi")],
            temperature: 0.4,
            max_completion_tokens: 250,
            response_format: None,
        };
        let wire = serde_json::to_value(WireRequest {
            model: "m",
            request: &request,
        })
        .unwrap();
        assert!(wire.get("response_format").is_none());
    }

    #[tokio::test]
    async fn missing_key_fails_without_network() {
        let client = OpenAIClient::new(&LlmConfig::default(), None).unwrap();
        let request = crate::prompt::rewrite_request("text");
        assert!(matches!(
            client.complete(&request).await,
            Err(LlmError::MissingApiKey(_))
        ));
    }
}
