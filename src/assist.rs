//! Folder pipeline: scan → prompt → LLM → form-data assembly.
//!
//! Every failure after input validation is folded into an
//! [`ErrorResult`](crate::models::ErrorResult), so callers always get a
//! well-formed response body.

use std::path::PathBuf;
use std::time::Instant;

use serde_json::Value;

use crate::collector::collect_text_from_folder;
use crate::error::AssistError;
use crate::llm::CompletionClient;
use crate::models::{
    CollectedText, ErrorResult, ExtractionFields, ExtractionResult, FolderAssistResponse,
};
use crate::prompt::{extraction_request, truncate_chars, FORM_FIELDS};

pub const NO_FOLDER_PATH: &str = "no folder path provided";
pub const NO_READABLE_TEXT: &str = "no readable text found";

/// Entry point for `/folder-assist`: validates the raw path, runs the
/// pipeline and stamps the elapsed time.
///
/// Blank or nonexistent paths produce an error without `files`.
pub async fn assist_folder(
    client: &dyn CompletionClient,
    folder_input: &str,
    max_chars: usize,
) -> FolderAssistResponse {
    let folder_input = folder_input.trim();
    if folder_input.is_empty() {
        return FolderAssistResponse::Failed(ErrorResult::bare(NO_FOLDER_PATH));
    }

    let folder = PathBuf::from(folder_input);
    if !folder.is_dir() {
        let err = AssistError::NotFound(folder);
        tracing::warn!(error = %err, "rejecting folder request");
        return FolderAssistResponse::Failed(ErrorResult::bare(err.to_string()));
    }

    let start = Instant::now();
    let mut response = analyse_folder(client, folder.clone(), max_chars).await;
    let elapsed = start.elapsed().as_secs_f64();

    if response.files().is_some() {
        response.set_elapsed(elapsed);
    }
    tracing::info!(
        folder = %folder.display(),
        elapsed_secs = elapsed,
        ok = response.error().is_none(),
        "folder analysis finished"
    );
    response
}

/// Scans `folder` and asks the LLM to fill the form from its text.
///
/// The returned value carries `elapsed_seconds = 0` until
/// [`assist_folder`] stamps it.
pub async fn analyse_folder(
    client: &dyn CompletionClient,
    folder: PathBuf,
    max_chars: usize,
) -> FolderAssistResponse {
    let collected = match scan_folder(folder.clone()).await {
        Ok(collected) => collected,
        Err(e) => {
            tracing::error!(folder = %folder.display(), error = %e, "folder scan failed");
            return FolderAssistResponse::Failed(ErrorResult::bare(e.to_string()));
        }
    };

    let CollectedText {
        combined_text,
        files,
    } = collected;

    match extract_fields(client, &combined_text, max_chars).await {
        Ok(fields) => FolderAssistResponse::Extracted(ExtractionResult {
            fields,
            files,
            elapsed_seconds: 0.0,
        }),
        Err(e) => {
            match &e {
                AssistError::EmptyInput(_) => {
                    tracing::warn!(folder = %folder.display(), "no readable text in folder")
                }
                _ => tracing::error!(folder = %folder.display(), error = %e, "extraction failed"),
            }
            FolderAssistResponse::Failed(ErrorResult {
                error: e.to_string(),
                files: Some(files),
                elapsed_seconds: None,
            })
        }
    }
}

/// Runs the blocking folder collector off the async executor.
pub async fn scan_folder(folder: PathBuf) -> Result<CollectedText, AssistError> {
    tokio::task::spawn_blocking(move || collect_text_from_folder(&folder)).await?
}

/// Sends the (truncated) combined text to the LLM and assembles the fields.
///
/// Blank text short-circuits with [`AssistError::EmptyInput`] without a call.
pub async fn extract_fields(
    client: &dyn CompletionClient,
    combined_text: &str,
    max_chars: usize,
) -> Result<ExtractionFields, AssistError> {
    if combined_text.trim().is_empty() {
        return Err(AssistError::EmptyInput(NO_READABLE_TEXT));
    }

    let text = truncate_chars(combined_text, max_chars);
    let raw = client.complete(&extraction_request(text)).await?;
    tracing::debug!(raw = %raw, "ai raw json");

    parse_extraction(&raw)
}

/// Parses the provider's completion and projects it onto the form fields.
///
/// Missing keys and `null` become empty strings, numbers and booleans are
/// rendered as text, and unknown keys are dropped. Anything that is not a
/// JSON object, or a field holding an array or object, is malformed.
pub fn parse_extraction(raw: &str) -> Result<ExtractionFields, AssistError> {
    let value: Value = serde_json::from_str(raw.trim())
        .map_err(|e| AssistError::MalformedResponse(e.to_string()))?;
    let object = value.as_object().ok_or_else(|| {
        AssistError::MalformedResponse("expected a JSON object".to_string())
    })?;

    for (key, v) in object {
        let nested = v.is_array() || v.is_object();
        if nested && FORM_FIELDS.contains(&key.as_str()) {
            return Err(AssistError::MalformedResponse(format!(
                "field '{}' is not a string",
                key
            )));
        }
    }

    Ok(ExtractionFields::from_fn(|name| match object.get(name) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }))
}
