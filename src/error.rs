//! Error taxonomy for the folder pipeline and the rewrite service.
//!
//! Per-file extraction failures live in [`crate::extract::ExtractError`] and
//! are absorbed by the collector; everything here can reach a handler.

use std::path::PathBuf;
use thiserror::Error;

use crate::llm::LlmError;

#[derive(Debug, Error)]
pub enum AssistError {
    /// The requested folder is missing or not a directory.
    #[error("folder does not exist: {}", .0.display())]
    NotFound(PathBuf),

    /// Nothing to work with: blank input text or no readable text in a folder.
    #[error("{0}")]
    EmptyInput(&'static str),

    /// The provider answered, but not with a usable JSON object.
    #[error("ai service returned malformed json: {0}")]
    MalformedResponse(String),

    /// The blocking scan task panicked or was cancelled.
    #[error("folder scan aborted: {0}")]
    ScanAborted(#[from] tokio::task::JoinError),

    /// Network, auth, rate-limit or other provider-side failure.
    #[error("error while contacting the ai service: {0}")]
    Provider(#[from] LlmError),
}
