//! Rewrite service: asks the LLM to polish a free-text statement.

use crate::error::AssistError;
use crate::llm::CompletionClient;
use crate::prompt::rewrite_request;

pub const NO_TEXT_PROVIDED: &str = "no text provided";

/// Returns the provider's rewrite of `raw_text` verbatim.
///
/// Blank input fails with [`AssistError::EmptyInput`] before any provider call.
pub async fn improve_text(
    client: &dyn CompletionClient,
    raw_text: &str,
) -> Result<String, AssistError> {
    if raw_text.trim().is_empty() {
        return Err(AssistError::EmptyInput(NO_TEXT_PROVIDED));
    }

    let improved = client.complete(&rewrite_request(raw_text)).await?;
    Ok(improved)
}
