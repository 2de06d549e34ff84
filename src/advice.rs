//! Single-shot structured-advice flow
//!
//! One query, one model call, one strictly parsed reply. Nothing is kept
//! between requests.

mod parser;

pub use parser::{parse_reply, StructuredAdvice};

use crate::error::TurnError;
use crate::prompt::advice_request;
use crate::runtime::LlmClient;

/// Ask the advisor persona about `query`
pub async fn request_advice(llm: &dyn LlmClient, query: &str) -> Result<StructuredAdvice, TurnError> {
    if query.trim().is_empty() {
        return Err(TurnError::EmptyInput);
    }
    if !llm.has_credential() {
        return Err(TurnError::MissingCredential);
    }

    let request = advice_request(query);
    let response = llm
        .complete(&request)
        .await
        .map_err(|e| TurnError::RemoteGeneration(e.message))?;

    let advice = parse_reply(&response.text());
    match &advice {
        Ok(_) => tracing::info!(model = %llm.model_id(), "Advice generated"),
        Err(e) => tracing::warn!(model = %llm.model_id(), error = %e, "Advisor reply rejected"),
    }
    advice
}
