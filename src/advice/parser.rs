//! Strict parser for the advisor's JSON reply

use crate::error::TurnError;
use serde::{Deserialize, Serialize};

/// Fence markers models like to wrap JSON in despite being told not to
const FENCE_MARKERS: [&str; 2] = ["```json", "```"];

/// Three-section answer of the advisor flow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredAdvice {
    #[serde(alias = "rongo")]
    pub philosophy: Philosophy,
    #[serde(alias = "soroban")]
    pub pragmatics: Pragmatics,
    pub synthesis: String,
}

/// Classical quotation and the attitude it teaches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Philosophy {
    pub title: String,
    pub text: String,
    pub meaning: String,
}

/// Business framework and the next concrete step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pragmatics {
    pub title: String,
    pub text: String,
    pub action: String,
}

/// Best-effort removal of fence markers by literal substring removal.
///
/// This is not a structural parse: a marker inside a string value is
/// removed as well. The strict parse that follows decides validity.
pub fn strip_fences(raw: &str) -> String {
    FENCE_MARKERS
        .iter()
        .fold(raw.trim().to_string(), |text, marker| text.replace(marker, ""))
        .trim()
        .to_string()
}

/// Parse a raw model reply into [`StructuredAdvice`].
///
/// Every one of the six leaf fields must be present and a string; anything
/// else is [`TurnError::MalformedReply`]. Nothing is defaulted.
pub fn parse_reply(raw: &str) -> Result<StructuredAdvice, TurnError> {
    let cleaned = strip_fences(raw);
    serde_json::from_str(&cleaned).map_err(|e| TurnError::MalformedReply(e.to_string()))
}
