//! Classified turn errors
//!
//! Every failure a user action can hit is one of these. They are recovered
//! at the turn boundary and shown to the user; none of them leaves a partial
//! message in a transcript.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors surfaced to the caller of a turn
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TurnError {
    #[error("No API key is configured. Set GEMINI_API_KEY or enter a key first.")]
    MissingCredential,
    #[error("Message text is empty")]
    EmptyInput,
    #[error("Role `{0}` cannot speak in this conversation")]
    InvalidRole(String),
    #[error("Remote generation failed: {0}")]
    RemoteGeneration(String),
    #[error("The model reply did not have the expected shape: {0}")]
    MalformedReply(String),
    #[error("A reply is already being generated for this conversation")]
    Busy,
    #[error("{0}")]
    UnsupportedAction(String),
    #[error("Session not found: {0}")]
    SessionNotFound(String),
}

impl TurnError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingCredential => ErrorKind::MissingCredential,
            Self::EmptyInput => ErrorKind::EmptyInput,
            Self::InvalidRole(_) => ErrorKind::InvalidRole,
            Self::RemoteGeneration(_) => ErrorKind::RemoteGeneration,
            Self::MalformedReply(_) => ErrorKind::MalformedReply,
            Self::Busy => ErrorKind::Busy,
            Self::UnsupportedAction(_) => ErrorKind::UnsupportedAction,
            Self::SessionNotFound(_) => ErrorKind::SessionNotFound,
        }
    }

    /// Suggestion shown next to the error when re-issuing the action may help
    pub fn retry_hint(&self) -> Option<&'static str> {
        match self {
            Self::RemoteGeneration(_) => {
                Some("Check that the API key is valid, then send the request again.")
            }
            Self::MalformedReply(_) => Some(
                "The model answered in an unexpected format. Press the button again to retry.",
            ),
            _ => None,
        }
    }
}

/// Serializable classification of a [`TurnError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    MissingCredential,
    EmptyInput,
    InvalidRole,
    RemoteGeneration,
    MalformedReply,
    Busy,
    UnsupportedAction,
    SessionNotFound,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::MissingCredential => "missing_credential",
            ErrorKind::EmptyInput => "empty_input",
            ErrorKind::InvalidRole => "invalid_role",
            ErrorKind::RemoteGeneration => "remote_generation",
            ErrorKind::MalformedReply => "malformed_reply",
            ErrorKind::Busy => "busy",
            ErrorKind::UnsupportedAction => "unsupported_action",
            ErrorKind::SessionNotFound => "session_not_found",
        }
    }
}
