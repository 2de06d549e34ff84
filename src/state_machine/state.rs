//! Session state types

use crate::error::ErrorKind;
use crate::persona::Flow;
use serde::{Deserialize, Serialize};

/// Turn-taking state of one session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TurnState {
    /// Ready for the next human turn or AI request
    #[default]
    Idle,

    /// Model call in flight; no other turn is accepted
    AwaitingReply,

    /// The last AI turn failed. The log is as it was before the attempt;
    /// the next turn proceeds as from `Idle`.
    Error {
        message: String,
        error_kind: ErrorKind,
    },
}

impl TurnState {
    pub fn as_str(&self) -> &'static str {
        match self {
            TurnState::Idle => "idle",
            TurnState::AwaitingReply => "awaiting_reply",
            TurnState::Error { .. } => "error",
        }
    }

    /// Whether a new turn may start
    pub fn accepts_turns(&self) -> bool {
        !matches!(self, TurnState::AwaitingReply)
    }
}

/// Context for a session (configuration the transition reads)
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub session_id: String,
    pub flow: Flow,
    /// Refreshed by the runtime before every event
    pub credential_available: bool,
}

impl SessionContext {
    pub fn new(session_id: impl Into<String>, flow: Flow, credential_available: bool) -> Self {
        Self {
            session_id: session_id.into(),
            flow,
            credential_available,
        }
    }
}
