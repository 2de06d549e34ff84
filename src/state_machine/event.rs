//! Events that can occur in a session

use crate::conversation::Role;
use crate::error::TurnError;

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    // UI events
    HumanMessage {
        role: Role,
        text: String,
    },
    /// Explicit request for the facilitator to speak
    FacilitationRequested,

    // LLM events
    LlmReply {
        text: String,
    },
    LlmFailed {
        error: TurnError,
    },
}

impl Event {
    pub fn human(role: Role, text: impl Into<String>) -> Self {
        Event::HumanMessage {
            role,
            text: text.into(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Event::HumanMessage { .. } => "human_message",
            Event::FacilitationRequested => "facilitation_requested",
            Event::LlmReply { .. } => "llm_reply",
            Event::LlmFailed { .. } => "llm_failed",
        }
    }
}
