//! Effects produced by state transitions

use crate::conversation::Role;
use crate::error::TurnError;
use serde_json::Value;

/// Effects to be executed after state transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Append a message to the session's log
    AppendMessage { role: Role, content: String },

    /// Build the next request from the log and call the model once
    RequestLlm,

    /// Notify connected clients
    NotifyClient { event_type: String, data: Value },

    /// Resolve the pending turn with this error
    ReportFailure { error: TurnError },
}

impl Effect {
    pub fn append_human(role: Role, content: impl Into<String>) -> Self {
        Effect::AppendMessage {
            role,
            content: content.into(),
        }
    }

    pub fn append_assistant(content: impl Into<String>) -> Self {
        Effect::AppendMessage {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    #[allow(clippy::needless_pass_by_value)] // data is consumed by json! macro
    pub fn notify_state_change(state: &str, data: Value) -> Self {
        Effect::NotifyClient {
            event_type: "state_change".to_string(),
            data: serde_json::json!({
                "state": state,
                "state_data": data
            }),
        }
    }

    pub fn notify_reply_done() -> Self {
        Effect::NotifyClient {
            event_type: "reply_done".to_string(),
            data: Value::Null,
        }
    }
}
