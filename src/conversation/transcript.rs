//! Append-only conversation log

use super::{Message, Role};
use crate::error::TurnError;
use crate::persona::Flow;
use std::fmt::Write;

/// Ordered transcript owned by exactly one session.
///
/// There is no way to remove or edit an entry: the log only grows, and its
/// order is the order in which turns happened.
#[derive(Debug, Clone)]
pub struct ConversationLog {
    flow: Flow,
    messages: Vec<Message>,
}

impl ConversationLog {
    /// Start a log holding only `seed`
    pub fn initialize(flow: Flow, seed: Message) -> Result<Self, TurnError> {
        let mut log = Self {
            flow,
            messages: Vec::new(),
        };
        log.append(seed)?;
        Ok(log)
    }

    /// Start a log with the flow's own greeting as the seed
    pub fn with_greeting(flow: Flow) -> Result<Self, TurnError> {
        let greeting = flow.seed_greeting().ok_or_else(|| {
            TurnError::UnsupportedAction(format!("the {flow} flow has no conversation log"))
        })?;
        let label = flow
            .speaker_label(Role::Assistant)
            .ok_or_else(|| TurnError::InvalidRole(Role::Assistant.as_str().to_string()))?;
        Self::initialize(flow, Message::new(Role::Assistant, label, greeting))
    }

    /// Place `message` after every existing entry.
    ///
    /// Content is not inspected here; only the speaker's role is checked
    /// against the flow's roster.
    pub fn append(&mut self, message: Message) -> Result<&Message, TurnError> {
        if !self.flow.allows(message.role()) {
            return Err(TurnError::InvalidRole(message.role().as_str().to_string()));
        }
        self.messages.push(message);
        self.last()
            .ok_or_else(|| TurnError::UnsupportedAction("append left the log empty".to_string()))
    }

    /// Read-only view of the transcript in arrival order
    pub fn render(&self) -> &[Message] {
        &self.messages
    }

    /// One `speaker: content` line per message, in order
    pub fn to_transcript(&self) -> String {
        let mut out = String::new();
        for msg in &self.messages {
            let _ = writeln!(out, "{}: {}", msg.speaker_label(), msg.content());
        }
        out
    }

    pub fn flow(&self) -> Flow {
        self.flow
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Most recent entry
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }
}
