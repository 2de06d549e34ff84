//! Conversation log
//!
//! The authoritative, append-only transcript of one session.

mod transcript;
mod message;

pub use transcript::ConversationLog;
pub use message::{Message, Role};
