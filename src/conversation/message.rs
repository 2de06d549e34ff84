//! Transcript entries

use crate::error::TurnError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who produced a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// The only human in a two-party dialogue, or the first human role
    #[serde(alias = "human")]
    HumanPrimary,
    HumanSecondary,
    Assistant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::HumanPrimary => "human_primary",
            Role::HumanSecondary => "human_secondary",
            Role::Assistant => "assistant",
        }
    }

    pub fn is_human(self) -> bool {
        !matches!(self, Role::Assistant)
    }
}

impl std::str::FromStr for Role {
    type Err = TurnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "human" | "human_primary" => Ok(Role::HumanPrimary),
            "human_secondary" => Ok(Role::HumanSecondary),
            "assistant" => Ok(Role::Assistant),
            other => Err(TurnError::InvalidRole(other.to_string())),
        }
    }
}

/// One immutable transcript entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    role: Role,
    speaker_label: String,
    content: String,
    created_at: DateTime<Utc>,
}

impl Message {
    pub fn new(role: Role, speaker_label: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role,
            speaker_label: speaker_label.into(),
            content: content.into(),
            created_at: Utc::now(),
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn speaker_label(&self) -> &str {
        &self.speaker_label
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}
