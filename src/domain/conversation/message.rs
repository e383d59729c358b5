//! Conversation messages.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::Timestamp;

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    User,
    Assistant,
}

/// One message in the conversation transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    role: MessageRole,
    content: String,
    created_at: Timestamp,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
            created_at: Timestamp::now(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
            created_at: Timestamp::now(),
        }
    }

    pub fn role(&self) -> MessageRole {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }
}
