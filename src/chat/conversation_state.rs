use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Who authored a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    /// The advice service calls this role `model`; both spellings are accepted.
    #[serde(alias = "model")]
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("message text cannot be empty")]
pub struct EmptyMessage;

/// One conversation turn. Role and text are fixed once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    role: Role,
    text: String,
    sent_at: DateTime<Utc>,
}

impl Message {
    pub fn new(role: Role, text: impl Into<String>) -> Result<Self, EmptyMessage> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(EmptyMessage);
        }

        Ok(Self {
            role,
            text,
            sent_at: Utc::now(),
        })
    }

    pub fn user(text: impl Into<String>) -> Result<Self, EmptyMessage> {
        Self::new(Role::User, text)
    }

    pub fn assistant(text: impl Into<String>) -> Result<Self, EmptyMessage> {
        Self::new(Role::Assistant, text)
    }

    /// Assistant message from fault text, which is never blank.
    pub(crate) fn fallback(text: String) -> Self {
        Self {
            role: Role::Assistant,
            text,
            sent_at: Utc::now(),
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn sent_at(&self) -> DateTime<Utc> {
        self.sent_at
    }
}

/// Append-only log of turns, seeded with the assistant greeting.
#[derive(Debug, Clone)]
pub struct ConversationState {
    messages: Vec<Message>,
}

impl ConversationState {
    pub fn new(greeting: &str) -> Result<Self, EmptyMessage> {
        Ok(Self {
            messages: vec![Message::assistant(greeting)?],
        })
    }

    pub fn append(&mut self, message: Message) -> &Message {
        self.messages.push(message);
        &self.messages[self.messages.len() - 1]
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn latest(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
