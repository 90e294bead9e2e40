//! Transcript message types
//!
//! A [`Message`] is an immutable `(role, content)` pair. It carries no
//! identifier or timestamp: its position in the transcript is the only
//! ordering key.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Author of a transcript message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Text the user submitted
    User,
    /// Replies from the RAG agent, including chat failure notices
    Assistant,
    /// Console notices such as ingest confirmations and failures
    System,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
            Self::System => write!(f, "system"),
        }
    }
}

/// Immutable transcript message
///
/// Fields are private so a message cannot be edited once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    role: Role,
    content: String,
}

impl Message {
    /// Creates a message with an explicit role
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Creates a new user message
    ///
    /// # Examples
    ///
    /// ```
    /// use ragconsole::conversation::{Message, Role};
    ///
    /// let msg = Message::user("What does the Q3 report say?");
    /// assert_eq!(msg.role(), Role::User);
    /// ```
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Creates a new assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Creates a new system message
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    /// Role of the message author
    pub fn role(&self) -> Role {
        self.role
    }

    /// Message text
    pub fn content(&self) -> &str {
        &self.content
    }
}
