//! Conversation message types.
//!
//! This module contains types for representing a single turn in a
//! conversation, plus the id generator that keeps message ids strictly
//! monotonic for display ordering.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Represents the role of a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Message from the user.
    User,
    /// Message from the AI assistant.
    Assistant,
}

/// A single message in a conversation.
///
/// Messages are immutable once created: the struct is cloned around but
/// never edited after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Opaque message id, unique and strictly increasing within a conversation.
    pub id: String,
    /// The role of the message sender.
    pub role: MessageRole,
    /// The content of the message.
    pub content: String,
    /// Timestamp when the message was created (serialized as ISO 8601).
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Creates a user-authored message stamped with the current time.
    pub fn user(id: String, content: impl Into<String>) -> Self {
        Self::new(id, MessageRole::User, content)
    }

    /// Creates an assistant-authored message stamped with the current time.
    pub fn assistant(id: String, content: impl Into<String>) -> Self {
        Self::new(id, MessageRole::Assistant, content)
    }

    fn new(id: String, role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            id,
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Generates message ids from unix milliseconds.
///
/// Two messages created within the same millisecond would collide on a raw
/// timestamp, so the generator bumps the candidate past the last issued id.
/// Ids are therefore strictly increasing as integers for the lifetime of
/// the generator.
#[derive(Debug, Default)]
pub struct MessageIdGenerator {
    last: i64,
}

impl MessageIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the next id, strictly greater than every id issued before it.
    pub fn next_id(&mut self) -> String {
        let mut candidate = Utc::now().timestamp_millis();
        if candidate <= self.last {
            candidate = self.last + 1;
        }
        self.last = candidate;
        candidate.to_string()
    }
}
