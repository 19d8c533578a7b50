//! Conversation domain model.
//!
//! A conversation is an ordered sequence of messages with its own identity,
//! title, and timestamps. It is born with a single assistant greeting and is
//! considered *blank* until the user writes something.

use crate::message::{Message, MessageRole};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Title shown for conversations the user has not written to yet.
pub const PLACEHOLDER_TITLE: &str = "new conversation";

/// Maximum number of characters of the first user message used as a title.
pub const TITLE_MAX_CHARS: usize = 25;

/// Greeting message every new conversation starts with.
pub const GREETING: &str = "Hello! How can I help you today?";

/// Represents one chat conversation in the application's domain layer.
///
/// Invariants:
/// - Contains at least one message (the greeting) from the moment of creation.
/// - `messages` is in append order, which is chronological order.
/// - `updated_at` never regresses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    /// Unique conversation identifier (UUID format), assigned once.
    pub id: String,
    /// Human-readable title, derived from the first user message.
    pub title: String,
    /// All messages in append order.
    pub messages: Vec<Message>,
    /// Timestamp when the conversation was created (serialized as ISO 8601).
    pub created_at: DateTime<Utc>,
    /// Timestamp of the last update (serialized as ISO 8601).
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    /// Creates a fresh conversation containing a single assistant greeting.
    ///
    /// `greeting_id` is the message id for the greeting, taken from the
    /// caller's id generator so ids stay monotonic across the conversation.
    pub fn new(greeting_id: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            title: PLACEHOLDER_TITLE.to_string(),
            messages: vec![Message::assistant(greeting_id, GREETING)],
            created_at: now,
            updated_at: now,
        }
    }

    /// Reconstructs a conversation from the active-pointer slot, which only
    /// stores `{id, messages}`. The title is re-derived and the timestamps
    /// are taken from the message sequence.
    pub fn from_parts(id: String, messages: Vec<Message>) -> Self {
        let created_at = messages
            .first()
            .map(|m| m.timestamp)
            .unwrap_or_else(Utc::now);
        let updated_at = messages
            .last()
            .map(|m| m.timestamp)
            .unwrap_or(created_at);

        let mut conversation = Self {
            id,
            title: PLACEHOLDER_TITLE.to_string(),
            messages,
            created_at,
            updated_at,
        };
        conversation.refresh_title();
        conversation
    }

    /// Returns true if the conversation contains a user-authored message.
    ///
    /// This is monotonic: once true it can never become false, since
    /// messages are only ever appended.
    pub fn has_user_message(&self) -> bool {
        self.messages.iter().any(|m| m.role == MessageRole::User)
    }

    /// A conversation is blank iff it has no user-authored message.
    pub fn is_blank(&self) -> bool {
        !self.has_user_message()
    }

    /// Returns the first user-authored message, if any.
    pub fn first_user_message(&self) -> Option<&Message> {
        self.messages.iter().find(|m| m.role == MessageRole::User)
    }

    /// Appends a message and bumps `updated_at` without letting it regress.
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
        let now = Utc::now();
        if now > self.updated_at {
            self.updated_at = now;
        }
    }

    /// Recomputes the title from the first user message.
    ///
    /// Idempotent: the title is fixed at first-user-message time, so later
    /// messages never change it.
    pub fn refresh_title(&mut self) {
        self.title = derive_title(self.first_user_message().map(|m| m.content.as_str()));
    }
}

/// Derives a conversation title from the first user message.
///
/// Returns the placeholder when there is no user message yet; otherwise the
/// content verbatim, or its first [`TITLE_MAX_CHARS`] characters followed by
/// `...` when longer. Counted in characters, not bytes, so multibyte input
/// never splits a code point.
pub fn derive_title(first_user_content: Option<&str>) -> String {
    match first_user_content {
        None => PLACEHOLDER_TITLE.to_string(),
        Some(content) => {
            if content.chars().count() > TITLE_MAX_CHARS {
                let truncated: String = content.chars().take(TITLE_MAX_CHARS).collect();
                format!("{truncated}...")
            } else {
                content.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::MessageIdGenerator;

    #[test]
    fn test_new_conversation_contains_greeting_and_is_blank() {
        let mut ids = MessageIdGenerator::new();
        let conversation = Conversation::new(ids.next_id());

        assert_eq!(conversation.messages.len(), 1);
        assert_eq!(conversation.messages[0].role, MessageRole::Assistant);
        assert_eq!(conversation.messages[0].content, GREETING);
        assert!(conversation.is_blank());
        assert_eq!(conversation.title, PLACEHOLDER_TITLE);
        assert_eq!(conversation.created_at, conversation.updated_at);
    }

    #[test]
    fn test_has_user_message_is_monotonic() {
        let mut ids = MessageIdGenerator::new();
        let mut conversation = Conversation::new(ids.next_id());
        assert!(!conversation.has_user_message());

        conversation.push(Message::user(ids.next_id(), "hello"));
        assert!(conversation.has_user_message());

        // Appending assistant messages never flips it back
        conversation.push(Message::assistant(ids.next_id(), "hi"));
        assert!(conversation.has_user_message());
    }

    #[test]
    fn test_push_never_regresses_updated_at() {
        let mut ids = MessageIdGenerator::new();
        let mut conversation = Conversation::new(ids.next_id());

        // Force updated_at into the future
        let future = Utc::now() + chrono::Duration::hours(1);
        conversation.updated_at = future;

        conversation.push(Message::user(ids.next_id(), "hello"));
        assert_eq!(conversation.updated_at, future);
    }

    #[test]
    fn test_derive_title_placeholder_without_user_message() {
        assert_eq!(derive_title(None), PLACEHOLDER_TITLE);
    }

    #[test]
    fn test_derive_title_verbatim_when_short() {
        assert_eq!(derive_title(Some("hello")), "hello");
        // Exactly at the limit: no ellipsis
        let exact = "a".repeat(TITLE_MAX_CHARS);
        assert_eq!(derive_title(Some(&exact)), exact);
    }

    #[test]
    fn test_derive_title_truncates_long_content() {
        let long = "x".repeat(40);
        let title = derive_title(Some(&long));
        assert_eq!(title, format!("{}...", "x".repeat(TITLE_MAX_CHARS)));
    }

    #[test]
    fn test_derive_title_counts_characters_not_bytes() {
        let korean = "안".repeat(30);
        let title = derive_title(Some(&korean));
        assert_eq!(title, format!("{}...", "안".repeat(TITLE_MAX_CHARS)));
    }

    #[test]
    fn test_derive_title_is_idempotent() {
        let first = derive_title(Some("what is rust?"));
        let second = derive_title(Some("what is rust?"));
        assert_eq!(first, second);
    }

    #[test]
    fn test_refresh_title_fixed_at_first_user_message() {
        let mut ids = MessageIdGenerator::new();
        let mut conversation = Conversation::new(ids.next_id());

        conversation.push(Message::user(ids.next_id(), "hello"));
        conversation.refresh_title();
        assert_eq!(conversation.title, "hello");

        // A later, longer user message does not change the title
        conversation.push(Message::user(ids.next_id(), "y".repeat(40)));
        conversation.refresh_title();
        assert_eq!(conversation.title, "hello");
    }

    #[test]
    fn test_from_parts_rederives_title_and_timestamps() {
        let mut ids = MessageIdGenerator::new();
        let original = {
            let mut c = Conversation::new(ids.next_id());
            c.push(Message::user(ids.next_id(), "restore me"));
            c
        };

        let restored = Conversation::from_parts(original.id.clone(), original.messages.clone());

        assert_eq!(restored.id, original.id);
        assert_eq!(restored.title, "restore me");
        assert_eq!(restored.created_at, original.messages[0].timestamp);
        assert_eq!(restored.updated_at, original.messages[1].timestamp);
    }
}
