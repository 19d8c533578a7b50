//! Conversation lifecycle orchestration.
//!
//! `ConversationController` owns the single active conversation and is the
//! component every other layer talks to. All mutating operations end with an
//! explicit, synchronous persistence call; there is no implicit
//! save-on-render anywhere.

use crate::context;
use crate::conversation::Conversation;
use crate::error::{ChatError, Result};
use crate::message::{Message, MessageIdGenerator};
use crate::repository::SessionRepository;
use crate::store::{ACTIVE_CONVERSATION_KEY, PersistentStore};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Durable shape of the active-conversation slot.
///
/// Deliberately minimal (`{id, messages}`): the title and timestamps are
/// re-derivable, and a blank conversation exists nowhere else.
#[derive(Debug, Serialize, Deserialize)]
struct ActivePointer {
    id: String,
    messages: Vec<Message>,
}

/// A validated, ready-to-send request against the remote assistant.
///
/// Produced by [`ConversationController::prepare_request`]; the caller
/// performs the remote call and hands the outcome back through
/// [`ConversationController::complete_request`].
#[derive(Debug)]
pub struct OutboundRequest {
    /// Id of the conversation the request belongs to.
    pub conversation_id: String,
    /// The bounded prompt text to send.
    pub prompt: String,
}

/// Orchestrates session creation, switching, deletion, and save-on-update.
///
/// Holds exactly one *active* conversation at a time; this is the only
/// mutable shared state in the core. While a remote request is outstanding,
/// new outgoing requests are rejected, and a result is applied only if its
/// conversation is still the active one.
pub struct ConversationController {
    repository: SessionRepository,
    store: Arc<dyn PersistentStore>,
    ids: MessageIdGenerator,
    active: Conversation,
    in_flight: Option<String>,
}

impl ConversationController {
    /// Creates a controller, restoring history and the active conversation
    /// from the store.
    ///
    /// A missing or malformed active-pointer slot falls back to a fresh
    /// blank conversation; this constructor never fails.
    pub fn new(store: Arc<dyn PersistentStore>) -> Self {
        let repository = SessionRepository::new(store.clone());
        let mut ids = MessageIdGenerator::new();

        let active = Self::restore_active(store.as_ref(), &repository)
            .unwrap_or_else(|| Conversation::new(ids.next_id()));

        let mut controller = Self {
            repository,
            store,
            ids,
            active,
            in_flight: None,
        };
        controller.save_active_pointer();
        controller
    }

    fn restore_active(
        store: &dyn PersistentStore,
        repository: &SessionRepository,
    ) -> Option<Conversation> {
        let raw = match store.get(ACTIVE_CONVERSATION_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!("Failed to read active conversation pointer: {e}");
                return None;
            }
        };

        let pointer: ActivePointer = match serde_json::from_str(&raw) {
            Ok(pointer) => pointer,
            Err(e) => {
                tracing::warn!("Malformed active conversation pointer, starting fresh: {e}");
                return None;
            }
        };

        if pointer.messages.is_empty() {
            tracing::warn!("Active conversation pointer holds no messages, starting fresh");
            return None;
        }

        // Promoted conversations carry their title and timestamps in the
        // repository; blank ones exist only in the pointer slot.
        match repository.find(&pointer.id) {
            Some(record) => Some(record.clone()),
            None => Some(Conversation::from_parts(pointer.id, pointer.messages)),
        }
    }

    /// The currently active conversation.
    pub fn active(&self) -> &Conversation {
        &self.active
    }

    /// All persisted conversations, most-recently-updated first.
    pub fn list_conversations(&self) -> &[Conversation] {
        self.repository.list_all()
    }

    /// Whether a remote request is currently outstanding.
    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Creates a fresh conversation with one assistant greeting and makes it
    /// active.
    ///
    /// The new conversation is persisted to the active-pointer slot only; it
    /// enters the history collection once a user message is appended, so
    /// blank conversations never pollute the session list.
    pub fn start_new_conversation(&mut self) -> &Conversation {
        self.active = Conversation::new(self.ids.next_id());
        self.save_active_pointer();
        &self.active
    }

    /// Switches to an existing blank conversation instead of creating a new
    /// one; creates a fresh conversation only when no blank one exists.
    ///
    /// Repeated "new chat" requests without any typing therefore never
    /// accumulate empty conversations.
    pub fn reset_to_blank_or_new(&mut self) -> &Conversation {
        if self.active.is_blank() {
            return &self.active;
        }
        if let Some(blank) = self.repository.find_blank().cloned() {
            self.active = blank;
            self.save_active_pointer();
            return &self.active;
        }
        self.start_new_conversation()
    }

    /// Makes the stored conversation with the given id active.
    ///
    /// Returns [`ChatError::NotFound`] and leaves all state untouched when
    /// the id is unknown.
    pub fn switch_to(&mut self, id: &str) -> Result<&Conversation> {
        let record = self
            .repository
            .find(id)
            .cloned()
            .ok_or_else(|| ChatError::not_found("Conversation", id))?;

        self.active = record;
        self.save_active_pointer();
        Ok(&self.active)
    }

    /// Appends a user message to the active conversation.
    ///
    /// The active-pointer slot is persisted immediately, so a crash
    /// mid-request does not lose the user's input. Returns
    /// [`ChatError::Validation`] when `text` is empty after trimming.
    pub fn append_user_message(&mut self, text: &str) -> Result<Message> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(ChatError::validation("message text is empty"));
        }

        let message = Message::user(self.ids.next_id(), trimmed);
        self.active.push(message.clone());
        self.save_active_pointer();
        self.save_and_promote();
        Ok(message)
    }

    /// Appends an assistant reply to the active conversation.
    pub fn append_assistant_message(&mut self, text: impl Into<String>) -> Message {
        let message = Message::assistant(self.ids.next_id(), text);
        self.active.push(message.clone());
        self.save_active_pointer();
        self.save_and_promote();
        message
    }

    /// Appends a visible assistant-role error placeholder, keeping the
    /// conversation usable after a failed remote call.
    pub fn append_assistant_error(&mut self, error_text: impl AsRef<str>) -> Message {
        self.append_assistant_message(format!(
            "Sorry, something went wrong: {}",
            error_text.as_ref()
        ))
    }

    /// Deletes a conversation from history.
    ///
    /// When the deleted conversation was the active one, the
    /// most-recently-updated remaining conversation becomes active; with
    /// none remaining, the pointer slot is cleared and a fresh blank
    /// conversation is started.
    pub fn delete_conversation(&mut self, id: &str) -> Result<()> {
        self.repository.delete(id)?;

        if self.active.id == id {
            if let Some(next) = self.repository.list_all().first().cloned() {
                self.active = next;
                self.save_active_pointer();
            } else {
                if let Err(e) = self.store.remove(ACTIVE_CONVERSATION_KEY) {
                    tracing::warn!("Failed to clear active conversation pointer: {e}");
                }
                self.start_new_conversation();
            }
        }
        Ok(())
    }

    /// Validates and stages an outgoing request against the active
    /// conversation.
    ///
    /// The prompt is built from the message window *before* the new user
    /// message is appended; the message is then appended and persisted, and
    /// the in-flight guard armed. Returns [`ChatError::RequestInFlight`]
    /// while a previous request is still outstanding.
    pub fn prepare_request(&mut self, text: &str) -> Result<OutboundRequest> {
        if let Some(id) = &self.in_flight {
            return Err(ChatError::RequestInFlight(id.clone()));
        }

        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(ChatError::validation("message text is empty"));
        }

        let prompt = context::build_prompt(&self.active.messages, trimmed);
        self.append_user_message(trimmed)?;
        self.in_flight = Some(self.active.id.clone());

        Ok(OutboundRequest {
            conversation_id: self.active.id.clone(),
            prompt,
        })
    }

    /// Applies the outcome of a remote call staged by
    /// [`prepare_request`](Self::prepare_request).
    ///
    /// Disarms the in-flight guard. A late result whose conversation is no
    /// longer active is discarded (`None`) so it cannot corrupt the wrong
    /// conversation; otherwise the reply (or a visible error placeholder)
    /// is appended and returned.
    pub fn complete_request(
        &mut self,
        conversation_id: &str,
        outcome: Result<String>,
    ) -> Option<Message> {
        if self.in_flight.as_deref() == Some(conversation_id) {
            self.in_flight = None;
        }

        if self.active.id != conversation_id {
            tracing::debug!("Discarding late reply for conversation '{conversation_id}'");
            return None;
        }

        let message = match outcome {
            Ok(reply) => self.append_assistant_message(reply),
            Err(e) => self.append_assistant_error(e.to_string()),
        };
        Some(message)
    }

    /// Promotes the active conversation into history once it has a user
    /// message: recompute the title and upsert. Blank conversations are
    /// never upserted.
    fn save_and_promote(&mut self) {
        if !self.active.has_user_message() {
            return;
        }
        self.active.refresh_title();
        if let Err(e) = self.repository.upsert(self.active.clone()) {
            tracing::warn!(
                "Failed to persist conversation '{}', keeping it in memory: {e}",
                self.active.id
            );
        }
    }

    fn save_active_pointer(&self) {
        let pointer = ActivePointer {
            id: self.active.id.clone(),
            messages: self.active.messages.clone(),
        };
        match serde_json::to_string(&pointer) {
            Ok(json) => {
                if let Err(e) = self.store.set(ACTIVE_CONVERSATION_KEY, &json) {
                    tracing::warn!("Failed to persist active conversation pointer: {e}");
                }
            }
            Err(e) => {
                tracing::warn!("Failed to encode active conversation pointer: {e}");
            }
        }
    }
}
