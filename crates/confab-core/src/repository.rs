//! Conversation history repository.
//!
//! Owns the ordered collection of persisted conversations, backed by a
//! [`PersistentStore`]. Enforces the retention cap and the
//! most-recently-updated-first ordering, and persists the full collection
//! after every mutation.

use crate::conversation::Conversation;
use crate::error::{ChatError, Result};
use crate::store::{PersistentStore, SESSIONS_KEY};
use std::sync::Arc;

/// Maximum number of conversations retained in history.
pub const MAX_CONVERSATIONS: usize = 10;

/// Repository for persisted conversations.
///
/// The collection is held in memory, ordered most-recently-updated first,
/// and written back to the store as one JSON array after each mutation.
pub struct SessionRepository {
    store: Arc<dyn PersistentStore>,
    records: Vec<Conversation>,
}

impl SessionRepository {
    /// Creates a repository, loading the collection from the store.
    ///
    /// Read or parse failures are logged and treated as "no data": the
    /// client must always be able to start with zero history rather than
    /// fail to boot.
    pub fn new(store: Arc<dyn PersistentStore>) -> Self {
        let records = Self::load(store.as_ref());
        Self { store, records }
    }

    fn load(store: &dyn PersistentStore) -> Vec<Conversation> {
        let raw = match store.get(SESSIONS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!("Failed to read conversation history, starting empty: {e}");
                return Vec::new();
            }
        };

        let mut records = decode_collection(&raw);
        // Most recently updated first
        records.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        records
    }

    /// Returns all conversations, most-recently-updated first.
    pub fn list_all(&self) -> &[Conversation] {
        &self.records
    }

    /// Finds a conversation by id.
    pub fn find(&self, id: &str) -> Option<&Conversation> {
        self.records.iter().find(|c| c.id == id)
    }

    /// Returns the first blank conversation in the collection, if any.
    pub fn find_blank(&self) -> Option<&Conversation> {
        self.records.iter().find(|c| c.is_blank())
    }

    /// Inserts or replaces a conversation, moving it to the front.
    ///
    /// The collection is then truncated to [`MAX_CONVERSATIONS`] entries and
    /// persisted in full. A write failure leaves the in-memory collection
    /// updated and is returned for the caller to log.
    pub fn upsert(&mut self, record: Conversation) -> Result<()> {
        self.records.retain(|c| c.id != record.id);
        self.records.insert(0, record);
        self.records.truncate(MAX_CONVERSATIONS);
        self.persist()
    }

    /// Removes the conversation with the given id and persists the remainder.
    ///
    /// Returns the remaining collection, or [`ChatError::NotFound`] when the
    /// id is unknown (the collection is untouched in that case).
    pub fn delete(&mut self, id: &str) -> Result<&[Conversation]> {
        let before = self.records.len();
        self.records.retain(|c| c.id != id);
        if self.records.len() == before {
            return Err(ChatError::not_found("Conversation", id));
        }
        self.persist()?;
        Ok(&self.records)
    }

    fn persist(&self) -> Result<()> {
        let json = serde_json::to_string(&self.records)?;
        self.store.set(SESSIONS_KEY, &json)
    }
}

/// Decodes the stored collection, dropping malformed entries.
///
/// The value is parsed as a JSON array first; each element is then decoded
/// individually so one bad record never discards the rest. Records violating
/// the at-least-one-message invariant are dropped as malformed. The policy
/// is deterministic: invalid records are dropped silently (logged at warn),
/// never repaired field by field.
fn decode_collection(raw: &str) -> Vec<Conversation> {
    let entries: Vec<serde_json::Value> = match serde_json::from_str(raw) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!("Conversation history is not a JSON array, starting empty: {e}");
            return Vec::new();
        }
    };

    entries
        .into_iter()
        .filter_map(|entry| match serde_json::from_value::<Conversation>(entry) {
            Ok(record) if record.messages.is_empty() => {
                tracing::warn!("Dropping stored conversation '{}' with no messages", record.id);
                None
            }
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!("Dropping malformed stored conversation: {e}");
                None
            }
        })
        .collect()
}
