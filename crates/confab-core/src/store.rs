//! Persistent key/value store abstraction.
//!
//! The core persists everything through this trait: a JSON-encoded value per
//! key, read and written synchronously. Implementations live in
//! confab-infrastructure; tests use small in-memory mocks.

use crate::error::Result;

/// Key under which the full conversation collection is stored.
pub const SESSIONS_KEY: &str = "chat_sessions";

/// Key under which the active-conversation pointer is stored.
///
/// This is a separate durable slot from the collection so the client can
/// resume an in-progress, possibly still-blank conversation after a restart.
pub const ACTIVE_CONVERSATION_KEY: &str = "current_chat_session";

/// An abstract durable key/value store for JSON-encoded values.
///
/// Access is synchronous and local; callers are responsible for treating
/// read failures as absent data where the contract requires it.
pub trait PersistentStore: Send + Sync {
    /// Returns the value stored under `key`, or `None` when absent.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removes the value stored under `key`, if any.
    fn remove(&self, key: &str) -> Result<()>;
}
