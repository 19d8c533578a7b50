pub mod context;
pub mod controller;
pub mod conversation;
pub mod error;
pub mod message;
pub mod remote;
pub mod repository;
pub mod store;

// Re-export common error type
pub use error::ChatError;

pub use controller::{ConversationController, OutboundRequest};
pub use conversation::Conversation;
pub use message::{Message, MessageRole};
pub use remote::RemoteAssistant;
pub use repository::SessionRepository;
pub use store::PersistentStore;
