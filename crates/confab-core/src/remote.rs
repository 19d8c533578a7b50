//! Remote assistant trait.
//!
//! The single suspension point in the request path: one prompt in, one reply
//! out. The core never retries this call and does not support aborting it;
//! a result always eventually resolves and is applied (or discarded) by the
//! controller.

use crate::error::Result;
use async_trait::async_trait;

/// An abstract remote generative-language service.
///
/// Implementations wrap whatever model API is configured (see
/// confab-interaction). Failures of any kind (transport, auth, quota) are
/// reported as [`crate::ChatError::Remote`].
#[async_trait]
pub trait RemoteAssistant: Send + Sync {
    /// Sends a prompt and returns the reply text.
    async fn send(&self, prompt: &str) -> Result<String>;
}
