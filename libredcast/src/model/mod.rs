//! Generative text model abstraction
//!
//! The generator only needs "prompt in, text out, may fail". Implementations
//! map transport and provider failures onto [`ModelError`](crate::error::ModelError).

use async_trait::async_trait;

use crate::error::Result;

pub mod anthropic;

// Mock model is available for all builds (not just tests) to support integration tests
pub mod mock;

pub use anthropic::AnthropicModel;
pub use mock::MockModel;

/// A remote (or fake) text generation service
#[async_trait]
pub trait TextModel: Send + Sync {
    /// Send a single user prompt and return the raw reply text
    ///
    /// # Errors
    ///
    /// Returns `ModelError` if the request fails, times out, is rejected,
    /// or the reply carries no text.
    async fn complete(&self, prompt: &str) -> Result<String>;

    /// Model identifier, used in logs
    fn name(&self) -> &str;
}
