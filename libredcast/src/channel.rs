//! External publishing channel
//!
//! Redcast never talks to the social platform itself. A deployment that has
//! a way to post (a browser automation bridge, a partner API) plugs it in
//! through [`PublishChannel`]; without one, the publisher stops at a draft
//! or a pending result.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::error::{RedcastError, Result};
use crate::types::FormattedContent;

#[async_trait]
pub trait PublishChannel: Send + Sync {
    /// Publish a formatted note, returning a channel-specific post id
    ///
    /// # Errors
    ///
    /// Returns `RedcastError::Channel` if the channel rejects the note.
    async fn publish(&self, note: &FormattedContent) -> Result<String>;

    fn name(&self) -> &str;
}

/// Recording channel for tests
#[derive(Debug, Clone, Default)]
pub struct MockChannel {
    error: Option<String>,
    published: Arc<Mutex<Vec<FormattedContent>>>,
}

impl MockChannel {
    /// A channel that accepts everything
    pub fn success() -> Self {
        Self::default()
    }

    /// A channel that rejects everything with `error`
    pub fn failing(error: &str) -> Self {
        Self {
            error: Some(error.to_string()),
            ..Default::default()
        }
    }

    /// Notes accepted so far
    pub fn published(&self) -> Vec<FormattedContent> {
        self.published.lock().unwrap().clone()
    }
}

#[async_trait]
impl PublishChannel for MockChannel {
    async fn publish(&self, note: &FormattedContent) -> Result<String> {
        if let Some(error) = &self.error {
            return Err(RedcastError::Channel(error.clone()));
        }

        let mut published = self.published.lock().unwrap();
        published.push(note.clone());
        Ok(format!("mock-{}", published.len()))
    }

    fn name(&self) -> &str {
        "mock"
    }
}
