//! Mock text model for testing
//!
//! Replays canned replies in order (repeating the last one) or fails with a
//! configured error, and records every prompt it receives so tests can
//! inspect what the generator sent.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use super::TextModel;
use crate::error::{ModelError, Result};

#[derive(Debug, Clone)]
pub struct MockModel {
    replies: Vec<String>,
    error: Option<ModelError>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl MockModel {
    /// A model that always answers with `reply`
    pub fn reply(reply: &str) -> Self {
        Self::replies(vec![reply.to_string()])
    }

    /// A model that answers with each reply in turn, then repeats the last
    pub fn replies(replies: Vec<String>) -> Self {
        Self {
            replies,
            error: None,
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A model whose every call fails with `error`
    pub fn failing(error: ModelError) -> Self {
        Self {
            replies: Vec::new(),
            error: Some(error),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Prompts received so far
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl TextModel for MockModel {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let call = {
            let mut prompts = self.prompts.lock().unwrap();
            prompts.push(prompt.to_string());
            prompts.len() - 1
        };

        if let Some(error) = &self.error {
            return Err(error.clone().into());
        }

        let index = call.min(self.replies.len().saturating_sub(1));
        self.replies
            .get(index)
            .cloned()
            .ok_or_else(|| ModelError::Response("Mock model has no replies".to_string()).into())
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_replays_in_order() {
        let model = MockModel::replies(vec!["one".to_string(), "two".to_string()]);

        assert_eq!(model.complete("a").await.unwrap(), "one");
        assert_eq!(model.complete("b").await.unwrap(), "two");
        assert_eq!(model.complete("c").await.unwrap(), "two");
        assert_eq!(model.prompts(), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_mock_failure() {
        let model = MockModel::failing(ModelError::Authentication("bad key".to_string()));

        let err = model.complete("prompt").await.unwrap_err();
        assert!(err.to_string().contains("bad key"));
        assert_eq!(err.exit_code(), 2);
        assert_eq!(model.call_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_without_replies_errors() {
        let model = MockModel::replies(vec![]);
        assert!(model.complete("prompt").await.is_err());
    }

    #[tokio::test]
    async fn test_mock_clones_share_prompt_log() {
        let model = MockModel::reply("ok");
        let observer = model.clone();

        model.complete("hello").await.unwrap();
        assert_eq!(observer.call_count(), 1);
    }
}
