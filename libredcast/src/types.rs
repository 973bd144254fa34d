//! Core types for Redcast

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// A weighted category of notes, e.g. "pain point" or "tutorial"
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContentType {
    pub name: String,
    pub weight: f64,
    pub templates: Vec<String>,
}

/// A note template as stored in the template document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Template {
    /// Filled in from the map key when loaded from the template document
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub title_pattern: String,
    pub content_structure: Vec<String>,
    pub style: String,
    pub emoji_density: String,
}

/// A generated note, persisted once per generation call
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneratedContent {
    pub title: String,
    /// Note body (without hashtags)
    pub content: String,
    pub tags: Vec<String>,
    pub content_type: String,
    pub template: String,
    pub generated_at: DateTime<Local>,
    pub test_mode: bool,
}

/// Publish input as read from disk.
///
/// Every field is optional so that records missing required fields can be
/// detected and rejected by the publisher instead of failing to parse.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ContentRecord {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub content_type: Option<String>,
}

impl From<&GeneratedContent> for ContentRecord {
    fn from(content: &GeneratedContent) -> Self {
        Self {
            title: Some(content.title.clone()),
            content: Some(content.content.clone()),
            tags: Some(content.tags.clone()),
            content_type: Some(content.content_type.clone()),
        }
    }
}

/// Strip surrounding `#` and whitespace, then prefix exactly one `#`
pub fn normalize_tag(tag: &str) -> String {
    format!("#{}", tag.trim().trim_matches('#').trim())
}

/// A note ready to hand to a publishing channel
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FormattedContent {
    pub title: String,
    /// Body followed by a blank line and the hashtag line
    pub content: String,
    pub images: Vec<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PublishStatus {
    DraftSaved,
    Pending,
    Success,
    Error,
}

impl std::fmt::Display for PublishStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DraftSaved => write!(f, "draft_saved"),
            Self::Pending => write!(f, "pending"),
            Self::Success => write!(f, "success"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Outcome of a single publish attempt
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PublishResult {
    pub status: PublishStatus,
    pub message: String,
}

impl PublishResult {
    pub fn new(status: PublishStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(PublishStatus::Error, message)
    }
}

/// One line of the append-only publish log
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PublishLogEntry {
    pub timestamp: DateTime<Local>,
    pub title: String,
    pub content_type: String,
    pub result: PublishResult,
}

/// A draft written for a human to publish by hand
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Draft {
    pub title: String,
    pub content: String,
    pub images: Vec<String>,
    pub saved_at: DateTime<Local>,
    pub status: String,
}

impl Draft {
    pub fn new(formatted: &FormattedContent) -> Self {
        Self {
            title: formatted.title.clone(),
            content: formatted.content.clone(),
            images: formatted.images.clone(),
            saved_at: Local::now(),
            status: "draft".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_content() -> GeneratedContent {
        GeneratedContent {
            title: "半年Temu终于找到宝藏工具".to_string(),
            content: "之前每天光是上架产品就要花3个小时😭".to_string(),
            tags: vec!["#跨境电商".to_string(), "#Temu".to_string()],
            content_type: "pain_point".to_string(),
            template: "Before and after".to_string(),
            generated_at: Local::now(),
            test_mode: true,
        }
    }

    #[test]
    fn test_generated_content_round_trip() {
        let original = sample_content();
        let json = serde_json::to_string_pretty(&original).unwrap();
        let restored: GeneratedContent = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, original);
    }

    #[test]
    fn test_publish_status_serializes_snake_case() {
        let json = serde_json::to_string(&PublishStatus::DraftSaved).unwrap();
        assert_eq!(json, "\"draft_saved\"");
        assert_eq!(PublishStatus::DraftSaved.to_string(), "draft_saved");
        assert_eq!(PublishStatus::Pending.to_string(), "pending");
    }

    #[test]
    fn test_content_record_tolerates_missing_fields() {
        let record: ContentRecord = serde_json::from_str(r#"{"title": "Hi"}"#).unwrap();
        assert_eq!(record.title.as_deref(), Some("Hi"));
        assert!(record.content.is_none());
        assert!(record.tags.is_none());
    }

    #[test]
    fn test_content_record_from_generated() {
        let content = sample_content();
        let record = ContentRecord::from(&content);
        assert_eq!(record.title.as_deref(), Some(content.title.as_str()));
        assert_eq!(record.tags.as_ref().map(Vec::len), Some(2));
        assert_eq!(record.content_type.as_deref(), Some("pain_point"));
    }

    #[test]
    fn test_normalize_tag() {
        assert_eq!(normalize_tag("Temu"), "#Temu");
        assert_eq!(normalize_tag("#Temu"), "#Temu");
        assert_eq!(normalize_tag("##Temu#"), "#Temu");
        assert_eq!(normalize_tag(" 跨境电商 "), "#跨境电商");
    }

    #[test]
    fn test_draft_status_is_draft() {
        let formatted = FormattedContent {
            title: "t".to_string(),
            content: "body\n\n#tag".to_string(),
            images: vec!["images/placeholder_1.png".to_string()],
        };
        let draft = Draft::new(&formatted);
        assert_eq!(draft.status, "draft");
        assert_eq!(draft.images.len(), 1);
    }
}
