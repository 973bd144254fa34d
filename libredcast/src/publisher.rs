//! Publishing pipeline
//!
//! Validates a note, formats it for the platform (body plus a hashtag line),
//! attaches placeholder image paths, and then either saves a draft, hands it
//! to an injected [`PublishChannel`], or reports it as pending manual
//! publication. Every attempt is appended to the publish log.
//!
//! [`Publisher::publish`] never returns an error: failures are reported as a
//! [`PublishResult`] with status `error`.

use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::channel::PublishChannel;
use crate::config::Config;
use crate::error::{ContentError, Result, StorageError};
use crate::generator::TITLE_MAX_CHARS;
use crate::storage::{load_record, PublishLog, RecordStore};
use crate::types::{
    normalize_tag, ContentRecord, Draft, FormattedContent, GeneratedContent, PublishLogEntry,
    PublishResult, PublishStatus,
};

/// More tags than this draws a warning
pub const MAX_TAGS: usize = 10;

const UNKNOWN: &str = "unknown";

pub struct Publisher {
    config: Arc<Config>,
    store: RecordStore,
    log: PublishLog,
    channel: Option<Box<dyn PublishChannel>>,
}

impl Publisher {
    pub fn new(config: Arc<Config>) -> Self {
        let store = RecordStore::new(config.output_dir());
        let log = PublishLog::new(&config.publish.log_path);
        Self {
            config,
            store,
            log,
            channel: None,
        }
    }

    /// Attach an external channel used when drafts are disabled
    pub fn with_channel(mut self, channel: Box<dyn PublishChannel>) -> Self {
        self.channel = Some(channel);
        self
    }

    pub fn log(&self) -> &PublishLog {
        &self.log
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    /// Check required fields, returning advisory warnings
    ///
    /// # Errors
    ///
    /// Returns `ContentError::MissingField` if title, content or tags is
    /// absent. Length problems only produce warnings.
    pub fn validate_content(&self, record: &ContentRecord) -> Result<Vec<String>> {
        let title = required(&record.title, "title")?;
        let body = required(&record.content, "content")?;
        let tags = required(&record.tags, "tags")?;

        let mut warnings = Vec::new();

        let title_chars = title.chars().count();
        if title_chars > TITLE_MAX_CHARS {
            warnings.push(format!(
                "Title is {} characters; the platform limit is {}",
                title_chars, TITLE_MAX_CHARS
            ));
        }
        if tags.len() > MAX_TAGS {
            warnings.push(format!(
                "{} tags; 6-8 are recommended and at most {}",
                tags.len(),
                MAX_TAGS
            ));
        }
        if body.trim().is_empty() {
            warnings.push("Body is empty".to_string());
        }

        for warning in &warnings {
            warn!("{}", warning);
        }
        Ok(warnings)
    }

    /// Placeholder image paths under the configured image directory
    ///
    /// The directory is created; no image files are written.
    pub fn create_placeholder_images(&self, count: usize) -> Result<Vec<String>> {
        let dir = Path::new(&self.config.image.save_path);
        fs::create_dir_all(dir).map_err(StorageError::Io)?;

        Ok((1..=count)
            .map(|n| dir.join(format!("placeholder_{}.png", n)).display().to_string())
            .collect())
    }

    /// Merge body and hashtags and attach placeholder images
    pub fn format_for_publish(&self, record: &ContentRecord) -> Result<FormattedContent> {
        let title = required(&record.title, "title")?;
        let body = required(&record.content, "content")?;
        let tags = required(&record.tags, "tags")?;

        let content = if tags.is_empty() {
            body.clone()
        } else {
            let line = tags
                .iter()
                .map(|tag| normalize_tag(tag))
                .collect::<Vec<_>>()
                .join(" ");
            format!("{}\n\n{}", body, line)
        };

        Ok(FormattedContent {
            title: title.clone(),
            content,
            images: self.create_placeholder_images(self.config.image.count)?,
        })
    }

    /// Validate, format, publish and log one note
    pub async fn publish(&self, record: &ContentRecord) -> PublishResult {
        match self.try_publish(record).await {
            Ok(result) => {
                info!(status = %result.status, "{}", result.message);
                result
            }
            Err(e) => {
                error!("Publish failed: {}", e);
                let result = PublishResult::error(e.to_string());
                if let Err(log_err) = self.log_publish(record, &result) {
                    warn!("Could not record failed publish: {}", log_err);
                }
                result
            }
        }
    }

    pub async fn publish_content(&self, content: &GeneratedContent) -> PublishResult {
        self.publish(&ContentRecord::from(content)).await
    }

    /// Publish a note saved on disk
    pub async fn publish_file(&self, path: &Path) -> PublishResult {
        info!(path = %path.display(), "Publishing saved content");
        match load_record(path) {
            Ok(record) => self.publish(&record).await,
            Err(e) => {
                error!("Could not load {}: {}", path.display(), e);
                let result = PublishResult::error(e.to_string());
                if let Err(log_err) = self.log_publish(&ContentRecord::default(), &result) {
                    warn!("Could not record failed publish: {}", log_err);
                }
                result
            }
        }
    }

    async fn try_publish(&self, record: &ContentRecord) -> Result<PublishResult> {
        self.validate_content(record)?;
        let formatted = self.format_for_publish(record)?;
        let result = self.publish_formatted(&formatted).await?;
        self.log_publish(record, &result)?;
        Ok(result)
    }

    async fn publish_formatted(&self, formatted: &FormattedContent) -> Result<PublishResult> {
        info!(
            title = %formatted.title,
            images = formatted.images.len(),
            "Preparing note for publication"
        );

        if self.config.publish.save_draft {
            let path = self.save_draft(formatted)?;
            return Ok(PublishResult::new(
                PublishStatus::DraftSaved,
                format!("Draft saved to {}; publish it manually", path.display()),
            ));
        }

        match &self.channel {
            Some(channel) => {
                let post_id = channel.publish(formatted).await?;
                Ok(PublishResult::new(
                    PublishStatus::Success,
                    format!("Published via {} ({})", channel.name(), post_id),
                ))
            }
            None => Ok(PublishResult::new(
                PublishStatus::Pending,
                "No publishing channel configured; publish this note manually",
            )),
        }
    }

    fn save_draft(&self, formatted: &FormattedContent) -> Result<PathBuf> {
        let path = self.store.save_draft(&Draft::new(formatted))?;
        info!(path = %path.display(), "Draft saved");
        Ok(path)
    }

    fn log_publish(&self, record: &ContentRecord, result: &PublishResult) -> Result<()> {
        self.log.append(&PublishLogEntry {
            timestamp: Local::now(),
            title: record.title.clone().unwrap_or_else(|| UNKNOWN.to_string()),
            content_type: record
                .content_type
                .clone()
                .unwrap_or_else(|| UNKNOWN.to_string()),
            result: result.clone(),
        })
    }
}

fn required<'a, T>(field: &'a Option<T>, name: &str) -> Result<&'a T> {
    field
        .as_ref()
        .ok_or_else(|| ContentError::MissingField(name.to_string()).into())
}
