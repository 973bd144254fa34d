//! File-backed persistence for generated notes, drafts and the publish log
//!
//! Layout under the output directory:
//!
//! - `content_<ts>.json` - one record per generation call
//! - `draft_<ts>.json` - one record per saved draft
//!
//! `<ts>` is local time as `YYYYmmdd_HHMMSS_mmm`, so names sort
//! chronologically. The publish log is a separate JSON array file.

use chrono::{DateTime, Local};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{Result, StorageError};
use crate::types::{ContentRecord, Draft, GeneratedContent, PublishLogEntry};

const CONTENT_PREFIX: &str = "content_";
const DRAFT_PREFIX: &str = "draft_";

/// Timestamp fragment used in record file names
pub fn timestamp_slug(at: DateTime<Local>) -> String {
    at.format("%Y%m%d_%H%M%S_%3f").to_string()
}

/// Directory of generated content and draft records
#[derive(Debug, Clone)]
pub struct RecordStore {
    dir: PathBuf,
}

impl RecordStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write one generated note, returning its path
    ///
    /// Without `filename` the name is derived from the current time.
    pub fn save_content(&self, content: &GeneratedContent, filename: Option<&str>) -> Result<PathBuf> {
        let path = match filename {
            Some(name) => self.dir.join(name),
            None => self.unique_path(CONTENT_PREFIX)?,
        };
        write_json(&path, content)?;
        debug!(path = %path.display(), "Saved generated content");
        Ok(path)
    }

    /// Write one draft, returning its path
    pub fn save_draft(&self, draft: &Draft) -> Result<PathBuf> {
        let path = self.unique_path(DRAFT_PREFIX)?;
        write_json(&path, draft)?;
        debug!(path = %path.display(), "Saved draft");
        Ok(path)
    }

    /// Most recent `content_*.json` record
    pub fn latest_content(&self) -> Result<PathBuf> {
        self.list(CONTENT_PREFIX)?
            .pop()
            .ok_or_else(|| StorageError::NoContent(self.dir.display().to_string()).into())
    }

    /// All content records, oldest first
    pub fn content_files(&self) -> Result<Vec<PathBuf>> {
        self.list(CONTENT_PREFIX)
    }

    /// All draft records, oldest first
    pub fn draft_files(&self) -> Result<Vec<PathBuf>> {
        self.list(DRAFT_PREFIX)
    }

    fn list(&self, prefix: &str) -> Result<Vec<PathBuf>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut files: Vec<PathBuf> = fs::read_dir(&self.dir)
            .map_err(StorageError::Io)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with(prefix) && n.ends_with(".json"))
            })
            .collect();
        files.sort();
        Ok(files)
    }

    /// A fresh timestamped path that does not overwrite an existing record
    fn unique_path(&self, prefix: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir).map_err(StorageError::Io)?;

        let stem = format!("{}{}", prefix, timestamp_slug(Local::now()));
        let mut path = self.dir.join(format!("{}.json", stem));
        let mut n = 1;
        while path.exists() {
            path = self.dir.join(format!("{}_{}.json", stem, n));
            n += 1;
        }
        Ok(path)
    }
}

/// Load a saved note as a publish input
pub fn load_record(path: &Path) -> Result<ContentRecord> {
    let text = fs::read_to_string(path).map_err(StorageError::Io)?;
    Ok(serde_json::from_str(&text).map_err(StorageError::Json)?)
}

/// Load a saved note with all fields required
pub fn load_content(path: &Path) -> Result<GeneratedContent> {
    let text = fs::read_to_string(path).map_err(StorageError::Io)?;
    Ok(serde_json::from_str(&text).map_err(StorageError::Json)?)
}

/// Append-only publish log stored as a single JSON array
#[derive(Debug, Clone)]
pub struct PublishLog {
    path: PathBuf,
}

impl PublishLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the existing array (or start empty), append, and rewrite it
    ///
    /// Entries written by other tools are kept as-is.
    pub fn append(&self, entry: &PublishLogEntry) -> Result<()> {
        let mut entries = self.read_raw()?;
        entries.push(serde_json::to_value(entry).map_err(StorageError::Json)?);
        write_json(&self.path, &entries)
    }

    /// Typed view of the log
    pub fn entries(&self) -> Result<Vec<PublishLogEntry>> {
        let mut entries = Vec::new();
        for value in self.read_raw()? {
            entries.push(serde_json::from_value(value).map_err(StorageError::Json)?);
        }
        Ok(entries)
    }

    fn read_raw(&self) -> Result<Vec<serde_json::Value>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let text = fs::read_to_string(&self.path).map_err(StorageError::Io)?;
        Ok(serde_json::from_str(&text).map_err(StorageError::Json)?)
    }
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(StorageError::Io)?;
    }
    let json = serde_json::to_string_pretty(value).map_err(StorageError::Json)?;
    fs::write(path, json).map_err(StorageError::Io)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RedcastError;
    use crate::types::{PublishResult, PublishStatus};
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn sample() -> GeneratedContent {
        GeneratedContent {
            title: "Great Title".to_string(),
            content: "Body text here".to_string(),
            tags: vec!["#a".to_string()],
            content_type: "A".to_string(),
            template: "T1".to_string(),
            generated_at: Local::now(),
            test_mode: false,
        }
    }

    #[test]
    fn test_timestamp_slug_format() {
        let at = Local.with_ymd_and_hms(2026, 3, 7, 9, 5, 2).unwrap();
        assert_eq!(timestamp_slug(at), "20260307_090502_000");
    }

    #[test]
    fn test_save_content_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = RecordStore::new(dir.path().join("logs"));

        let content = sample();
        let path = store.save_content(&content, None).unwrap();
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("content_"));
        assert!(name.ends_with(".json"));

        assert_eq!(load_content(&path).unwrap(), content);
    }

    #[test]
    fn test_save_content_with_explicit_name() {
        let dir = TempDir::new().unwrap();
        let store = RecordStore::new(dir.path());

        let path = store.save_content(&sample(), Some("content_manual.json")).unwrap();
        assert_eq!(path, dir.path().join("content_manual.json"));
    }

    #[test]
    fn test_saves_in_same_instant_do_not_overwrite() {
        let dir = TempDir::new().unwrap();
        let store = RecordStore::new(dir.path());

        for _ in 0..5 {
            store.save_content(&sample(), None).unwrap();
        }
        assert_eq!(store.content_files().unwrap().len(), 5);
    }

    #[test]
    fn test_latest_content() {
        let dir = TempDir::new().unwrap();
        let store = RecordStore::new(dir.path());

        let err = store.latest_content().unwrap_err();
        assert!(matches!(err, RedcastError::Storage(StorageError::NoContent(_))));

        store.save_content(&sample(), Some("content_20260101_080000_000.json")).unwrap();
        store.save_content(&sample(), Some("content_20260102_080000_000.json")).unwrap();
        store.save_content(&sample(), Some("draft_20260103_080000_000.json")).unwrap();

        let latest = store.latest_content().unwrap();
        assert!(latest.ends_with("content_20260102_080000_000.json"));
    }

    #[test]
    fn test_load_record_with_missing_fields() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("content_partial.json");
        fs::write(&path, r#"{"title": "Only a title"}"#).unwrap();

        let record = load_record(&path).unwrap();
        assert_eq!(record.title.as_deref(), Some("Only a title"));
        assert!(record.tags.is_none());
    }

    #[test]
    fn test_publish_log_appends() {
        let dir = TempDir::new().unwrap();
        let log = PublishLog::new(dir.path().join("nested").join("publish_log.json"));
        assert!(log.entries().unwrap().is_empty());

        for title in ["one", "two"] {
            log.append(&PublishLogEntry {
                timestamp: Local::now(),
                title: title.to_string(),
                content_type: "A".to_string(),
                result: PublishResult::new(PublishStatus::Pending, "manual"),
            })
            .unwrap();
        }

        let entries = log.entries().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].title, "one");
        assert_eq!(entries[1].title, "two");
    }

    #[test]
    fn test_publish_log_rejects_corrupt_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("publish_log.json");
        fs::write(&path, "not json").unwrap();

        let log = PublishLog::new(&path);
        let entry = PublishLogEntry {
            timestamp: Local::now(),
            title: "t".to_string(),
            content_type: "A".to_string(),
            result: PublishResult::error("boom"),
        };
        assert!(matches!(
            log.append(&entry),
            Err(RedcastError::Storage(StorageError::Json(_)))
        ));
    }
}
