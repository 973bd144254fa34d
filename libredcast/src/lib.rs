//! Redcast - scheduled marketing notes for Xiaohongshu
//!
//! Generates notes for a product with a language model, formats and
//! publishes (or drafts) them, and runs the whole pipeline on a daily
//! schedule.

pub mod channel;
pub mod config;
pub mod error;
pub mod generator;
pub mod logging;
pub mod model;
pub mod publisher;
pub mod scheduler;
pub mod storage;
pub mod templates;
pub mod types;

// Re-export commonly used types
pub use channel::{MockChannel, PublishChannel};
pub use config::Config;
pub use error::{RedcastError, Result};
pub use generator::ContentGenerator;
pub use model::{AnthropicModel, MockModel, TextModel};
pub use publisher::Publisher;
pub use scheduler::{Clock, JobOutcome, ManualClock, Scheduler, SystemClock};
pub use storage::{PublishLog, RecordStore};
pub use templates::TemplateStore;
pub use types::{ContentRecord, GeneratedContent, PublishResult, PublishStatus};
