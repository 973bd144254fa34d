//! Configuration management for Redcast

use chrono::NaiveTime;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};
use crate::types::ContentType;

/// Format used for daily post times
pub const POST_TIME_FORMAT: &str = "%H:%M";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub product: ProductConfig,
    pub content_strategy: ContentStrategyConfig,
    pub hashtags: HashtagConfig,
    pub ai: AiConfig,
    pub publish: PublishConfig,
    pub image: ImageConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductConfig {
    pub name: String,
    pub url: String,
    pub description: String,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub target_users: Vec<String>,
    #[serde(default)]
    pub pain_points: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentStrategyConfig {
    pub content_types: Vec<ContentType>,
    /// Daily `HH:MM` times; duplicates are kept
    #[serde(default)]
    pub post_times: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HashtagConfig {
    /// Every note carries one of these; must not be empty
    pub primary: Vec<String>,
    #[serde(default)]
    pub secondary: Vec<String>,
    #[serde(default)]
    pub optional: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Overrides the default Messages API endpoint
    #[serde(default)]
    pub endpoint: Option<String>,
}

fn default_api_key_env() -> String {
    "ANTHROPIC_API_KEY".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishConfig {
    pub auto_publish: bool,
    pub save_draft: bool,
    pub log_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageConfig {
    pub save_path: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    #[serde(default = "default_templates_path")]
    pub templates_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            templates_path: default_templates_path(),
        }
    }
}

fn default_output_dir() -> String {
    "logs".to_string()
}

fn default_templates_path() -> String {
    "config/templates.json".to_string()
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        let config_path = resolve_config_path()?;
        Self::load_from_path(&config_path)
    }

    /// Load from an explicit path if given, else from the default location
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_path(path),
            None => Self::load(),
        }
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(content).map_err(ConfigError::ParseError)?;
        config.expand_paths();
        config.validate()?;
        Ok(config)
    }

    fn expand_paths(&mut self) {
        let expand = |p: &str| shellexpand::tilde(p).to_string();
        self.publish.log_path = expand(&self.publish.log_path);
        self.image.save_path = expand(&self.image.save_path);
        self.storage.output_dir = expand(&self.storage.output_dir);
        self.storage.templates_path = expand(&self.storage.templates_path);
    }

    /// Check invariants that serde cannot express
    pub fn validate(&self) -> Result<()> {
        let types = &self.content_strategy.content_types;
        if types.is_empty() {
            return Err(ConfigError::MissingField("content_strategy.content_types".to_string()).into());
        }

        for ct in types {
            if !ct.weight.is_finite() || ct.weight < 0.0 {
                return Err(invalid(
                    "content_strategy.content_types.weight",
                    format!("weight of '{}' must be a non-negative number", ct.name),
                ));
            }
        }
        if types.iter().map(|ct| ct.weight).sum::<f64>() <= 0.0 {
            return Err(invalid(
                "content_strategy.content_types.weight",
                "at least one weight must be positive",
            ));
        }

        if self.hashtags.primary.is_empty() {
            return Err(ConfigError::MissingField("hashtags.primary".to_string()).into());
        }
        if self.hashtags.primary.iter().any(|tag| tag.trim_start_matches('#').trim().is_empty()) {
            return Err(invalid("hashtags.primary", "tags must not be blank"));
        }

        self.post_times()?;

        if self.ai.max_tokens == 0 {
            return Err(invalid("ai.max_tokens", "must be greater than zero"));
        }
        if !(0.0..=1.0).contains(&self.ai.temperature) {
            return Err(invalid("ai.temperature", "must be between 0.0 and 1.0"));
        }
        if self.ai.timeout_secs == 0 {
            return Err(invalid("ai.timeout_secs", "must be greater than zero"));
        }

        Ok(())
    }

    /// Parsed daily post times, in configured order
    pub fn post_times(&self) -> Result<Vec<NaiveTime>> {
        self.content_strategy
            .post_times
            .iter()
            .map(|s| parse_post_time(s))
            .collect()
    }

    /// Read the model API key from the configured environment variable
    pub fn api_key(&self) -> Result<SecretString> {
        match std::env::var(&self.ai.api_key_env) {
            Ok(key) if !key.trim().is_empty() => Ok(SecretString::from(key)),
            _ => Err(ConfigError::MissingApiKey(self.ai.api_key_env.clone()).into()),
        }
    }

    pub fn output_dir(&self) -> PathBuf {
        PathBuf::from(&self.storage.output_dir)
    }

    pub fn templates_path(&self) -> PathBuf {
        PathBuf::from(&self.storage.templates_path)
    }
}

/// Parse a strict `HH:MM` post time
pub fn parse_post_time(input: &str) -> Result<NaiveTime> {
    let valid_shape = input.len() == 5 && input.as_bytes()[2] == b':';
    match NaiveTime::parse_from_str(input, POST_TIME_FORMAT) {
        Ok(time) if valid_shape => Ok(time),
        _ => Err(invalid(
            "content_strategy.post_times",
            format!("'{}' is not a valid HH:MM time", input),
        )),
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> crate::error::RedcastError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        reason: reason.into(),
    }
    .into()
}

/// Resolve the configuration file path (`REDCAST_CONFIG`, then the XDG config dir)
pub fn resolve_config_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var("REDCAST_CONFIG") {
        return Ok(PathBuf::from(shellexpand::tilde(&path).to_string()));
    }

    let config_dir = dirs::config_dir()
        .ok_or_else(|| ConfigError::MissingField("config directory".to_string()))?;

    Ok(config_dir.join("redcast").join("config.toml"))
}
