//! Error types for Redcast

use thiserror::Error;

pub type Result<T> = std::result::Result<T, RedcastError>;

#[derive(Error, Debug)]
pub enum RedcastError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("Content error: {0}")]
    Content(#[from] ContentError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Publishing channel error: {0}")]
    Channel(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl RedcastError {
    /// Returns the appropriate exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            RedcastError::InvalidInput(_) => 3,
            RedcastError::Model(ModelError::Authentication(_)) => 2,
            RedcastError::Config(ConfigError::MissingApiKey(_)) => 2,
            RedcastError::Model(_) => 1,
            RedcastError::Config(_) => 1,
            RedcastError::Content(_) => 1,
            RedcastError::Storage(_) => 1,
            RedcastError::Channel(_) => 1,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to parse templates: {0}")]
    TemplateParseError(#[from] serde_json::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Unknown template: {0}")]
    UnknownTemplate(String),

    #[error("Unknown template variable: {{{0}}}")]
    UnknownVariable(String),

    #[error("API key not set: export {0}")]
    MissingApiKey(String),
}

#[derive(Error, Debug, Clone)]
pub enum ModelError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("API returned status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Unusable response: {0}")]
    Response(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ContentError {
    #[error("Missing required field: {0}")]
    MissingField(String),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No generated content found in {0}")]
    NoContent(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_invalid_input() {
        let error = RedcastError::InvalidInput("count must be positive".to_string());
        assert_eq!(error.exit_code(), 3);
    }

    #[test]
    fn test_exit_code_authentication_error() {
        let error = RedcastError::Model(ModelError::Authentication("bad key".to_string()));
        assert_eq!(error.exit_code(), 2);

        let error = RedcastError::Config(ConfigError::MissingApiKey("ANTHROPIC_API_KEY".into()));
        assert_eq!(error.exit_code(), 2);
    }

    #[test]
    fn test_exit_code_other_errors() {
        let model = RedcastError::Model(ModelError::Network("refused".to_string()));
        assert_eq!(model.exit_code(), 1);

        let content = RedcastError::Content(ContentError::MissingField("tags".to_string()));
        assert_eq!(content.exit_code(), 1);

        let config = RedcastError::Config(ConfigError::UnknownTemplate("t9".to_string()));
        assert_eq!(config.exit_code(), 1);

        let storage = RedcastError::Storage(StorageError::NoContent("logs".to_string()));
        assert_eq!(storage.exit_code(), 1);

        let channel = RedcastError::Channel("rejected".to_string());
        assert_eq!(channel.exit_code(), 1);
    }

    #[test]
    fn test_error_message_formatting() {
        let error = RedcastError::Content(ContentError::MissingField("title".to_string()));
        assert_eq!(
            format!("{}", error),
            "Content error: Missing required field: title"
        );

        let error = RedcastError::Config(ConfigError::UnknownVariable("pain".to_string()));
        assert_eq!(
            format!("{}", error),
            "Configuration error: Unknown template variable: {pain}"
        );

        let error = RedcastError::Model(ModelError::Api {
            status: 529,
            message: "overloaded".to_string(),
        });
        assert_eq!(
            format!("{}", error),
            "Model error: API returned status 529: overloaded"
        );
    }

    #[test]
    fn test_invalid_value_formatting() {
        let error = ConfigError::InvalidValue {
            field: "content_strategy.post_times".to_string(),
            reason: "'25:00' is not HH:MM".to_string(),
        };
        let message = format!("{}", error);
        assert!(message.contains("content_strategy.post_times"));
        assert!(message.contains("25:00"));
    }

    #[test]
    fn test_error_conversion_from_nested_errors() {
        let err: RedcastError = ConfigError::MissingField("product.name".to_string()).into();
        assert!(matches!(err, RedcastError::Config(_)));

        let err: RedcastError = ModelError::Timeout(30).into();
        assert!(matches!(err, RedcastError::Model(ModelError::Timeout(30))));

        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: RedcastError = StorageError::from(io).into();
        assert!(matches!(err, RedcastError::Storage(StorageError::Io(_))));
    }

    #[test]
    fn test_model_error_clone() {
        let original = ModelError::Network("Connection failed".to_string());
        let cloned = original.clone();
        assert_eq!(format!("{}", original), format!("{}", cloned));
    }
}
