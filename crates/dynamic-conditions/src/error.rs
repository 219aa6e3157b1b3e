//! Error types for the condition engine.

use thiserror::Error;

/// Result type for condition operations.
pub type Result<T> = std::result::Result<T, ConditionError>;

/// Errors that can occur while loading settings or resolving values.
///
/// Only the document-level variants (`ParseError`, `SerializationError`,
/// `ConfigError`, `ValidationError`) ever reach callers. The evaluator turns
/// everything else into a "stay visible" decision.
#[derive(Debug, Error)]
pub enum ConditionError {
    /// Settings document could not be parsed.
    #[error("Failed to parse settings: {0}")]
    ParseError(String),

    /// Settings validation failed.
    #[error("Settings validation error: {0}")]
    ValidationError(String),

    /// Engine configuration is invalid.
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// No dynamic value source could be found for the element.
    #[error("Unresolvable value: {0}")]
    UnresolvableValue(String),

    /// A dynamic value could not be turned into a timestamp.
    #[error("Unparseable date: {0}")]
    UnparseableDate(String),

    /// A host callback failed.
    #[error("Host error: {0}")]
    HostError(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for ConditionError {
    fn from(err: serde_json::Error) -> Self {
        ConditionError::SerializationError(err.to_string())
    }
}

impl From<serde_yaml::Error> for ConditionError {
    fn from(err: serde_yaml::Error) -> Self {
        ConditionError::ParseError(err.to_string())
    }
}
