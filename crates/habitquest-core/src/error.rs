//! Core error types for habitquest-core.
//!
//! Errors are grouped by the layer that produces them. Idempotent no-ops in
//! the engine (completing twice, failing an already-resolved day, using an
//! item that is not in the inventory) are not errors and never show up here.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for habitquest-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Bad user input rejected by the engine
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Snapshot persistence errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown dot-path key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Validation errors for user input to the engine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Habit name missing or whitespace only
    #[error("Habit name must not be empty")]
    EmptyName,

    /// Minutes below the one-minute minimum
    #[error("Invalid minutes for '{field}': {value} (minimum is 1)")]
    InvalidMinutes { field: String, value: i64 },

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// Snapshot persistence errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Snapshot file exists but could not be read
    #[error("Failed to read state from {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Snapshot could not be written or moved into place
    #[error("Failed to write state to {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Snapshot content is not a valid engine state
    #[error("Corrupt state file {path}: {message}")]
    Corrupt { path: PathBuf, message: String },
}

impl From<Box<dyn std::error::Error + Send + Sync>> for CoreError {
    fn from(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        CoreError::Custom(err.to_string())
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseFailed(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_converts_into_core_error() {
        let err: CoreError = ValidationError::EmptyName.into();
        assert!(matches!(err, CoreError::Validation(ValidationError::EmptyName)));
        assert_eq!(err.to_string(), "Validation error: Habit name must not be empty");
    }

    #[test]
    fn invalid_minutes_message_names_the_field() {
        let err = ValidationError::InvalidMinutes {
            field: "minutes_done".into(),
            value: 0,
        };
        assert!(err.to_string().contains("minutes_done"));
        assert!(err.to_string().contains("minimum is 1"));
    }
}
