//! Error types for the CLI

use thiserror::Error;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Errors that can occur in the CLI
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// Invalid argument
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Error message
        message: String,
    },

    /// Discovery run failed
    #[error("Discovery failed: {0}")]
    Scout(#[from] domscout::ScoutError),

    /// IO error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML (de)serialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an invalid argument error
    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }
}
