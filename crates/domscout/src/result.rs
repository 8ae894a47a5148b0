//! Result and error types for domscout.

use std::fmt;

use thiserror::Error;

/// Result type for domscout operations
pub type ScoutResult<T> = Result<T, ScoutError>;

/// Login control that could not be located on the login page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginField {
    /// Email or username input
    Username,
    /// Password input
    Password,
    /// Submit control
    SubmitButton,
}

impl fmt::Display for LoginField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Username => "username field",
            Self::Password => "password field",
            Self::SubmitButton => "submit button",
        };
        f.write_str(name)
    }
}

/// Errors that can occur during discovery
#[derive(Debug, Error)]
pub enum ScoutError {
    /// Browser launch error
    #[error("Failed to launch browser: {message}")]
    BrowserLaunch {
        /// Error message
        message: String,
    },

    /// Target page unreachable (non-2xx, timeout, DNS failure)
    #[error("Navigation to {url} failed: {message}")]
    NavigationError {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// A login control could not be found within the field wait
    #[error("Login failed: {field} not found within {ms}ms")]
    LoginFieldNotFound {
        /// Which control was missing
        field: LoginField,
        /// Wait ceiling in milliseconds
        ms: u64,
    },

    /// No post-login signal observed after submitting credentials
    #[error("Login not confirmed after {ms}ms")]
    LoginConfirmationTimeout {
        /// Wait ceiling in milliseconds
        ms: u64,
    },

    /// A single element could not be read (stale, detached, script failure)
    #[error("Element processing failed: {message}")]
    ElementProcessing {
        /// Error message
        message: String,
    },

    /// The browser process or its connection went away
    #[error("Browser driver crashed: {message}")]
    DriverCrash {
        /// Error message
        message: String,
    },

    /// A driver command failed without taking the session down
    #[error("Driver command failed: {message}")]
    Driver {
        /// Error message
        message: String,
    },

    /// Invalid configuration
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ScoutError {
    /// Create an element processing error
    #[must_use]
    pub fn element(message: impl Into<String>) -> Self {
        Self::ElementProcessing {
            message: message.into(),
        }
    }

    /// Create a driver command error
    #[must_use]
    pub fn driver(message: impl Into<String>) -> Self {
        Self::Driver {
            message: message.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Whether the error ends the whole run rather than a single element
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::DriverCrash { .. } | Self::BrowserLaunch { .. })
    }
}
