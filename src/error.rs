//! Error handling for the pool job engine
//!
//! Errors raised while loading configuration or ingesting daemon templates.
//! Share rejections are not errors: they are ordinary values, see
//! [`crate::job::ShareRejection`].

use thiserror::Error;

/// Result type alias for pool engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the pool engine
#[derive(Error, Debug)]
pub enum Error {
    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML configuration parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Malformed or incomplete block template from the daemon
    #[error("Invalid block template: {message}")]
    Template { message: String },

    /// Target decoding errors
    #[error("Invalid target: {message}")]
    Target { message: String },

    /// Unknown or unusable mining algorithm
    #[error("Algorithm error: {message}")]
    Algorithm { message: String },

    /// Randomness source failures
    #[error("Random source error: {message}")]
    Random { message: String },

    /// Invalid state errors
    #[error("Invalid state: {message}")]
    InvalidState { message: String },
}

impl Error {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a template error
    pub fn template(message: impl Into<String>) -> Self {
        Self::Template {
            message: message.into(),
        }
    }

    /// Create a target error
    pub fn target(message: impl Into<String>) -> Self {
        Self::Target {
            message: message.into(),
        }
    }

    /// Create an algorithm error
    pub fn algorithm(message: impl Into<String>) -> Self {
        Self::Algorithm {
            message: message.into(),
        }
    }

    /// Create a random source error
    pub fn random(message: impl Into<String>) -> Self {
        Self::Random {
            message: message.into(),
        }
    }

    /// Create an invalid state error
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState {
            message: message.into(),
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            Error::Json(_) => "json",
            Error::Yaml(_) => "yaml",
            Error::Io(_) => "io",
            Error::Config { .. } => "config",
            Error::Template { .. } => "template",
            Error::Target { .. } => "target",
            Error::Algorithm { .. } => "algorithm",
            Error::Random { .. } => "random",
            Error::InvalidState { .. } => "invalid_state",
        }
    }
}
