//! Custom error types for the healer
//!
//! Provides a unified error handling system across all modules.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Main error type for healer operations
#[derive(Error, Debug)]
pub enum HealerError {
    /// A snapshot or script file does not exist
    #[error("{} not found", path.display())]
    MissingFile { path: PathBuf },

    /// Candidate code failed to parse
    #[error("Invalid Python: {0}")]
    InvalidSyntax(String),

    /// The model produced no usable code
    #[error("Empty code received")]
    EmptyCandidate,

    /// The script ran past the wall-clock bound and was killed
    #[error("Script execution timed out after {secs}s")]
    ExecutionTimeout { secs: u64 },

    /// The interpreter subprocess could not be started
    #[error("Failed to launch script: {0}")]
    LaunchFailure(String),

    /// Credential or client construction failure
    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    /// Model API answered with an error
    #[error("Provider error: {0}")]
    Provider(String),

    /// WebDriver errors
    #[error("Browser error: {0}")]
    Browser(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON parsing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type for healer operations
pub type Result<T> = std::result::Result<T, HealerError>;

impl HealerError {
    /// Create a missing file error
    pub fn missing(path: impl AsRef<Path>) -> Self {
        Self::MissingFile {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Create a provider error
    pub fn provider(msg: impl Into<String>) -> Self {
        Self::Provider(msg.into())
    }

    /// Create a model unavailable error
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::ModelUnavailable(msg.into())
    }

    /// Create a browser error
    pub fn browser(msg: impl Into<String>) -> Self {
        Self::Browser(msg.into())
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether the repair loop may retry after this error
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::InvalidSyntax(_) | Self::EmptyCandidate)
    }
}
