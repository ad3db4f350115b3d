//! Error types for DocAnalyzer.
//!
//! Library crates use [`AnalyzerError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all DocAnalyzer operations.
#[derive(Debug, thiserror::Error)]
pub enum AnalyzerError {
    /// Configuration loading or validation error (including a missing API key).
    #[error("config error: {message}")]
    Config { message: String },

    /// The completion provider answered with a non-success status or a body
    /// we could not interpret.
    #[error("OpenRouter API error: {message}")]
    Upstream { status: Option<u16>, message: String },

    /// Error message relayed verbatim by the analyze server.
    #[error("{message}")]
    Service { status: u16, message: String },

    /// Transport failure or timeout talking to a remote endpoint.
    #[error("network error: {0}")]
    Network(String),

    /// The request was superseded by a newer question.
    #[error("request cancelled")]
    Cancelled,

    /// Bad input (blank question, malformed contact form, ...).
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, AnalyzerError>;

impl AnalyzerError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create an upstream error, optionally tagged with the HTTP status.
    pub fn upstream(status: Option<u16>, msg: impl Into<String>) -> Self {
        Self::Upstream {
            status,
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error only means the request was superseded.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
