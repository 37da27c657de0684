//! Error Types
//!
//! Every failure the library can surface to a caller. Nothing in the crate retries
//! on its own: errors are returned to the immediate caller (HTTP handler or operator).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PercolatorError {
    /// Vocabulary or taxonomy source missing, unreadable or malformed (strict mode).
    #[error("Cannot read source {path}: {reason}")]
    SourceRead { path: String, reason: String },

    #[error("Cannot write {path}: {reason}")]
    OutputWrite { path: String, reason: String },

    #[error("Unknown domain: {0}")]
    UnknownDomain(String),

    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("Text extraction timed out")]
    ExtractionTimeout,

    #[error("Text extraction could not be performed: {0}")]
    ExtractionFailure(String),

    /// The backend could not be reached (connection refused, timeout, DNS).
    #[error("Search backend unavailable: {0}")]
    BackendUnavailable(String),

    /// The backend answered with a non-success status.
    #[error("Search backend error (status {status}): {body}")]
    Backend { status: u16, body: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl PercolatorError {
    pub fn source_read(path: impl AsRef<std::path::Path>, reason: impl ToString) -> Self {
        Self::SourceRead {
            path: path.as_ref().display().to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn output_write(path: impl AsRef<std::path::Path>, reason: impl ToString) -> Self {
        Self::OutputWrite {
            path: path.as_ref().display().to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn invalid_parameter(name: &str, reason: impl ToString) -> Self {
        Self::InvalidParameter {
            name: name.to_string(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PercolatorError>;
