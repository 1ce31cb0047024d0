//! Error types for the matcher module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during discovery.
#[derive(Debug, Error)]
pub enum MatcherError {
    /// The configured root directory does not exist or is not a directory.
    #[error("Root directory not found: {path}")]
    RootNotFound { path: PathBuf },

    /// A directory could not be listed.
    #[error("Failed to read directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Frame rate probing failed.
    #[error("Failed to probe frame rate of {path}: {reason}")]
    ProbeFailed { path: PathBuf, reason: String },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl MatcherError {
    /// Creates a new probe failed error.
    pub fn probe_failed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::ProbeFailed {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
