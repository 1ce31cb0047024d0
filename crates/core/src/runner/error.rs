//! Error types for the runner module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while running an external muxer.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// Program not found on disk or in PATH.
    #[error("Program not found: {path}")]
    ProgramNotFound { path: PathBuf },

    /// The OS refused to start the process.
    #[error("Failed to spawn {path}: {source}")]
    SpawnFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// I/O error while reading output or waiting for exit.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RunnerError {
    /// Classifies a spawn error for `path`.
    pub fn from_spawn(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::ProgramNotFound { path: path.into() }
        } else {
            Self::SpawnFailed {
                path: path.into(),
                source,
            }
        }
    }
}
