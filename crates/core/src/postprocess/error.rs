//! Error types for the postprocess module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while finalizing an output file.
#[derive(Debug, Error)]
pub enum PostProcessError {
    /// Failed to read the file while checksumming.
    #[error("Failed to checksum {path}: {source}")]
    ChecksumFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The target name is already taken.
    #[error("Destination already exists: {path}")]
    DestinationExists { path: PathBuf },

    /// The file does not live under the root directory.
    #[error("{path} is outside of root directory {root}")]
    OutsideRoot { path: PathBuf, root: PathBuf },

    /// Failed to create destination directory.
    #[error("Failed to create directory {path}: {source}")]
    DirectoryCreationFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to rename or move the file.
    #[error("Failed to move {source} to {destination}: {error}")]
    MoveFailed {
        source: PathBuf,
        destination: PathBuf,
        #[source]
        error: std::io::Error,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PostProcessError {
    /// Creates a new move failed error.
    pub fn move_failed(source: PathBuf, destination: PathBuf, error: std::io::Error) -> Self {
        Self::MoveFailed {
            source,
            destination,
            error,
        }
    }
}
