//! Error types for the engine module.

use thiserror::Error;

use crate::config::ConfigError;
use crate::matcher::MatcherError;

/// Errors that stop a batch before any job starts.
///
/// Per-job problems never surface here; they are reported as `TaskFailed`
/// events.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Discovery could not scan the root directory.
    #[error("Discovery failed: {0}")]
    Matcher(#[from] MatcherError),
}
