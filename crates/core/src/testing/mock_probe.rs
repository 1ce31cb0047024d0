//! Mock frame rate probe for testing.

use async_trait::async_trait;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::matcher::{FrameRateProbe, MatcherError};

/// Mock implementation of the FrameRateProbe trait.
///
/// Answers every probe with a fixed rate, except for paths marked to fail.
#[derive(Debug, Clone)]
pub struct MockFrameRateProbe {
    rate: Arc<RwLock<String>>,
    failures: Arc<RwLock<HashSet<PathBuf>>>,
    probes: Arc<RwLock<Vec<PathBuf>>>,
}

impl MockFrameRateProbe {
    /// Create a probe answering `rate`.
    pub fn new(rate: impl Into<String>) -> Self {
        Self {
            rate: Arc::new(RwLock::new(rate.into())),
            failures: Arc::new(RwLock::new(HashSet::new())),
            probes: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Change the answered rate.
    pub async fn set_rate(&self, rate: impl Into<String>) {
        *self.rate.write().await = rate.into();
    }

    /// Make probing `video` fail.
    pub async fn fail_for(&self, video: impl AsRef<Path>) {
        self.failures
            .write()
            .await
            .insert(video.as_ref().to_path_buf());
    }

    /// Every path probed so far.
    pub async fn recorded_probes(&self) -> Vec<PathBuf> {
        self.probes.read().await.clone()
    }
}

impl Default for MockFrameRateProbe {
    fn default() -> Self {
        Self::new("24000/1001")
    }
}

#[async_trait]
impl FrameRateProbe for MockFrameRateProbe {
    fn name(&self) -> &str {
        "mock"
    }

    async fn probe(&self, video: &Path) -> Result<String, MatcherError> {
        self.probes.write().await.push(video.to_path_buf());
        if self.failures.read().await.contains(video) {
            return Err(MatcherError::probe_failed(video, "mock failure"));
        }
        Ok(self.rate.read().await.clone())
    }
}
