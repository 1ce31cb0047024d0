//! Trait definitions for the runner module.

use async_trait::async_trait;
use std::path::Path;
use tokio::sync::mpsc;

use super::error::RunnerError;
use super::types::{ProcessExit, RunnerEvent};
use crate::command::MuxCommand;

/// Runs one muxer process to completion.
#[async_trait]
pub trait JobRunner: Send + Sync {
    /// Returns the name of this runner implementation.
    fn name(&self) -> &str;

    /// Runs `program` with the command's arguments.
    ///
    /// Sends [`RunnerEvent::Spawned`] once the process is up, then one
    /// [`RunnerEvent::Output`] per line of output. If the receiver is
    /// dropped the process still runs to completion.
    async fn run(
        &self,
        program: &Path,
        command: &MuxCommand,
        events: mpsc::Sender<RunnerEvent>,
    ) -> Result<ProcessExit, RunnerError>;
}
