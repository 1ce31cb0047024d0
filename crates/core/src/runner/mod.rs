//! External job runner.
//!
//! The `JobRunner` trait is the only place the engine touches processes:
//! spawn, stream output lines, wait for exit. The scheduler depends on the
//! trait, so tests can swap in a scripted runner.
//!
//! # Example
//!
//! ```ignore
//! use automux_core::runner::{JobRunner, ProcessRunner, RunnerEvent};
//!
//! let (tx, mut rx) = tokio::sync::mpsc::channel(64);
//! let runner = ProcessRunner::new();
//! let exit = runner.run(Path::new("mkvmerge"), &command, tx).await?;
//! ```

mod error;
mod process;
mod traits;
mod types;

pub use error::RunnerError;
pub use process::{forward_lines, ProcessRunner};
pub use traits::JobRunner;
pub use types::{ProcessExit, RunnerEvent};
