//! Job scheduling.
//!
//! Runs synthesized mux jobs on a bounded worker pool. Every job spawns one
//! muxer through a [`JobRunner`](crate::runner::JobRunner), relays its
//! progress lines as events, classifies its exit status and hands the output
//! to the [`PostProcessor`](crate::postprocess::PostProcessor).
//!
//! # Example
//!
//! ```ignore
//! use automux_core::scheduler::JobScheduler;
//!
//! let scheduler = JobScheduler::new(
//!     config.scheduler.clone(),
//!     config.tools.clone(),
//!     Arc::new(ProcessRunner::new()),
//!     PostProcessor::new(config.post_process.clone(), &config.muxing.root_dir),
//! );
//! let summary = scheduler.run(jobs, events).await;
//! println!("{} completed, {} failed", summary.completed(), summary.failed());
//! ```

mod pool;
mod types;

pub use pool::JobScheduler;
pub use types::{BatchSummary, PoolStatus, TaskOutcome};
