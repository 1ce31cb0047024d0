//! Batch entry point.
//!
//! [`MuxEngine`] ties the pipeline together: the file matcher builds the
//! episode list, the command synthesizer turns each episode into a job and
//! the job scheduler runs them. Progress is reported through an
//! [`EventSender`](crate::events::EventSender).
//!
//! # Example
//!
//! ```ignore
//! use automux_core::{EventSender, FfprobeFrameRate, MuxEngine, ProcessRunner};
//!
//! let probe = FfprobeFrameRate::new(&config.tools.ffprobe);
//! let engine = MuxEngine::new(config, ProcessRunner::new(), probe)?;
//!
//! let (events, mut rx) = EventSender::channel(256);
//! let batch = engine.start(events).await?;
//! while let Some(event) = rx.recv().await {
//!     board.apply(&event);
//! }
//! let summary = batch.await?;
//! ```

mod error;
mod mux_engine;

pub use error::EngineError;
pub use mux_engine::MuxEngine;
