//! Batch events and the shared task list.
//!
//! The engine reports everything it does as [`MuxEvent`]s over a bounded
//! channel. Consumers either read the channel directly or fold it into a
//! [`TaskBoard`].
//!
//! # Example
//!
//! ```ignore
//! use automux_core::events::{EventSender, TaskBoard};
//!
//! let (events, mut rx) = EventSender::channel(256);
//! let board = TaskBoard::new();
//!
//! tokio::spawn(async move {
//!     while let Some(event) = rx.recv().await {
//!         board.apply(&event);
//!     }
//! });
//! ```

mod board;
mod sender;
mod types;

pub use board::TaskBoard;
pub use sender::EventSender;
pub use types::{MuxEvent, TaskProgress, TaskStatus};
