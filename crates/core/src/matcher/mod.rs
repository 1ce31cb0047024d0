//! Episode discovery.
//!
//! Walks the root directory for video elementary streams and, for each one,
//! gathers the audio, subtitle and chapter files sharing its file stem.
//! Videos whose output already exists (plain or checksum-tagged) are skipped,
//! so scanning the same directory twice never re-muxes a file.
//!
//! # Example
//!
//! ```ignore
//! use automux_core::matcher::{FfprobeFrameRate, FileMatcher};
//!
//! let probe = Arc::new(FfprobeFrameRate::new("ffprobe"));
//! let matcher = FileMatcher::new(config.muxing.clone(), probe);
//!
//! for episode in matcher.discover().await? {
//!     println!("{} <- {}", episode.display_name(), episode.video_file.display());
//! }
//! ```

mod error;
mod file_matcher;
mod probe;
mod types;

pub use error::MatcherError;
pub use file_matcher::{chapter_language, is_tagged_output, FileMatcher};
pub use probe::{FfprobeFrameRate, FrameRateProbe};
pub use types::Episode;

pub(crate) use types::file_name_lossy;
