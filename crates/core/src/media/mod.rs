//! Media format registry.
//!
//! Statically typed descriptions of the inputs and outputs the muxer knows
//! about: video elementary streams, loose audio tracks, the two output
//! containers, and the frame rate setting handed to the backends.

mod types;

pub use types::{
    extension_matches, AudioSource, FrameRate, OutputFormat, VideoSource, CHAPTER_EXTENSION,
    SUBTITLE_EXTENSION,
};
