//! Progress extraction from muxer output.
//!
//! Each backend reports progress in its own line format; [`parse`] turns a
//! single line into a percentage, ignoring everything else.

mod parser;

pub use parser::{byte_percent, parse};
