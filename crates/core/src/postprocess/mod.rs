//! Post-processing of finished outputs.
//!
//! After a muxer exits, its output can be checksum-tagged (CRC-32 embedded
//! in the file name as `name [XXXXXXXX].ext`) and then relocated under
//! `<root>/completed/`, mirroring its path relative to the root. Both steps
//! are optional and run in that order.
//!
//! # Example
//!
//! ```ignore
//! use automux_core::postprocess::PostProcessor;
//!
//! let processor = PostProcessor::new(config.post_process.clone(), &config.muxing.root_dir);
//! if let Some(path) = processor.finalize(&episode, &events).await? {
//!     println!("Finished: {}", path.display());
//! }
//! ```

mod error;
mod processor;

pub use error::PostProcessError;
pub use processor::{relocate, tagged_path, PostProcessor, COMPLETED_DIR_NAME};
