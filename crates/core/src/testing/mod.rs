//! Testing utilities and mock implementations.
//!
//! This module provides mocks for the engine's external seams (the muxer
//! processes and the frame rate probe), so whole batches can be run in tests
//! without MKVToolNix, L-SMASH or ffprobe installed.
//!
//! # Example
//!
//! ```rust,ignore
//! use automux_core::testing::{MockFrameRateProbe, MockJobRunner};
//!
//! let runner = MockJobRunner::new();
//! runner.set_exit(ProcessExit::with_code(2)).await;
//!
//! let engine = MuxEngine::new(config, runner.clone(), MockFrameRateProbe::default());
//! ```

mod mock_probe;
mod mock_runner;

pub use mock_probe::MockFrameRateProbe;
pub use mock_runner::{MockJobRunner, RecordedInvocation};

pub use fixtures::touch;

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::path::Path;
    use uuid::Uuid;

    use crate::matcher::Episode;
    use crate::media::OutputFormat;

    /// Create a test episode with reasonable defaults.
    ///
    /// The container follows the output extension (`mp4` or else `mkv`); no
    /// audio, subtitles or chapters.
    pub fn episode(video: impl AsRef<Path>, output: impl AsRef<Path>) -> Episode {
        let output = output.as_ref();
        let output_format = match output.extension().and_then(|e| e.to_str()) {
            Some("mp4") => OutputFormat::Mp4,
            _ => OutputFormat::Mkv,
        };

        Episode {
            task_id: Uuid::new_v4(),
            video_file: video.as_ref().to_path_buf(),
            frame_rate: "24000/1001".to_string(),
            audio_files: Vec::new(),
            audio_language: "jpn".to_string(),
            subtitle_files: Vec::new(),
            subtitle_language: "jpn".to_string(),
            chapter_file: None,
            chapter_language: "eng".to_string(),
            output_file: output.to_path_buf(),
            output_format,
            total_bytes: 1000,
        }
    }

    /// Create a file of `len` zero bytes, with any missing parent directories.
    pub async fn touch(path: &Path, len: usize) {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .expect("fixture directory should be creatable");
        }
        tokio::fs::write(path, vec![0u8; len])
            .await
            .expect("fixture file should be writable");
    }
}
