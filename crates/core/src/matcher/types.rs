//! Types for the matcher module.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::media::OutputFormat;

/// One unit of muxing work: a video file, its matched siblings and the
/// output it will produce.
///
/// Built once at discovery time and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Episode {
    /// Identifier used in every event about this episode.
    pub task_id: Uuid,
    /// The video elementary stream.
    pub video_file: PathBuf,
    /// Frame rate as handed to the muxer, e.g. "24000/1001".
    pub frame_rate: String,
    /// Audio tracks in match order.
    pub audio_files: Vec<PathBuf>,
    /// Language tag for every audio track.
    pub audio_language: String,
    /// Subtitle tracks in match order.
    pub subtitle_files: Vec<PathBuf>,
    /// Language tag for every subtitle track.
    pub subtitle_language: String,
    /// Chapter file, if chapters are enabled and one exists.
    pub chapter_file: Option<PathBuf>,
    /// Language of the chapter names.
    pub chapter_language: String,
    /// Where the muxer writes its result.
    pub output_file: PathBuf,
    /// Container of the output file.
    pub output_format: OutputFormat,
    /// Size of the video plus all audio files.
    pub total_bytes: u64,
}

impl Episode {
    /// Name shown for this episode in progress displays.
    pub fn display_name(&self) -> String {
        file_name_lossy(&self.output_file)
    }

    /// Number of tracks the output will carry (video, audio, subtitles).
    pub fn track_count(&self) -> usize {
        1 + self.audio_files.len() + self.subtitle_files.len()
    }
}

pub(crate) fn file_name_lossy(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_and_track_count() {
        let episode = Episode {
            task_id: Uuid::new_v4(),
            video_file: PathBuf::from("/media/s01.264"),
            frame_rate: "24000/1001".to_string(),
            audio_files: vec![PathBuf::from("/media/s01.01.flac")],
            audio_language: "jpn".to_string(),
            subtitle_files: vec![
                PathBuf::from("/media/s01.sc.sup"),
                PathBuf::from("/media/s01.tc.sup"),
            ],
            subtitle_language: "chi".to_string(),
            chapter_file: None,
            chapter_language: "eng".to_string(),
            output_file: PathBuf::from("/media/s01.mkv"),
            output_format: OutputFormat::Mkv,
            total_bytes: 0,
        };

        assert_eq!(episode.display_name(), "s01.mkv");
        assert_eq!(episode.track_count(), 4);
    }
}
