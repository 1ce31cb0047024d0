use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::command::Backend;
use crate::media::{AudioSource, FrameRate, OutputFormat, VideoSource};

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub muxing: MuxingConfiguration,
    #[serde(default)]
    pub tools: ToolsConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub post_process: PostProcessConfig,
}

/// What to mux and how: the user's choices for one batch run.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MuxingConfiguration {
    /// Directory scanned (recursively) for video files.
    pub root_dir: PathBuf,
    /// Video elementary stream format that seeds each episode.
    pub video_source: VideoSource,
    /// Audio formats matched next to each video. Empty means video-only.
    #[serde(default)]
    pub audio_sources: Vec<AudioSource>,
    /// Output container.
    pub output: OutputFormat,
    /// Frame rate for the video track, or "auto" to probe it.
    #[serde(default)]
    pub frame_rate: FrameRate,
    /// Language tag applied to every audio track.
    #[serde(default = "default_language")]
    pub audio_language: String,
    /// Language tag applied to every subtitle track.
    #[serde(default = "default_language")]
    pub subtitle_language: String,
    /// Whether `<stem>.txt` chapter files are muxed.
    #[serde(default = "default_true")]
    pub mux_chapters: bool,
    /// Whether `<stem>*.sup` subtitle files are muxed.
    #[serde(default)]
    pub mux_subtitles: bool,
}

impl MuxingConfiguration {
    /// Creates a configuration with defaults for everything but the essentials.
    pub fn new(root_dir: PathBuf, video_source: VideoSource, output: OutputFormat) -> Self {
        Self {
            root_dir,
            video_source,
            audio_sources: Vec::new(),
            output,
            frame_rate: FrameRate::default(),
            audio_language: default_language(),
            subtitle_language: default_language(),
            mux_chapters: true,
            mux_subtitles: false,
        }
    }

    /// Sets the audio sources to match.
    pub fn with_audio_sources(mut self, sources: Vec<AudioSource>) -> Self {
        self.audio_sources = sources;
        self
    }

    /// Sets the frame rate.
    pub fn with_frame_rate(mut self, frame_rate: FrameRate) -> Self {
        self.frame_rate = frame_rate;
        self
    }

    /// Enables or disables chapter muxing.
    pub fn with_chapters(mut self, enabled: bool) -> Self {
        self.mux_chapters = enabled;
        self
    }

    /// Enables or disables subtitle muxing.
    pub fn with_subtitles(mut self, enabled: bool) -> Self {
        self.mux_subtitles = enabled;
        self
    }
}

fn default_language() -> String {
    "jpn".to_string()
}

fn default_true() -> bool {
    true
}

/// Locations of the external programs.
///
/// An empty path disables the corresponding backend.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ToolsConfig {
    #[serde(default = "default_mkvmerge")]
    pub mkvmerge: PathBuf,
    #[serde(default = "default_mp4muxer")]
    pub mp4muxer: PathBuf,
    #[serde(default = "default_ffprobe")]
    pub ffprobe: PathBuf,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            mkvmerge: default_mkvmerge(),
            mp4muxer: default_mp4muxer(),
            ffprobe: default_ffprobe(),
        }
    }
}

impl ToolsConfig {
    /// Returns the program driving `backend`, or None if it is disabled.
    pub fn program_for(&self, backend: Backend) -> Option<&Path> {
        let path = match backend {
            Backend::MkvMerge => &self.mkvmerge,
            Backend::Mp4Muxer => &self.mp4muxer,
        };
        if path.as_os_str().is_empty() {
            None
        } else {
            Some(path.as_path())
        }
    }
}

fn default_mkvmerge() -> PathBuf {
    PathBuf::from("mkvmerge")
}

fn default_mp4muxer() -> PathBuf {
    PathBuf::from("muxer")
}

fn default_ffprobe() -> PathBuf {
    PathBuf::from("ffprobe")
}

/// Worker pool configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SchedulerConfig {
    /// Maximum muxing jobs running at once.
    #[serde(default = "default_max_parallel")]
    pub max_parallel_jobs: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_parallel_jobs: default_max_parallel(),
        }
    }
}

/// One muxer per NUMA node keeps each job's I/O local; hosts without the
/// sysfs topology get a small fixed pool.
fn default_max_parallel() -> usize {
    numa_node_count().unwrap_or(2)
}

fn numa_node_count() -> Option<usize> {
    let entries = std::fs::read_dir("/sys/devices/system/node").ok()?;
    let count = entries
        .filter_map(|e| e.ok())
        .filter(|e| {
            e.file_name()
                .to_str()
                .and_then(|name| name.strip_prefix("node"))
                .map(|n| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()))
                .unwrap_or(false)
        })
        .count();
    (count > 0).then_some(count)
}

/// What happens to an output file after its muxer exits.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PostProcessConfig {
    /// Append " [CRC32]" to the output file name.
    #[serde(default)]
    pub embed_crc32: bool,
    /// Move finished files under `<root>/completed/`, mirroring their path.
    #[serde(default)]
    pub move_to_completed: bool,
    /// Read size used while checksumming.
    #[serde(default = "default_read_buffer")]
    pub read_buffer_bytes: usize,
}

fn default_read_buffer() -> usize {
    16 * 1024 * 1024 // 16 MiB
}

impl Default for PostProcessConfig {
    fn default() -> Self {
        Self {
            embed_crc32: false,
            move_to_completed: false,
            read_buffer_bytes: default_read_buffer(),
        }
    }
}

impl PostProcessConfig {
    /// Enables CRC32 tagging.
    pub fn with_crc32(mut self, enabled: bool) -> Self {
        self.embed_crc32 = enabled;
        self
    }

    /// Enables relocation into the completed directory.
    pub fn with_move_to_completed(mut self, enabled: bool) -> Self {
        self.move_to_completed = enabled;
        self
    }

    /// Sets the checksum read size.
    pub fn with_read_buffer(mut self, bytes: usize) -> Self {
        self.read_buffer_bytes = bytes;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_process_defaults() {
        let config = PostProcessConfig::default();
        assert!(!config.embed_crc32);
        assert!(!config.move_to_completed);
        assert_eq!(config.read_buffer_bytes, 16 * 1024 * 1024);
    }

    #[test]
    fn test_scheduler_default_is_positive() {
        assert!(SchedulerConfig::default().max_parallel_jobs > 0);
    }

    #[test]
    fn test_program_for_disabled_backend() {
        let tools = ToolsConfig {
            mp4muxer: PathBuf::new(),
            ..Default::default()
        };
        assert_eq!(
            tools.program_for(Backend::MkvMerge),
            Some(Path::new("mkvmerge"))
        );
        assert_eq!(tools.program_for(Backend::Mp4Muxer), None);
    }

    #[test]
    fn test_muxing_builder() {
        let config = MuxingConfiguration::new(
            PathBuf::from("/media"),
            VideoSource::Hevc,
            OutputFormat::Mkv,
        )
        .with_audio_sources(vec![AudioSource::Flac])
        .with_chapters(false)
        .with_subtitles(true);

        assert_eq!(config.audio_sources, vec![AudioSource::Flac]);
        assert!(!config.mux_chapters);
        assert!(config.mux_subtitles);
        assert_eq!(config.audio_language, "jpn");
    }
}
