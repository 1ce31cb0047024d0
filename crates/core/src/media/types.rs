//! Types for the media module.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::command::Backend;

/// Extension of chapter files (OGM-style text chapters).
pub const CHAPTER_EXTENSION: &str = "txt";

/// Extension of subtitle files (PGS bitmap subtitles).
pub const SUBTITLE_EXTENSION: &str = "sup";

/// Video elementary stream formats that can seed an episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VideoSource {
    /// H.264 / AVC elementary stream
    Avc,
    /// H.265 / HEVC elementary stream
    Hevc,
}

impl VideoSource {
    /// Returns the file extension for this source.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Avc => "264",
            Self::Hevc => "hevc",
        }
    }
}

/// Loose audio track formats that can be matched to a video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioSource {
    /// Free Lossless Audio Codec
    Flac,
    /// AAC in an MPEG-4 audio container
    M4a,
    /// Raw ADTS AAC
    Aac,
    /// Dolby Digital
    Ac3,
}

impl AudioSource {
    /// Returns the file extension for this source.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Flac => "flac",
            Self::M4a => "m4a",
            Self::Aac => "aac",
            Self::Ac3 => "ac3",
        }
    }
}

/// Output container formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// Matroska (.mkv), muxed by mkvmerge
    Mkv,
    /// MPEG-4 (.mp4), muxed by the L-SMASH muxer
    Mp4,
}

impl OutputFormat {
    /// Returns the file extension for this container.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Mkv => "mkv",
            Self::Mp4 => "mp4",
        }
    }

    /// Returns the muxer backend that produces this container.
    pub fn backend(&self) -> Backend {
        match self {
            Self::Mkv => Backend::MkvMerge,
            Self::Mp4 => Backend::Mp4Muxer,
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Frame rate handed to the muxer for the video track.
///
/// Raw elementary streams carry no reliable timing, so the muxer has to be
/// told the rate. `Auto` asks the matcher to probe the stream instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FrameRate {
    /// Probe the video stream for its rate.
    Auto,
    /// Use this value verbatim (e.g. "24000/1001").
    Fixed(String),
}

impl FrameRate {
    /// Sentinel value selecting probing.
    pub const AUTO: &'static str = "auto";

    /// Parses a configured value; the sentinel is matched case-insensitively.
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.eq_ignore_ascii_case(Self::AUTO) {
            Self::Auto
        } else {
            Self::Fixed(value.to_string())
        }
    }

    /// Whether this rate must be probed from the stream.
    pub fn is_auto(&self) -> bool {
        matches!(self, Self::Auto)
    }
}

impl Default for FrameRate {
    fn default() -> Self {
        Self::Fixed("24000/1001".to_string())
    }
}

impl TryFrom<String> for FrameRate {
    type Error = std::convert::Infallible;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Ok(Self::parse(&value))
    }
}

impl From<FrameRate> for String {
    fn from(rate: FrameRate) -> Self {
        match rate {
            FrameRate::Auto => FrameRate::AUTO.to_string(),
            FrameRate::Fixed(value) => value,
        }
    }
}

/// Whether `path` has the given extension, ignoring ASCII case.
pub fn extension_matches(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case(extension))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_extensions() {
        assert_eq!(VideoSource::Avc.extension(), "264");
        assert_eq!(VideoSource::Hevc.extension(), "hevc");
        assert_eq!(AudioSource::Flac.extension(), "flac");
        assert_eq!(AudioSource::Ac3.extension(), "ac3");
        assert_eq!(OutputFormat::Mkv.extension(), "mkv");
        assert_eq!(OutputFormat::Mp4.extension(), "mp4");
        assert_eq!(OutputFormat::Mkv.backend(), Backend::MkvMerge);
        assert_eq!(OutputFormat::Mp4.backend(), Backend::Mp4Muxer);
    }

    #[test]
    fn test_frame_rate_parse() {
        assert_eq!(FrameRate::parse("auto"), FrameRate::Auto);
        assert_eq!(FrameRate::parse("AUTO"), FrameRate::Auto);
        assert_eq!(
            FrameRate::parse("24000/1001"),
            FrameRate::Fixed("24000/1001".to_string())
        );
        assert!(!FrameRate::default().is_auto());
    }

    #[test]
    fn test_frame_rate_serde() {
        #[derive(Deserialize, Serialize)]
        struct Holder {
            rate: FrameRate,
        }

        let holder: Holder = toml::from_str(r#"rate = "Auto""#).unwrap();
        assert!(holder.rate.is_auto());

        let holder: Holder = toml::from_str(r#"rate = "30000/1001""#).unwrap();
        assert_eq!(holder.rate, FrameRate::Fixed("30000/1001".to_string()));

        let json = serde_json::to_string(&Holder {
            rate: FrameRate::Auto,
        })
        .unwrap();
        assert_eq!(json, r#"{"rate":"auto"}"#);
    }

    #[test]
    fn test_extension_matches_ignores_case() {
        assert!(extension_matches(Path::new("/a/b/ep01.FLAC"), "flac"));
        assert!(extension_matches(Path::new("ep01.264"), "264"));
        assert!(!extension_matches(Path::new("ep01.flac.bak"), "flac"));
        assert!(!extension_matches(Path::new("ep01"), "flac"));
    }
}
