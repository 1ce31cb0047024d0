//! Frame rate probing for "auto" frame rates.

use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tokio::process::Command;

use super::error::MatcherError;

/// Reads the frame rate of a video stream.
#[async_trait]
pub trait FrameRateProbe: Send + Sync {
    /// Returns the name of this probe implementation.
    fn name(&self) -> &str;

    /// Returns the rate as `"num/den"`.
    async fn probe(&self, video: &Path) -> Result<String, MatcherError>;
}

/// ffprobe-based frame rate probe.
#[derive(Debug, Clone)]
pub struct FfprobeFrameRate {
    program: PathBuf,
}

impl FfprobeFrameRate {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Extracts `r_frame_rate` of the first stream from ffprobe JSON.
    fn parse_probe_output(path: &Path, output: &str) -> Result<String, MatcherError> {
        #[derive(Deserialize)]
        struct ProbeOutput {
            #[serde(default)]
            streams: Vec<ProbeStream>,
        }

        #[derive(Deserialize)]
        struct ProbeStream {
            r_frame_rate: Option<String>,
        }

        let probe: ProbeOutput = serde_json::from_str(output).map_err(|e| {
            MatcherError::probe_failed(path, format!("invalid ffprobe output: {}", e))
        })?;

        let rate = probe
            .streams
            .into_iter()
            .next()
            .and_then(|s| s.r_frame_rate)
            .ok_or_else(|| MatcherError::probe_failed(path, "no video stream"))?;

        normalize_rate(&rate)
            .ok_or_else(|| MatcherError::probe_failed(path, format!("unusable rate '{}'", rate)))
    }
}

/// Accepts `"num/den"` with both parts positive.
fn normalize_rate(rate: &str) -> Option<String> {
    let (num, den) = rate.trim().split_once('/')?;
    let num: u64 = num.parse().ok()?;
    let den: u64 = den.parse().ok()?;
    if num == 0 || den == 0 {
        return None;
    }
    Some(format!("{}/{}", num, den))
}

#[async_trait]
impl FrameRateProbe for FfprobeFrameRate {
    fn name(&self) -> &str {
        "ffprobe"
    }

    async fn probe(&self, video: &Path) -> Result<String, MatcherError> {
        let output = Command::new(&self.program)
            .args([
                "-v",
                "quiet",
                "-print_format",
                "json",
                "-select_streams",
                "v:0",
                "-show_streams",
            ])
            .arg(video)
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    MatcherError::probe_failed(
                        video,
                        format!("ffprobe not found at {}", self.program.display()),
                    )
                } else {
                    MatcherError::Io(e)
                }
            })?;

        if !output.status.success() {
            return Err(MatcherError::probe_failed(
                video,
                format!("ffprobe exited with code: {:?}", output.status.code()),
            ));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Self::parse_probe_output(video, &stdout)
    }
}
