//! Per-backend progress line parsing.

use once_cell::sync::Lazy;
use regex_lite::Regex;

use crate::command::Backend;

/// mkvmerge: "Progress: 42%"
static MKVMERGE_PROGRESS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Progress: (\d+)%").expect("valid mkvmerge progress regex"));

/// L-SMASH muxer: "Importing: 123456 bytes"
static MP4MUXER_IMPORTING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Importing: (\d+) bytes").expect("valid muxer progress regex"));

/// Extracts a percentage from one line of backend output.
///
/// Returns None for lines that carry no progress. For the byte-counting
/// backend the value is `imported / total_bytes * 100`, rounded and not
/// clamped; a zero total yields None.
pub fn parse(backend: Backend, line: &str, total_bytes: u64) -> Option<u32> {
    match backend {
        Backend::MkvMerge => MKVMERGE_PROGRESS
            .captures(line)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse::<u32>().ok()),
        Backend::Mp4Muxer => {
            if total_bytes == 0 {
                return None;
            }
            let imported = MP4MUXER_IMPORTING
                .captures(line)
                .and_then(|caps| caps.get(1))
                .and_then(|m| m.as_str().parse::<u64>().ok())?;
            Some(byte_percent(imported, total_bytes))
        }
    }
}

/// Rounded `done / total * 100`, saturating at `u32::MAX`.
pub fn byte_percent(done: u64, total: u64) -> u32 {
    if total == 0 {
        return 0;
    }
    let percent = (done as f64 / total as f64 * 100.0).round();
    if percent >= u32::MAX as f64 {
        u32::MAX
    } else {
        percent as u32
    }
}
