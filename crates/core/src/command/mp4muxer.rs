//! Argument generator for the L-SMASH muxer (MP4 output).

use super::types::{Backend, MuxArg, MuxCommand};
use crate::matcher::Episode;

/// Builds the muxer invocation for an episode.
///
/// Track order follows the order of the `-i` inputs. Subtitle files are not
/// passed: the muxer cannot carry PGS.
pub fn build(episode: &Episode) -> MuxCommand {
    let mut args = vec![
        MuxArg::literal("--file-format"),
        MuxArg::literal("mp4"),
        MuxArg::literal("-o"),
        MuxArg::path(&episode.output_file),
        MuxArg::literal("-i"),
        MuxArg::path_with_options(&episode.video_file, format!("fps={}", episode.frame_rate)),
    ];

    for audio in &episode.audio_files {
        args.extend([
            MuxArg::literal("-i"),
            MuxArg::path_with_options(audio, format!("language={}", episode.audio_language)),
        ]);
    }

    if let Some(chapters) = &episode.chapter_file {
        args.extend([MuxArg::literal("--chapter"), MuxArg::path(chapters)]);
    }

    MuxCommand {
        backend: Backend::Mp4Muxer,
        output: episode.output_file.clone(),
        args,
    }
}
