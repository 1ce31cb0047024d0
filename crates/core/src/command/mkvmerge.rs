//! Argument generator for mkvmerge (Matroska output).

use std::path::Path;

use super::types::{Backend, MuxArg, MuxCommand};
use crate::matcher::Episode;

/// Language of the video track; elementary streams carry none.
const VIDEO_LANGUAGE: &str = "und";

/// Builds the mkvmerge invocation for an episode.
///
/// Every input file holds a single stream, so each track is addressed as
/// `0` within its file and the track order is `<file>:0` in insertion order.
pub fn build(episode: &Episode) -> MuxCommand {
    let mut args = vec![
        // Progress lines are only recognized in English.
        MuxArg::literal("--ui-language"),
        MuxArg::literal("en"),
        MuxArg::literal("--output"),
        MuxArg::path(&episode.output_file),
    ];

    args.extend([
        MuxArg::literal("--language"),
        MuxArg::literal(format!("0:{}", VIDEO_LANGUAGE)),
        MuxArg::literal("--default-duration"),
        MuxArg::literal(format!("0:{}p", episode.frame_rate)),
    ]);
    push_file(&mut args, &episode.video_file);
    let mut tracks = 1;

    for audio in &episode.audio_files {
        push_language(&mut args, &episode.audio_language);
        push_file(&mut args, audio);
        tracks += 1;
    }

    for subtitle in &episode.subtitle_files {
        push_language(&mut args, &episode.subtitle_language);
        push_file(&mut args, subtitle);
        tracks += 1;
    }

    if let Some(chapters) = &episode.chapter_file {
        args.extend([
            MuxArg::literal("--chapter-language"),
            MuxArg::literal(episode.chapter_language.clone()),
            MuxArg::literal("--chapters"),
            MuxArg::path(chapters),
        ]);
    }

    args.extend([
        MuxArg::literal("--track-order"),
        MuxArg::literal(track_order(tracks)),
    ]);

    MuxCommand {
        backend: Backend::MkvMerge,
        output: episode.output_file.clone(),
        args,
    }
}

fn push_language(args: &mut Vec<MuxArg>, language: &str) {
    args.extend([
        MuxArg::literal("--language"),
        MuxArg::literal(format!("0:{}", language)),
    ]);
}

/// Wraps a file in mkvmerge's file grouping parentheses.
fn push_file(args: &mut Vec<MuxArg>, path: &Path) {
    args.extend([
        MuxArg::literal("("),
        MuxArg::path(path),
        MuxArg::literal(")"),
    ]);
}

fn track_order(tracks: usize) -> String {
    (0..tracks)
        .map(|file| format!("{}:0", file))
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures::episode;
    use std::path::PathBuf;

    #[test]
    fn test_video_only() {
        let mut ep = episode("/media/s01.264", "/media/s01.mkv");
        ep.audio_files.clear();

        assert_eq!(
            build(&ep).argument_string(),
            "--ui-language en --output \"/media/s01.mkv\" --language 0:und \
             --default-duration 0:24000/1001p \"(\" \"/media/s01.264\" \")\" \
             --track-order 0:0"
        );
    }

    #[test]
    fn test_full_episode() {
        let mut ep = episode("/media/s01.264", "/media/s01.mkv");
        ep.audio_files = vec![
            PathBuf::from("/media/s01.01.flac"),
            PathBuf::from("/media/s01.02.flac"),
        ];
        ep.subtitle_files = vec![PathBuf::from("/media/s01.sup")];
        ep.subtitle_language = "chi".to_string();
        ep.chapter_file = Some(PathBuf::from("/media/s01.txt"));
        ep.chapter_language = "jpn".to_string();

        let line = build(&ep).argument_string();
        assert!(line.contains(
            "--language 0:jpn \"(\" \"/media/s01.01.flac\" \")\" \
             --language 0:jpn \"(\" \"/media/s01.02.flac\" \")\""
        ));
        assert!(line.contains("--language 0:chi \"(\" \"/media/s01.sup\" \")\""));
        assert!(line.contains("--chapter-language jpn --chapters \"/media/s01.txt\""));
        assert!(line.ends_with("--track-order 0:0,1:0,2:0,3:0"));
    }

    #[test]
    fn test_track_order_counts_every_track() {
        for (audio, subs) in [(0, 0), (1, 0), (2, 3), (5, 1)] {
            let mut ep = episode("/m/e.264", "/m/e.mkv");
            ep.audio_files = (0..audio)
                .map(|i| PathBuf::from(format!("/m/e.{}.flac", i)))
                .collect();
            ep.subtitle_files = (0..subs)
                .map(|i| PathBuf::from(format!("/m/e.{}.sup", i)))
                .collect();

            let command = build(&ep);
            let order = match command.args.last() {
                Some(MuxArg::Literal(order)) => order.clone(),
                other => panic!("unexpected last arg {:?}", other),
            };
            let entries: Vec<&str> = order.split(',').collect();

            assert_eq!(entries.len(), 1 + audio + subs);
            for (i, entry) in entries.iter().enumerate() {
                assert_eq!(*entry, format!("{}:0", i));
            }
        }
    }

    #[test]
    fn test_argv_keeps_parentheses_bare() {
        let ep = episode("/media/My Show/s01.264", "/media/My Show/s01.mkv");
        let argv = build(&ep).argv();

        assert!(argv.iter().any(|a| a == "("));
        assert!(argv.iter().any(|a| a == "/media/My Show/s01.264"));
    }
}
