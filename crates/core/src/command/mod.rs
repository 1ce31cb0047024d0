//! Command synthesis for the muxer backends.
//!
//! Turns an [`Episode`](crate::matcher::Episode) into the exact command line
//! for the backend that writes its container. Generation is a pure function
//! of the episode: no filesystem access, no randomness.
//!
//! # Example
//!
//! ```ignore
//! use automux_core::command::{build_jobs, synthesize};
//!
//! let command = synthesize(&episode);
//! println!("{} {}", command.backend, command.argument_string());
//!
//! let jobs = build_jobs(episodes);
//! ```

mod mkvmerge;
mod mp4muxer;
mod types;

pub use types::{Backend, Job, MuxArg, MuxCommand};

use crate::matcher::Episode;
use crate::media::OutputFormat;

/// Synthesizes the backend command for an episode.
pub fn synthesize(episode: &Episode) -> MuxCommand {
    let command = match episode.output_format {
        OutputFormat::Mkv => mkvmerge::build(episode),
        OutputFormat::Mp4 => mp4muxer::build(episode),
    };
    tracing::debug!(
        task_id = %episode.task_id,
        backend = %command.backend,
        args = %command.argument_string(),
        "Synthesized mux command"
    );
    command
}

/// Pairs every episode with its command, preserving order.
pub fn build_jobs(episodes: Vec<Episode>) -> Vec<Job> {
    episodes
        .into_iter()
        .map(|episode| Job {
            task_id: episode.task_id,
            command: synthesize(&episode),
            episode,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures::episode;
    use std::path::PathBuf;

    #[test]
    fn test_dispatch_on_output_format() {
        let mkv = episode("/m/e.264", "/m/e.mkv");
        let mp4 = episode("/m/e.264", "/m/e.mp4");

        assert_eq!(synthesize(&mkv).backend, Backend::MkvMerge);
        assert_eq!(synthesize(&mp4).backend, Backend::Mp4Muxer);
    }

    #[test]
    fn test_deterministic() {
        let mut ep = episode("/m/e.264", "/m/e.mkv");
        ep.audio_files = vec![PathBuf::from("/m/e.flac")];
        assert_eq!(synthesize(&ep), synthesize(&ep));
    }

    #[test]
    fn test_differs_only_in_output() {
        for output in ["mkv", "mp4"] {
            let mut a = episode("/m/e.264", &format!("/m/a.{}", output));
            a.audio_files = vec![PathBuf::from("/m/e.01.flac")];
            a.chapter_file = Some(PathBuf::from("/m/e.txt"));
            let mut b = a.clone();
            b.output_file = PathBuf::from(format!("/m/b.{}", output));

            let args_a = synthesize(&a).args;
            let args_b = synthesize(&b).args;
            assert_eq!(args_a.len(), args_b.len());

            let differing: Vec<usize> = (0..args_a.len())
                .filter(|&i| args_a[i] != args_b[i])
                .collect();
            assert_eq!(differing.len(), 1);
            assert_eq!(args_a[differing[0]], MuxArg::path(&a.output_file));
            assert_eq!(args_b[differing[0]], MuxArg::path(&b.output_file));
        }
    }

    #[test]
    fn test_build_jobs_preserves_order() {
        let episodes = vec![
            episode("/m/e1.264", "/m/e1.mkv"),
            episode("/m/e2.264", "/m/e2.mp4"),
        ];
        let ids: Vec<_> = episodes.iter().map(|e| e.task_id).collect();

        let jobs = build_jobs(episodes);
        assert_eq!(jobs.iter().map(|j| j.task_id).collect::<Vec<_>>(), ids);
        assert_eq!(jobs[0].backend(), Backend::MkvMerge);
        assert_eq!(jobs[1].backend(), Backend::Mp4Muxer);
        assert_eq!(jobs[1].command.output, PathBuf::from("/m/e2.mp4"));
    }
}
