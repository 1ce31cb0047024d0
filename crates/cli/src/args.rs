use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "automux",
    version,
    about = "Batch muxer for per-episode video, audio, subtitle and chapter files",
    long_about = "Scans a directory for episode video files, pairs each with its audio, \
                  subtitle and chapter siblings, and muxes them with mkvmerge or the \
                  L-SMASH muxer, several episodes at a time."
)]
pub struct Args {
    /// Configuration file
    #[arg(
        short,
        long,
        env = "AUTOMUX_CONFIG",
        default_value = "automux.toml",
        help = "Path to the TOML configuration file"
    )]
    pub config: PathBuf,

    /// Overrides muxing.root_dir
    #[arg(short, long, help = "Directory to scan for episodes")]
    pub root: Option<PathBuf>,

    /// Overrides scheduler.max_parallel_jobs
    #[arg(short, long, help = "Number of muxers to run in parallel")]
    pub jobs: Option<usize>,

    #[arg(
        long,
        help = "Print the planned muxer commands without running them",
        default_value = "false"
    )]
    pub dry_run: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["automux"]).unwrap();
        assert!(args.root.is_none());
        assert!(args.jobs.is_none());
        assert!(!args.dry_run);
    }

    #[test]
    fn test_overrides() {
        let args = Args::try_parse_from([
            "automux",
            "--config",
            "/etc/automux.toml",
            "--root",
            "/media/show",
            "-j",
            "4",
            "--dry-run",
        ])
        .unwrap();
        assert_eq!(args.config, PathBuf::from("/etc/automux.toml"));
        assert_eq!(args.root, Some(PathBuf::from("/media/show")));
        assert_eq!(args.jobs, Some(4));
        assert!(args.dry_run);
    }

    #[test]
    fn test_rejects_bad_job_count() {
        assert!(Args::try_parse_from(["automux", "--jobs", "many"]).is_err());
    }
}
