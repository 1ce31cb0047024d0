//! Types for the command module.

use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::matcher::Episode;

/// External muxing tool targeted by an output container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    /// MKVToolNix `mkvmerge`, writes Matroska.
    MkvMerge,
    /// L-SMASH `muxer`, writes MP4.
    Mp4Muxer,
}

impl Backend {
    /// Short name, matching the `[tools]` configuration key.
    pub fn name(&self) -> &'static str {
        match self {
            Self::MkvMerge => "mkvmerge",
            Self::Mp4Muxer => "mp4muxer",
        }
    }

    /// Whether a process exit means the output cannot be trusted.
    ///
    /// `code` is None when the process was killed by a signal.
    /// mkvmerge exits 1 for warnings and 2 for errors; the L-SMASH muxer
    /// only knows success or failure.
    pub fn is_fatal_exit(&self, code: Option<i32>) -> bool {
        match (self, code) {
            (_, None) => true,
            (Self::MkvMerge, Some(code)) => !(0..=1).contains(&code),
            (Self::Mp4Muxer, Some(code)) => code != 0,
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One token of a muxer command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MuxArg {
    /// A flag or value passed as-is.
    Literal(String),
    /// A file path.
    Path(PathBuf),
    /// A file path with backend options appended after `?`.
    PathWithOptions { path: PathBuf, options: String },
}

impl MuxArg {
    pub fn literal(value: impl Into<String>) -> Self {
        Self::Literal(value.into())
    }

    pub fn path(path: impl AsRef<Path>) -> Self {
        Self::Path(path.as_ref().to_path_buf())
    }

    pub fn path_with_options(path: impl AsRef<Path>, options: impl Into<String>) -> Self {
        Self::PathWithOptions {
            path: path.as_ref().to_path_buf(),
            options: options.into(),
        }
    }

    /// The argument as passed to the OS.
    pub fn to_os_string(&self) -> OsString {
        match self {
            Self::Literal(value) => OsString::from(value),
            Self::Path(path) => path.as_os_str().to_owned(),
            Self::PathWithOptions { path, options } => {
                let mut arg = path.as_os_str().to_owned();
                arg.push("?");
                arg.push(options);
                arg
            }
        }
    }

    /// The argument as shown in a command string. Paths are always quoted.
    pub fn render(&self) -> String {
        match self {
            Self::Literal(value) if needs_quoting(value) => quote(value),
            Self::Literal(value) => value.clone(),
            Self::Path(path) => quote(&path.to_string_lossy()),
            Self::PathWithOptions { path, options } => {
                quote(&format!("{}?{}", path.to_string_lossy(), options))
            }
        }
    }
}

fn needs_quoting(value: &str) -> bool {
    value.is_empty() || value.chars().any(|c| c.is_whitespace() || c == '(' || c == ')')
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\\\""))
}

/// A fully synthesized muxer invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MuxCommand {
    /// Backend that must run this command.
    pub backend: Backend,
    /// Output file the command writes.
    pub output: PathBuf,
    /// Arguments in order, excluding the program itself.
    pub args: Vec<MuxArg>,
}

impl MuxCommand {
    /// Argument vector for spawning the backend.
    pub fn argv(&self) -> Vec<OsString> {
        self.args.iter().map(MuxArg::to_os_string).collect()
    }

    /// Space-separated argument string with every path quoted.
    pub fn argument_string(&self) -> String {
        self.args
            .iter()
            .map(MuxArg::render)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for MuxCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.backend, self.argument_string())
    }
}

/// An episode paired with the command that muxes it.
#[derive(Debug, Clone)]
pub struct Job {
    pub task_id: Uuid,
    pub episode: Episode,
    pub command: MuxCommand,
}

impl Job {
    /// Backend that runs this job.
    pub fn backend(&self) -> Backend {
        self.command.backend
    }
}
