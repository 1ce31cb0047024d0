//! Types for the events module.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use uuid::Uuid;

use crate::matcher::Episode;

/// Lifecycle label of a task, as shown next to its progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Queued behind the pool limit.
    Waiting,
    /// Muxer launched, no progress yet.
    Reading,
    /// Muxer reporting progress.
    Muxing,
    /// CRC32 pass over the output.
    Checksumming,
    /// Relocating into the completed directory.
    Moving,
    Done,
    Failed,
}

impl TaskStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Waiting => "waiting",
            Self::Reading => "reading",
            Self::Muxing => "muxing",
            Self::Checksumming => "checksumming",
            Self::Moving => "moving",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }

    /// Whether no further events are expected for the task.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Event emitted by the engine while a batch runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MuxEvent {
    /// Discovery finished; sent once, before any process starts.
    EpisodesDiscovered { episodes: Vec<Episode> },
    /// A task's muxer is being (or has just been) launched.
    TaskStarted { task_id: Uuid },
    /// A task made progress.
    TaskProgress {
        task_id: Uuid,
        percent: u32,
        status: TaskStatus,
    },
    /// A task finished; `output` is the final location of its file.
    TaskCompleted { task_id: Uuid, output: PathBuf },
    /// A task failed.
    TaskFailed { task_id: Uuid, reason: String },
    /// Every task has completed or failed; sent exactly once.
    AllTasksCompleted { completed: usize, failed: usize },
}

impl MuxEvent {
    /// The task this event is about, if any.
    pub fn task_id(&self) -> Option<Uuid> {
        match self {
            Self::TaskStarted { task_id }
            | Self::TaskProgress { task_id, .. }
            | Self::TaskCompleted { task_id, .. }
            | Self::TaskFailed { task_id, .. } => Some(*task_id),
            Self::EpisodesDiscovered { .. } | Self::AllTasksCompleted { .. } => None,
        }
    }
}

/// One row of the task list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskProgress {
    pub task_id: Uuid,
    /// Output file name.
    pub display_name: String,
    /// 0-100, may exceed 100 for byte-counting backends.
    pub percent: u32,
    pub status: TaskStatus,
}

impl TaskProgress {
    pub fn new(task_id: Uuid, display_name: impl Into<String>) -> Self {
        Self {
            task_id,
            display_name: display_name.into(),
            percent: 0,
            status: TaskStatus::Waiting,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_labels() {
        assert_eq!(TaskStatus::Waiting.to_string(), "waiting");
        assert_eq!(TaskStatus::Reading.to_string(), "reading");
        assert_eq!(TaskStatus::Checksumming.to_string(), "checksumming");
        assert!(TaskStatus::Done.is_terminal());
        assert!(TaskStatus::Failed.is_terminal());
        assert!(!TaskStatus::Moving.is_terminal());
    }

    #[test]
    fn test_event_serialization() {
        let id = Uuid::new_v4();
        let event = MuxEvent::TaskProgress {
            task_id: id,
            percent: 42,
            status: TaskStatus::Muxing,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "task_progress");
        assert_eq!(json["percent"], 42);
        assert_eq!(json["status"], "muxing");
        assert_eq!(event.task_id(), Some(id));

        let done = MuxEvent::AllTasksCompleted {
            completed: 1,
            failed: 0,
        };
        assert_eq!(done.task_id(), None);
    }
}
