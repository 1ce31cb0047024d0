//! Types for the scheduler module.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

/// Final result of one job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum TaskOutcome {
    /// Output written and post-processed; `output` is its final path.
    Completed { task_id: Uuid, output: PathBuf },
    /// The job failed; no trustworthy output exists.
    Failed { task_id: Uuid, reason: String },
}

impl TaskOutcome {
    pub fn task_id(&self) -> Uuid {
        match self {
            Self::Completed { task_id, .. } | Self::Failed { task_id, .. } => *task_id,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }
}

/// Result of a whole batch, outcomes in job order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSummary {
    pub outcomes: Vec<TaskOutcome>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl BatchSummary {
    /// Number of completed jobs.
    pub fn completed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_completed()).count()
    }

    /// Number of failed jobs.
    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.completed()
    }

    /// Whether every job completed.
    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    /// Wall-clock duration of the batch.
    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

/// Status of the worker pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolStatus {
    /// Number of running jobs.
    pub active_jobs: usize,
    /// Maximum concurrent jobs.
    pub max_concurrent: usize,
    /// Number of jobs waiting for a slot.
    pub queued_jobs: usize,
    /// Jobs completed since the scheduler was created.
    pub total_completed: u64,
    /// Jobs failed since the scheduler was created.
    pub total_failed: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_counts() {
        let now = Utc::now();
        let summary = BatchSummary {
            outcomes: vec![
                TaskOutcome::Completed {
                    task_id: Uuid::new_v4(),
                    output: PathBuf::from("/m/a.mkv"),
                },
                TaskOutcome::Failed {
                    task_id: Uuid::new_v4(),
                    reason: "mkvmerge exited with code 2".to_string(),
                },
            ],
            started_at: now,
            finished_at: now,
        };

        assert_eq!(summary.completed(), 1);
        assert_eq!(summary.failed(), 1);
        assert!(!summary.is_success());
        assert_eq!(summary.duration(), chrono::Duration::zero());
    }
}
