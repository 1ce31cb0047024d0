//! Terminal rendering of batch progress.

use std::collections::HashMap;

use automux_core::{BatchSummary, MuxEvent, TaskBoard, TaskOutcome, TaskStatus};
use tracing::{error, info};
use uuid::Uuid;

/// Progress is logged once per this many percent.
const LOG_STEP: u32 = 10;

/// Folds events into a [`TaskBoard`] and logs the interesting transitions.
#[derive(Default)]
pub struct Reporter {
    board: TaskBoard,
    last_logged: HashMap<Uuid, (TaskStatus, u32)>,
}

impl Reporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&mut self, event: &MuxEvent) {
        self.board.apply(event);

        match event {
            MuxEvent::EpisodesDiscovered { episodes } => {
                info!("{} episode(s) to mux", episodes.len());
                for episode in episodes {
                    info!("  {} ({} track(s))", episode.display_name(), episode.track_count());
                }
            }
            MuxEvent::TaskStarted { task_id } => {
                if !self.last_logged.contains_key(task_id) {
                    self.last_logged.insert(*task_id, (TaskStatus::Reading, 0));
                    info!("{}: started", self.name(*task_id));
                }
            }
            MuxEvent::TaskProgress {
                task_id,
                percent,
                status,
            } => {
                if let Some(step) = self.step_reached(*task_id, *status, *percent) {
                    info!("{}: {} {}%", self.name(*task_id), status, step);
                }
            }
            MuxEvent::TaskCompleted { task_id, output } => {
                info!("{}: done -> {}", self.name(*task_id), output.display());
            }
            MuxEvent::TaskFailed { task_id, reason } => {
                error!("{}: failed: {}", self.name(*task_id), reason);
            }
            MuxEvent::AllTasksCompleted { completed, failed } => {
                info!("All tasks finished: {} completed, {} failed", completed, failed);
            }
        }
    }

    /// Returns the step to log when `percent` crosses a new step for `status`.
    fn step_reached(&mut self, task_id: Uuid, status: TaskStatus, percent: u32) -> Option<u32> {
        let step = percent / LOG_STEP * LOG_STEP;
        match self.last_logged.get(&task_id) {
            Some((last_status, last_step)) if *last_status == status && *last_step >= step => None,
            _ => {
                self.last_logged.insert(task_id, (status, step));
                Some(step)
            }
        }
    }

    fn name(&self, task_id: Uuid) -> String {
        self.board
            .get(task_id)
            .map(|row| row.display_name)
            .unwrap_or_else(|| task_id.to_string())
    }

    /// Prints the final outcome of every task.
    pub fn print_summary(&self, summary: &BatchSummary) {
        println!();
        for outcome in &summary.outcomes {
            let name = self.name(outcome.task_id());
            match outcome {
                TaskOutcome::Completed { output, .. } => {
                    println!("  ok      {} -> {}", name, output.display())
                }
                TaskOutcome::Failed { reason, .. } => println!("  FAILED  {}: {}", name, reason),
            }
        }
        println!(
            "{} completed, {} failed in {}s",
            summary.completed(),
            summary.failed(),
            summary.duration().num_seconds()
        );
        if summary.completed() > 0 {
            println!("Play-check the muxed files before deleting any sources.");
        }
    }
}
