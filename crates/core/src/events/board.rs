use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

use super::{MuxEvent, TaskProgress, TaskStatus};

/// Shared task list folded from [`MuxEvent`]s.
///
/// One coarse lock guards every row. Clones share the same rows.
#[derive(Debug, Clone, Default)]
pub struct TaskBoard {
    rows: Arc<Mutex<Vec<TaskProgress>>>,
}

impl TaskBoard {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<TaskProgress>> {
        self.rows.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Folds an event into the board.
    ///
    /// `EpisodesDiscovered` replaces the rows; task events for unknown tasks
    /// are ignored.
    pub fn apply(&self, event: &MuxEvent) {
        let mut rows = self.lock();
        match event {
            MuxEvent::EpisodesDiscovered { episodes } => {
                *rows = episodes
                    .iter()
                    .map(|e| TaskProgress::new(e.task_id, e.display_name()))
                    .collect();
            }
            MuxEvent::TaskStarted { task_id } => {
                if let Some(row) = find(&mut rows, *task_id) {
                    if row.status == TaskStatus::Waiting {
                        row.status = TaskStatus::Reading;
                    }
                }
            }
            MuxEvent::TaskProgress {
                task_id,
                percent,
                status,
            } => {
                if let Some(row) = find(&mut rows, *task_id) {
                    row.percent = *percent;
                    row.status = *status;
                }
            }
            MuxEvent::TaskCompleted { task_id, .. } => {
                if let Some(row) = find(&mut rows, *task_id) {
                    row.percent = 100;
                    row.status = TaskStatus::Done;
                }
            }
            MuxEvent::TaskFailed { task_id, .. } => {
                if let Some(row) = find(&mut rows, *task_id) {
                    row.status = TaskStatus::Failed;
                }
            }
            MuxEvent::AllTasksCompleted { .. } => {}
        }
    }

    /// Copy of every row in discovery order.
    pub fn snapshot(&self) -> Vec<TaskProgress> {
        self.lock().clone()
    }

    /// Copy of one row.
    pub fn get(&self, task_id: Uuid) -> Option<TaskProgress> {
        self.lock().iter().find(|r| r.task_id == task_id).cloned()
    }

    /// Number of rows in a terminal state.
    pub fn finished_count(&self) -> usize {
        self.lock().iter().filter(|r| r.status.is_terminal()).count()
    }
}

fn find(rows: &mut [TaskProgress], task_id: Uuid) -> Option<&mut TaskProgress> {
    rows.iter_mut().find(|r| r.task_id == task_id)
}
