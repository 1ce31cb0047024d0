//! Bounded-parallelism job scheduler.

use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use tracing::{debug, info, trace, warn};

use super::types::{BatchSummary, PoolStatus, TaskOutcome};
use crate::command::Job;
use crate::config::{SchedulerConfig, ToolsConfig};
use crate::events::{EventSender, MuxEvent, TaskStatus};
use crate::postprocess::PostProcessor;
use crate::progress;
use crate::runner::{JobRunner, ProcessExit, RunnerEvent};

/// Runner events buffered per job.
const RUNNER_CHANNEL_CAPACITY: usize = 64;

/// Tracks statistics for the pool.
#[derive(Default)]
struct PoolStats {
    active: AtomicU64,
    queued: AtomicU64,
    total_completed: AtomicU64,
    total_failed: AtomicU64,
}

impl PoolStats {
    fn to_status(&self, max_concurrent: usize) -> PoolStatus {
        PoolStatus {
            active_jobs: self.active.load(Ordering::Relaxed) as usize,
            max_concurrent,
            queued_jobs: self.queued.load(Ordering::Relaxed) as usize,
            total_completed: self.total_completed.load(Ordering::Relaxed),
            total_failed: self.total_failed.load(Ordering::Relaxed),
        }
    }
}

/// Everything one job task needs.
struct JobContext<R: JobRunner> {
    runner: Arc<R>,
    tools: Arc<ToolsConfig>,
    post_processor: Arc<PostProcessor>,
    semaphore: Arc<Semaphore>,
    stats: Arc<PoolStats>,
    events: EventSender,
}

/// Runs muxing jobs, at most `max_parallel_jobs` at a time.
///
/// Each job holds a pool slot from launch until its post-processing is done.
pub struct JobScheduler<R: JobRunner> {
    config: SchedulerConfig,
    tools: Arc<ToolsConfig>,
    runner: Arc<R>,
    post_processor: Arc<PostProcessor>,
    semaphore: Arc<Semaphore>,
    stats: Arc<PoolStats>,
}

impl<R: JobRunner + 'static> JobScheduler<R> {
    /// Creates a new scheduler.
    pub fn new(
        config: SchedulerConfig,
        tools: ToolsConfig,
        runner: Arc<R>,
        post_processor: PostProcessor,
    ) -> Self {
        let semaphore = Arc::new(Semaphore::new(config.max_parallel_jobs.max(1)));
        Self {
            config,
            tools: Arc::new(tools),
            runner,
            post_processor: Arc::new(post_processor),
            semaphore,
            stats: Arc::new(PoolStats::default()),
        }
    }

    /// Returns the current pool status.
    pub fn status(&self) -> PoolStatus {
        self.stats.to_status(self.config.max_parallel_jobs)
    }

    /// Runs every job to completion or failure.
    ///
    /// Emits exactly one `TaskCompleted` or `TaskFailed` per job, then
    /// `AllTasksCompleted` once.
    pub async fn run(&self, jobs: Vec<Job>, events: EventSender) -> BatchSummary {
        let started_at = Utc::now();
        info!(
            jobs = jobs.len(),
            max_parallel = self.config.max_parallel_jobs,
            runner = self.runner.name(),
            "Starting batch"
        );

        let mut handles = Vec::with_capacity(jobs.len());
        for job in jobs {
            let ctx = JobContext {
                runner: Arc::clone(&self.runner),
                tools: Arc::clone(&self.tools),
                post_processor: Arc::clone(&self.post_processor),
                semaphore: Arc::clone(&self.semaphore),
                stats: Arc::clone(&self.stats),
                events: events.clone(),
            };
            self.stats.queued.fetch_add(1, Ordering::Relaxed);
            let task_id = job.task_id;
            handles.push((task_id, tokio::spawn(run_job(ctx, job))));
        }

        let mut outcomes = Vec::with_capacity(handles.len());
        for (task_id, handle) in handles {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    let reason = format!("job task aborted: {}", e);
                    warn!(%task_id, "{}", reason);
                    self.stats.total_failed.fetch_add(1, Ordering::Relaxed);
                    events
                        .emit(MuxEvent::TaskFailed {
                            task_id,
                            reason: reason.clone(),
                        })
                        .await;
                    TaskOutcome::Failed { task_id, reason }
                }
            };
            outcomes.push(outcome);
        }

        let summary = BatchSummary {
            outcomes,
            started_at,
            finished_at: Utc::now(),
        };
        info!(
            completed = summary.completed(),
            failed = summary.failed(),
            "Batch finished"
        );
        events
            .emit(MuxEvent::AllTasksCompleted {
                completed: summary.completed(),
                failed: summary.failed(),
            })
            .await;
        summary
    }
}

async fn run_job<R: JobRunner>(ctx: JobContext<R>, job: Job) -> TaskOutcome {
    let task_id = job.task_id;

    let permit = ctx.semaphore.acquire().await;
    ctx.stats.queued.fetch_sub(1, Ordering::Relaxed);
    let result = match permit {
        Ok(_permit) => {
            ctx.stats.active.fetch_add(1, Ordering::Relaxed);
            let result = execute(&ctx, &job).await;
            ctx.stats.active.fetch_sub(1, Ordering::Relaxed);
            result
        }
        Err(_) => Err("worker pool closed".to_string()),
    };

    match result {
        Ok(output) => {
            ctx.stats.total_completed.fetch_add(1, Ordering::Relaxed);
            info!(%task_id, output = %output.display(), "Task completed");
            ctx.events
                .emit(MuxEvent::TaskCompleted {
                    task_id,
                    output: output.clone(),
                })
                .await;
            TaskOutcome::Completed { task_id, output }
        }
        Err(reason) => {
            ctx.stats.total_failed.fetch_add(1, Ordering::Relaxed);
            warn!(%task_id, "Task failed: {}", reason);
            ctx.events
                .emit(MuxEvent::TaskFailed {
                    task_id,
                    reason: reason.clone(),
                })
                .await;
            TaskOutcome::Failed { task_id, reason }
        }
    }
}

/// Muxes and post-processes one job, returning the final output path.
async fn execute<R: JobRunner>(ctx: &JobContext<R>, job: &Job) -> Result<PathBuf, String> {
    let task_id = job.task_id;
    let backend = job.backend();
    let program = ctx
        .tools
        .program_for(backend)
        .ok_or_else(|| format!("{} backend is disabled", backend))?
        .to_path_buf();

    ctx.events.emit(MuxEvent::TaskStarted { task_id }).await;
    debug!(%task_id, "{} {}", program.display(), job.command.argument_string());

    let (tx, mut rx) = mpsc::channel(RUNNER_CHANNEL_CAPACITY);
    let total_bytes = job.episode.total_bytes;

    let run = ctx.runner.run(&program, &job.command, tx);
    let relay = async {
        while let Some(event) = rx.recv().await {
            match event {
                RunnerEvent::Spawned { pid } => {
                    debug!(%task_id, ?pid, "Muxer started");
                    ctx.events.emit(MuxEvent::TaskStarted { task_id }).await;
                    ctx.events
                        .emit(MuxEvent::TaskProgress {
                            task_id,
                            percent: 0,
                            status: TaskStatus::Reading,
                        })
                        .await;
                }
                RunnerEvent::Output(line) => {
                    match progress::parse(backend, &line, total_bytes) {
                        Some(percent) => {
                            ctx.events
                                .emit(MuxEvent::TaskProgress {
                                    task_id,
                                    percent,
                                    status: TaskStatus::Muxing,
                                })
                                .await;
                        }
                        None => trace!(%task_id, "{}", line),
                    }
                }
            }
        }
    };
    let (result, ()) = tokio::join!(run, relay);

    let exit = result.map_err(|e| e.to_string())?;
    if backend.is_fatal_exit(exit.code) {
        remove_partial_output(&job.command.output).await;
        return Err(format!("{} exited with {}", backend, describe_exit(exit)));
    }
    if !exit.success() {
        warn!(%task_id, "{} exited with {}, keeping output", backend, describe_exit(exit));
    }

    match ctx.post_processor.finalize(&job.episode, &ctx.events).await {
        Ok(Some(path)) => Ok(path),
        Ok(None) => Err(format!(
            "{} produced no output at {}",
            backend,
            job.command.output.display()
        )),
        Err(e) => Err(e.to_string()),
    }
}

fn describe_exit(exit: ProcessExit) -> String {
    match exit.code {
        Some(code) => format!("code {}", code),
        None => "a signal".to_string(),
    }
}

async fn remove_partial_output(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => debug!(output = %path.display(), "Removed partial output"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(output = %path.display(), "Failed to remove partial output: {}", e),
    }
}
