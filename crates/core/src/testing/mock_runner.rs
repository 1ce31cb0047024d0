//! Mock job runner for testing.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, RwLock};

use crate::command::{Backend, MuxCommand};
use crate::runner::{JobRunner, ProcessExit, RunnerError, RunnerEvent};

/// A recorded runner invocation for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedInvocation {
    /// Program the command was run with.
    pub program: PathBuf,
    /// The command that was run.
    pub command: MuxCommand,
}

/// Mock implementation of the JobRunner trait.
///
/// Provides controllable behavior for testing:
/// - Scripted output lines per backend
/// - Exit status, globally or per output file
/// - Output file creation
/// - Spawn failures
/// - Concurrency tracking
///
/// # Example
///
/// ```rust,ignore
/// use automux_core::testing::MockJobRunner;
///
/// let runner = MockJobRunner::new();
/// runner
///     .set_output_lines(Backend::MkvMerge, vec!["Progress: 50%", "Progress: 100%"])
///     .await;
///
/// // Run a batch...
///
/// assert_eq!(runner.invocation_count().await, 3);
/// assert!(runner.max_active() <= 2);
/// ```
#[derive(Debug, Clone)]
pub struct MockJobRunner {
    invocations: Arc<RwLock<Vec<RecordedInvocation>>>,
    lines: Arc<RwLock<HashMap<Backend, Vec<String>>>>,
    exit: Arc<RwLock<ProcessExit>>,
    exit_overrides: Arc<RwLock<HashMap<PathBuf, ProcessExit>>>,
    /// Bytes written to the output file; None writes nothing.
    output_contents: Arc<RwLock<Option<Vec<u8>>>>,
    spawn_failures: Arc<RwLock<HashSet<PathBuf>>>,
    run_duration: Arc<RwLock<Duration>>,
    active: Arc<AtomicUsize>,
    max_active: Arc<AtomicUsize>,
}

impl Default for MockJobRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl MockJobRunner {
    /// Create a new mock runner that succeeds and writes a small output.
    pub fn new() -> Self {
        Self {
            invocations: Arc::new(RwLock::new(Vec::new())),
            lines: Arc::new(RwLock::new(HashMap::new())),
            exit: Arc::new(RwLock::new(ProcessExit::with_code(0))),
            exit_overrides: Arc::new(RwLock::new(HashMap::new())),
            output_contents: Arc::new(RwLock::new(Some(b"muxed".to_vec()))),
            spawn_failures: Arc::new(RwLock::new(HashSet::new())),
            run_duration: Arc::new(RwLock::new(Duration::ZERO)),
            active: Arc::new(AtomicUsize::new(0)),
            max_active: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Get all recorded invocations.
    pub async fn recorded_invocations(&self) -> Vec<RecordedInvocation> {
        self.invocations.read().await.clone()
    }

    /// Get the number of invocations.
    pub async fn invocation_count(&self) -> usize {
        self.invocations.read().await.len()
    }

    /// Set the lines printed by every run of `backend`.
    pub async fn set_output_lines<S: Into<String>>(&self, backend: Backend, lines: Vec<S>) {
        self.lines
            .write()
            .await
            .insert(backend, lines.into_iter().map(Into::into).collect());
    }

    /// Set the exit status of every run.
    pub async fn set_exit(&self, exit: ProcessExit) {
        *self.exit.write().await = exit;
    }

    /// Set the exit status of the run writing `output`.
    pub async fn set_exit_for(&self, output: impl AsRef<Path>, exit: ProcessExit) {
        self.exit_overrides
            .write()
            .await
            .insert(output.as_ref().to_path_buf(), exit);
    }

    /// Set the bytes written to the output file, or None to write nothing.
    pub async fn set_output_contents(&self, contents: Option<Vec<u8>>) {
        *self.output_contents.write().await = contents;
    }

    /// Make the run writing `output` fail to spawn.
    pub async fn fail_spawn_for(&self, output: impl AsRef<Path>) {
        self.spawn_failures
            .write()
            .await
            .insert(output.as_ref().to_path_buf());
    }

    /// Set how long each run takes after printing its lines.
    pub async fn set_run_duration(&self, duration: Duration) {
        *self.run_duration.write().await = duration;
    }

    /// Highest number of runs in flight at the same time.
    pub fn max_active(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl JobRunner for MockJobRunner {
    fn name(&self) -> &str {
        "mock"
    }

    async fn run(
        &self,
        program: &Path,
        command: &MuxCommand,
        events: mpsc::Sender<RunnerEvent>,
    ) -> Result<ProcessExit, RunnerError> {
        self.invocations.write().await.push(RecordedInvocation {
            program: program.to_path_buf(),
            command: command.clone(),
        });

        if self.spawn_failures.read().await.contains(&command.output) {
            return Err(RunnerError::from_spawn(
                program,
                std::io::Error::from(std::io::ErrorKind::NotFound),
            ));
        }

        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now, Ordering::SeqCst);

        let _ = events.send(RunnerEvent::Spawned { pid: Some(4242) }).await;

        let lines = self
            .lines
            .read()
            .await
            .get(&command.backend)
            .cloned()
            .unwrap_or_default();
        for line in lines {
            let _ = events.send(RunnerEvent::Output(line)).await;
        }

        let duration = *self.run_duration.read().await;
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }

        let contents = self.output_contents.read().await.clone();
        let written = match contents {
            Some(bytes) => tokio::fs::write(&command.output, bytes).await,
            None => Ok(()),
        };

        self.active.fetch_sub(1, Ordering::SeqCst);
        written?;

        let exit = match self.exit_overrides.read().await.get(&command.output) {
            Some(exit) => *exit,
            None => *self.exit.read().await,
        };
        Ok(exit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::MuxArg;
    use tempfile::TempDir;

    fn command(output: PathBuf) -> MuxCommand {
        MuxCommand {
            backend: Backend::MkvMerge,
            output,
            args: vec![MuxArg::literal("--version")],
        }
    }

    #[tokio::test]
    async fn test_scripted_run() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("e.mkv");
        let runner = MockJobRunner::new();
        runner
            .set_output_lines(Backend::MkvMerge, vec!["Progress: 100%"])
            .await;
        let (tx, mut rx) = mpsc::channel(8);

        let exit = runner
            .run(Path::new("mkvmerge"), &command(output.clone()), tx)
            .await
            .unwrap();

        assert!(exit.success());
        assert!(output.exists());
        assert_eq!(
            rx.recv().await,
            Some(RunnerEvent::Spawned { pid: Some(4242) })
        );
        assert_eq!(
            rx.recv().await,
            Some(RunnerEvent::Output("Progress: 100%".to_string()))
        );
        assert_eq!(runner.invocation_count().await, 1);
        assert_eq!(runner.max_active(), 1);
    }

    #[tokio::test]
    async fn test_spawn_failure() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("e.mkv");
        let runner = MockJobRunner::new();
        runner.fail_spawn_for(&output).await;
        let (tx, _rx) = mpsc::channel(8);

        let result = runner
            .run(Path::new("mkvmerge"), &command(output.clone()), tx)
            .await;

        assert!(matches!(result, Err(RunnerError::ProgramNotFound { .. })));
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn test_exit_override() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("e.mkv");
        let runner = MockJobRunner::new();
        runner.set_exit_for(&output, ProcessExit::with_code(2)).await;
        runner.set_output_contents(None).await;
        let (tx, _rx) = mpsc::channel(8);

        let exit = runner
            .run(Path::new("mkvmerge"), &command(output.clone()), tx)
            .await
            .unwrap();

        assert_eq!(exit.code, Some(2));
        assert!(!output.exists());
    }
}
