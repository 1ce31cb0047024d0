//! The muxing engine.

use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::info;

use super::error::EngineError;
use crate::command::{build_jobs, Job};
use crate::config::{validate_config, Config};
use crate::events::{EventSender, MuxEvent};
use crate::matcher::{Episode, FileMatcher, FrameRateProbe};
use crate::postprocess::PostProcessor;
use crate::runner::JobRunner;
use crate::scheduler::{BatchSummary, JobScheduler};

/// Discovers episodes, plans one job per episode and runs the batch.
///
/// Discovery and planning finish before the first muxer starts, so the
/// `EpisodesDiscovered` event always precedes any task event.
pub struct MuxEngine<R: JobRunner, P: FrameRateProbe> {
    config: Config,
    runner: Arc<R>,
    probe: Arc<P>,
}

impl<R: JobRunner + 'static, P: FrameRateProbe> MuxEngine<R, P> {
    /// Creates an engine after validating `config`.
    pub fn new(config: Config, runner: R, probe: P) -> Result<Self, EngineError> {
        validate_config(&config)?;
        Ok(Self {
            config,
            runner: Arc::new(runner),
            probe: Arc::new(probe),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn post_processor(&self) -> PostProcessor {
        PostProcessor::new(
            self.config.post_process.clone(),
            &self.config.muxing.root_dir,
        )
    }

    fn matcher(&self) -> FileMatcher<P> {
        let completed_dir = self
            .config
            .post_process
            .move_to_completed
            .then(|| self.post_processor().completed_dir());
        FileMatcher::new(self.config.muxing.clone(), Arc::clone(&self.probe))
            .with_completed_dir(completed_dir)
    }

    /// Scans the root directory for episodes that still need muxing.
    pub async fn discover(&self) -> Result<Vec<Episode>, EngineError> {
        let episodes = self.matcher().discover().await?;
        info!(
            root = %self.config.muxing.root_dir.display(),
            episodes = episodes.len(),
            "Discovery finished"
        );
        Ok(episodes)
    }

    /// Discovers episodes and synthesizes their commands without running them.
    pub async fn plan(&self) -> Result<Vec<Job>, EngineError> {
        Ok(build_jobs(self.discover().await?))
    }

    /// Discovers, announces the episode list and launches the batch in the
    /// background.
    ///
    /// Returns once `EpisodesDiscovered` has been emitted; the handle
    /// resolves after `AllTasksCompleted`.
    pub async fn start(self, events: EventSender) -> Result<JoinHandle<BatchSummary>, EngineError> {
        let episodes = self.discover().await?;
        events
            .emit(MuxEvent::EpisodesDiscovered {
                episodes: episodes.clone(),
            })
            .await;

        let jobs = build_jobs(episodes);
        let scheduler = JobScheduler::new(
            self.config.scheduler.clone(),
            self.config.tools.clone(),
            Arc::clone(&self.runner),
            self.post_processor(),
        );
        Ok(tokio::spawn(async move { scheduler.run(jobs, events).await }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MuxingConfiguration, PostProcessConfig};
    use crate::media::{AudioSource, OutputFormat, VideoSource};
    use crate::testing::{touch, MockFrameRateProbe, MockJobRunner};
    use tempfile::TempDir;

    fn config(root: &std::path::Path) -> Config {
        Config {
            muxing: MuxingConfiguration::new(root.to_path_buf(), VideoSource::Avc, OutputFormat::Mkv)
                .with_audio_sources(vec![AudioSource::Flac]),
            tools: Default::default(),
            scheduler: Default::default(),
            post_process: PostProcessConfig::default(),
        }
    }

    #[tokio::test]
    async fn test_rejects_invalid_config() {
        let dir = TempDir::new().unwrap();
        let mut config = config(dir.path());
        config.scheduler.max_parallel_jobs = 0;

        let result = MuxEngine::new(config, MockJobRunner::new(), MockFrameRateProbe::default());
        assert!(matches!(result, Err(EngineError::Config(_))));
    }

    #[tokio::test]
    async fn test_missing_root_is_an_error() {
        let dir = TempDir::new().unwrap();
        let engine = MuxEngine::new(
            config(&dir.path().join("missing")),
            MockJobRunner::new(),
            MockFrameRateProbe::default(),
        )
        .unwrap();

        let (events, _rx) = EventSender::channel(8);
        assert!(matches!(
            engine.start(events).await,
            Err(EngineError::Matcher(_))
        ));
    }

    #[tokio::test]
    async fn test_plan_does_not_run() {
        let dir = TempDir::new().unwrap();
        touch(&dir.path().join("ep01.264"), 10).await;
        touch(&dir.path().join("ep01.flac"), 10).await;
        let runner = MockJobRunner::new();
        let engine =
            MuxEngine::new(config(dir.path()), runner.clone(), MockFrameRateProbe::default())
                .unwrap();

        let jobs = engine.plan().await.unwrap();

        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].command.output, dir.path().join("ep01.mkv"));
        assert_eq!(runner.invocation_count().await, 0);
    }

    #[tokio::test]
    async fn test_start_announces_episodes_first() {
        let dir = TempDir::new().unwrap();
        touch(&dir.path().join("ep01.264"), 10).await;
        touch(&dir.path().join("ep01.flac"), 10).await;
        touch(&dir.path().join("ep02.264"), 10).await;
        touch(&dir.path().join("ep02.flac"), 10).await;
        let engine = MuxEngine::new(
            config(dir.path()),
            MockJobRunner::new(),
            MockFrameRateProbe::default(),
        )
        .unwrap();

        let (events, mut rx) = EventSender::channel(64);
        let summary = engine.start(events).await.unwrap().await.unwrap();

        assert_eq!(summary.completed(), 2);
        match rx.recv().await {
            Some(MuxEvent::EpisodesDiscovered { episodes }) => assert_eq!(episodes.len(), 2),
            other => panic!("unexpected first event {:?}", other),
        }
    }
}
