mod args;
mod report;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use automux_core::{load_config, EventSender, FfprobeFrameRate, MuxEngine, ProcessRunner};

use args::Args;
use report::Reporter;

/// Buffer size for the event channel
const EVENT_BUFFER_SIZE: usize = 256;

/// Exit status when at least one task failed
const EXIT_TASKS_FAILED: i32 = 2;

#[tokio::main]
async fn main() {
    match run().await {
        Ok(true) => {}
        Ok(false) => std::process::exit(EXIT_TASKS_FAILED),
        Err(e) => {
            error!("Fatal error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Runs one batch; returns whether every task completed.
async fn run() -> Result<bool> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    info!("Loading configuration from {:?}", args.config);
    let mut config = load_config(&args.config)
        .with_context(|| format!("Failed to load config from {:?}", args.config))?;

    if let Some(root) = args.root {
        config.muxing.root_dir = root;
    }
    if let Some(jobs) = args.jobs {
        config.scheduler.max_parallel_jobs = jobs;
    }

    info!("Root directory: {:?}", config.muxing.root_dir);
    info!(
        "Video: {:?}, audio: {:?}, output: {}",
        config.muxing.video_source, config.muxing.audio_sources, config.muxing.output
    );
    info!("Parallel jobs: {}", config.scheduler.max_parallel_jobs);

    let probe = FfprobeFrameRate::new(config.tools.ffprobe.clone());
    let engine = MuxEngine::new(config, ProcessRunner::new(), probe)
        .context("Configuration validation failed")?;

    if args.dry_run {
        let jobs = engine.plan().await.context("Discovery failed")?;
        for job in &jobs {
            let program = engine
                .config()
                .tools
                .program_for(job.backend())
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| format!("<{} disabled>", job.backend()));
            println!("{} {}", program, job.command.argument_string());
        }
        info!("{} job(s) planned", jobs.len());
        return Ok(true);
    }

    let (events, mut rx) = EventSender::channel(EVENT_BUFFER_SIZE);
    let batch = engine.start(events).await.context("Failed to start batch")?;

    let mut reporter = Reporter::new();
    while let Some(event) = rx.recv().await {
        reporter.handle(&event);
    }

    let summary = batch.await.context("Batch task panicked")?;
    reporter.print_summary(&summary);
    Ok(summary.is_success())
}
