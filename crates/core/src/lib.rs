pub mod command;
pub mod config;
pub mod engine;
pub mod events;
pub mod matcher;
pub mod media;
pub mod postprocess;
pub mod progress;
pub mod runner;
pub mod scheduler;
pub mod testing;

pub use command::{build_jobs, synthesize, Backend, Job, MuxArg, MuxCommand};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, MuxingConfiguration,
    PostProcessConfig, SchedulerConfig, ToolsConfig,
};
pub use engine::{EngineError, MuxEngine};
pub use events::{EventSender, MuxEvent, TaskBoard, TaskProgress, TaskStatus};
pub use matcher::{Episode, FfprobeFrameRate, FileMatcher, FrameRateProbe, MatcherError};
pub use media::{AudioSource, FrameRate, OutputFormat, VideoSource};
pub use postprocess::{PostProcessError, PostProcessor, COMPLETED_DIR_NAME};
pub use runner::{JobRunner, ProcessExit, ProcessRunner, RunnerError, RunnerEvent};
pub use scheduler::{BatchSummary, JobScheduler, PoolStatus, TaskOutcome};
