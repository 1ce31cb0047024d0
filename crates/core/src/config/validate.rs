use super::{types::Config, ConfigError};
use crate::media::FrameRate;

/// Validate configuration
/// Currently validates:
/// - Muxing section exists (enforced by serde)
/// - Root directory and language tags are non-empty
/// - A literal frame rate is a single non-empty token
/// - The backend for the selected output is not disabled
/// - Pool size and checksum buffer are not 0
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let muxing = &config.muxing;

    if muxing.root_dir.as_os_str().is_empty() {
        return Err(invalid("muxing.root_dir cannot be empty"));
    }

    if muxing.audio_language.trim().is_empty() {
        return Err(invalid("muxing.audio_language cannot be empty"));
    }

    if muxing.subtitle_language.trim().is_empty() {
        return Err(invalid("muxing.subtitle_language cannot be empty"));
    }

    if let FrameRate::Fixed(rate) = &muxing.frame_rate {
        if rate.is_empty() || rate.chars().any(char::is_whitespace) {
            return Err(ConfigError::ValidationError(format!(
                "muxing.frame_rate '{}' is not a valid rate",
                rate
            )));
        }
    }

    let backend = muxing.output.backend();
    if config.tools.program_for(backend).is_none() {
        return Err(ConfigError::ValidationError(format!(
            "output '{}' needs {} but tools.{} is empty",
            muxing.output,
            backend.name(),
            backend.name()
        )));
    }

    if config.scheduler.max_parallel_jobs == 0 {
        return Err(invalid("scheduler.max_parallel_jobs cannot be 0"));
    }

    if config.post_process.read_buffer_bytes == 0 {
        return Err(invalid("post_process.read_buffer_bytes cannot be 0"));
    }

    Ok(())
}

fn invalid(message: &str) -> ConfigError {
    ConfigError::ValidationError(message.to_string())
}
