//! Diagnostic logging for fspurge.
//!
//! This is the operator-facing trace of a run (warnings about failed
//! removals, fatal errors, debug detail about listing batches). The
//! per-run audit log with its key/value report lives in `fspurge-cleaner`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub use tracing::{debug, error, info, trace, warn};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Level filter (trace, debug, info, warn, error). `RUST_LOG` wins when set.
    #[serde(default = "default_level")]
    pub level: String,

    /// Directory for diagnostic log files. No file output when unset.
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    #[serde(default = "default_prefix")]
    pub file_prefix: String,

    /// "hourly", "daily" or "never".
    #[serde(default = "default_rotation")]
    pub rotation: String,

    #[serde(default)]
    pub json_format: bool,

    /// Also write to stderr.
    #[serde(default = "default_true")]
    pub console_output: bool,
}

fn default_level() -> String {
    "info".into()
}

fn default_prefix() -> String {
    "fspurge".into()
}

fn default_rotation() -> String {
    "daily".into()
}

fn default_true() -> bool {
    true
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            level: default_level(),
            log_dir: None,
            file_prefix: default_prefix(),
            rotation: default_rotation(),
            json_format: false,
            console_output: true,
        }
    }
}

impl LogConfig {
    /// Raise the level according to a `-v` count: 0 keeps the configured
    /// level, 1 is debug, 2 or more is trace.
    pub fn with_verbosity(mut self, verbose: u8) -> Self {
        match verbose {
            0 => {}
            1 => self.level = "debug".into(),
            _ => self.level = "trace".into(),
        }
        self
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("cannot create log file appender: {0}")]
    Appender(#[from] rolling::InitError),

    #[error("logging already initialized: {0}")]
    Init(#[from] tracing_subscriber::util::TryInitError),
}

fn parse_rotation(rotation: &str) -> rolling::Rotation {
    match rotation {
        "hourly" => rolling::Rotation::HOURLY,
        "never" => rolling::Rotation::NEVER,
        _ => rolling::Rotation::DAILY,
    }
}

/// Install the global subscriber. Call once at startup and hold the
/// returned guard until exit so buffered file output is flushed.
pub fn init_logging(config: &LogConfig) -> Result<Option<WorkerGuard>, LoggingError> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let registry = tracing_subscriber::registry().with(env_filter);

    let console_layer: Option<Box<dyn tracing_subscriber::Layer<_> + Send + Sync>> =
        match (config.console_output, config.json_format) {
            (false, _) => None,
            (true, true) => Some(Box::new(fmt::layer().json().with_writer(std::io::stderr))),
            (true, false) => Some(Box::new(
                fmt::layer().with_target(false).with_writer(std::io::stderr),
            )),
        };

    let (file_layer, guard): (
        Option<Box<dyn tracing_subscriber::Layer<_> + Send + Sync>>,
        Option<WorkerGuard>,
    ) = match config.log_dir {
        Some(ref log_dir) => {
            let appender = rolling::RollingFileAppender::builder()
                .rotation(parse_rotation(&config.rotation))
                .filename_prefix(&config.file_prefix)
                .filename_suffix("log")
                .build(log_dir)?;
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer: Box<dyn tracing_subscriber::Layer<_> + Send + Sync> = if config.json_format
            {
                Box::new(fmt::layer().json().with_writer(writer))
            } else {
                Box::new(fmt::layer().with_ansi(false).with_writer(writer))
            };
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    registry.with(console_layer).with(file_layer).try_init()?;

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LogConfig::default();
        assert_eq!(config.level, "info");
        assert_eq!(config.file_prefix, "fspurge");
        assert!(config.log_dir.is_none());
        assert!(config.console_output);
    }

    #[test]
    fn test_partial_toml() {
        let config: LogConfig = toml::from_str("level = \"warn\"\njson_format = true").unwrap();
        assert_eq!(config.level, "warn");
        assert!(config.json_format);
        assert_eq!(config.rotation, "daily");
    }

    #[test]
    fn test_verbosity() {
        assert_eq!(LogConfig::default().with_verbosity(0).level, "info");
        assert_eq!(LogConfig::default().with_verbosity(1).level, "debug");
        assert_eq!(LogConfig::default().with_verbosity(4).level, "trace");
    }

    #[test]
    fn test_parse_rotation() {
        assert_eq!(parse_rotation("hourly"), rolling::Rotation::HOURLY);
        assert_eq!(parse_rotation("never"), rolling::Rotation::NEVER);
        assert_eq!(parse_rotation("bogus"), rolling::Rotation::DAILY);
    }

    #[test]
    fn test_init_with_file_then_reinit_fails() {
        let dir = tempfile::tempdir().unwrap();
        let config = LogConfig {
            log_dir: Some(dir.path().to_path_buf()),
            console_output: false,
            ..Default::default()
        };
        let guard = init_logging(&config).unwrap();
        assert!(guard.is_some());
        tracing::info!("hello");
        assert!(matches!(init_logging(&config), Err(LoggingError::Init(_))));
    }
}
