use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

use crate::config::Config;

const LOG_FILE_PREFIX: &str = "rom-engine";

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub log_level: String,
    pub enable_file_logs: bool,
    pub log_dir: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            enable_file_logs: false,
            log_dir: "./logs".to_string(),
        }
    }
}

impl From<&Config> for LogConfig {
    fn from(config: &Config) -> Self {
        Self {
            log_level: config.log_level.clone(),
            enable_file_logs: config.enable_file_logs,
            log_dir: config.log_dir.clone(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("failed to create rolling file appender: {0}")]
    Appender(#[from] tracing_appender::rolling::InitError),
    #[error("failed to install tracing subscriber: {0}")]
    Subscriber(String),
}

/// Install the global subscriber.
///
/// File output goes through a non-blocking writer so detector-driven logging
/// never waits on disk; keep the returned guard alive to flush on exit.
/// Calling this again after a subscriber is installed is a no-op.
pub fn init_tracing(config: &LogConfig) -> Result<Option<WorkerGuard>, LoggingError> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let stdout_layer = fmt::layer().with_target(true).with_thread_ids(false);
    let registry = Registry::default().with(env_filter).with(stdout_layer);

    if !config.enable_file_logs {
        return registry.try_init().map(|_| None).or_else(already_set);
    }

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix("log")
        .max_log_files(14)
        .build(&config.log_dir)?;
    let (writer, guard) = tracing_appender::non_blocking(file_appender);
    let file_layer = fmt::layer().with_writer(writer).with_ansi(false).json();

    registry
        .with(file_layer)
        .try_init()
        .map(|_| Some(guard))
        .or_else(already_set)
}

// A subscriber installed earlier (tests, embedding host) is not an error.
fn already_set<E: std::fmt::Display>(e: E) -> Result<Option<WorkerGuard>, LoggingError> {
    let msg = e.to_string();
    if msg.contains("already") {
        Ok(None)
    } else {
        Err(LoggingError::Subscriber(msg))
    }
}
