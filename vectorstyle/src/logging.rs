//! Logging setup.
//!
//! Logs go to stderr and, when configured, to a file through a non-blocking
//! writer. `RUST_LOG` overrides the configured level.

use std::path::Path;

use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::LocalTime;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingConfig;

/// Errors that can occur while installing the subscriber.
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Invalid log filter '{0}'")]
    Filter(String),

    #[error("Cannot open log file {path}: {source}")]
    File {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Logging already initialized: {0}")]
    Init(String),
}

/// A valid `env` directive wins; otherwise the configured level is used.
fn build_filter(env: Option<&str>, level: &str) -> Result<EnvFilter, LoggingError> {
    env.and_then(|directives| EnvFilter::try_new(directives).ok())
        .map(Ok)
        .unwrap_or_else(|| EnvFilter::try_new(level))
        .map_err(|_| LoggingError::Filter(level.to_string()))
}

/// Install the global subscriber.
///
/// Returns the file writer's guard when a log file is configured; keep it
/// alive until exit so buffered lines are flushed.
pub fn init_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>, LoggingError> {
    let filter = build_filter(std::env::var(EnvFilter::DEFAULT_ENV).ok().as_deref(), &config.level)?;

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_timer(LocalTime::rfc_3339())
        .with_target(false);

    let Some(path) = &config.file else {
        tracing_subscriber::registry()
            .with(filter)
            .with(stderr_layer)
            .try_init()
            .map_err(|e| LoggingError::Init(e.to_string()))?;
        return Ok(None);
    };

    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let file_name = path.file_name().ok_or_else(|| LoggingError::File {
        path: path.display().to_string(),
        source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "no file name"),
    })?;
    std::fs::create_dir_all(dir).map_err(|source| LoggingError::File {
        path: path.display().to_string(),
        source,
    })?;

    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name));
    let file_layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_timer(LocalTime::rfc_3339());

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| LoggingError::Init(e.to_string()))?;
    Ok(Some(guard))
}
