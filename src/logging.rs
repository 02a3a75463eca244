//! File logging for the dashboard.
//!
//! The terminal belongs to the TUI, so everything goes to a daily rolling
//! file under the platform data directory.

use std::fs;
use std::path::PathBuf;
use std::sync::OnceLock;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter, Registry};

const APP_DIR: &str = "ai-news-dashboard";
const LOG_FILE_PREFIX: &str = "news-dash";
const MAX_LOG_FILES: usize = 7;

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("No suitable data directory available for logs")]
    NoDataDir,
    #[error("Failed to prepare log directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to create log appender: {0}")]
    Appender(#[from] tracing_appender::rolling::InitError),
    #[error("Failed to install global tracing subscriber: {0}")]
    SetGlobal(#[from] tracing::subscriber::SetGlobalDefaultError),
}

pub fn log_directory() -> Result<PathBuf, LoggingError> {
    let dir = dirs::data_local_dir()
        .ok_or(LoggingError::NoDataDir)?
        .join(APP_DIR)
        .join("logs");
    fs::create_dir_all(&dir).map_err(|source| LoggingError::CreateDir {
        path: dir.clone(),
        source,
    })?;
    Ok(dir)
}

/// Installs the global subscriber. Later calls are no-ops. `RUST_LOG`
/// overrides the default `info` filter.
pub fn init() -> Result<PathBuf, LoggingError> {
    let dir = log_directory()?;
    if LOG_GUARD.get().is_some() {
        return Ok(dir);
    }

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix("log")
        .max_log_files(MAX_LOG_FILES)
        .build(&dir)?;
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let file_layer = fmt::layer().with_ansi(false).with_writer(writer);
    let subscriber = Registry::default().with(build_env_filter()).with(file_layer);
    tracing::subscriber::set_global_default(subscriber)?;
    let _ = LOG_GUARD.set(guard);

    tracing::info!("Logging initialized in {}", dir.display());
    Ok(dir)
}

fn build_env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}
