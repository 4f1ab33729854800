use crate::config::Config;
use crate::error::Error;
use std::fs;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Keep alive for the whole process, dropping it flushes the log file.
pub struct LoggingGuard {
    _guard: WorkerGuard,
}

pub fn init_logging(config: &Config) -> Result<LoggingGuard, Error> {
    fs::create_dir_all(&config.log_dir).map_err(|e| {
        Error::Config(format!(
            "cannot create log directory {}: {}",
            config.log_dir.display(),
            e
        ))
    })?;

    let appender = RollingFileAppender::new(Rotation::DAILY, &config.log_dir, "board.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = tracing_subscriber::registry().with(env_filter).with(
        tracing_subscriber::fmt::layer()
            .with_writer(writer)
            .with_ansi(false)
            .with_target(true),
    );

    // A second init (tests, embedding) keeps the first subscriber.
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        tracing::debug!("global subscriber already installed");
    }

    tracing::info!(log_dir = %config.log_dir.display(), "logging initialized");

    Ok(LoggingGuard { _guard: guard })
}
