//! Tracing subscriber setup
//!
//! Logs always go to stderr; stdout carries protocol traffic only. The
//! filter comes from `RUST_LOG` (default `info`). With a log directory,
//! events are also written to a daily-rolling file.

use anyhow::{Context, Result};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "info";
const LOG_FILE_PREFIX: &str = "omni-memory.log";

/// Install the global subscriber
///
/// The returned guard flushes the file writer when dropped; keep it alive
/// for the whole process.
pub fn init_logging(json: bool, log_dir: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let (plain, structured) = if json {
        (None, Some(fmt::layer().json().with_writer(std::io::stderr)))
    } else {
        (
            Some(fmt::layer().with_ansi(false).with_writer(std::io::stderr)),
            None,
        )
    };

    let (file, guard) = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_ansi(false).with_writer(writer)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(plain)
        .with(structured)
        .with(file)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(guard)
}
