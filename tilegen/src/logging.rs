//! Logging infrastructure for tilegen.
//!
//! Provides structured logging with file output and console output:
//! - Writes to the run's log file (cleared on start), debug detail by default
//! - Also prints to stdout, info level by default
//! - `RUST_LOG`, when set, applies to both outputs

use std::fs;
use std::io;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Guard that must be kept alive for the duration of logging.
///
/// Dropping this guard will flush and close the log file writer.
pub struct LoggingGuard {
    _file_guard: WorkerGuard,
}

/// Default file filter when `RUST_LOG` is unset.
pub const DEFAULT_FILE_LEVEL: &str = "debug";

/// Default stdout filter when `RUST_LOG` is unset.
pub const DEFAULT_STDOUT_LEVEL: &str = "info";

fn filter_or(default: &str) -> EnvFilter {
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    build_filter(directives.as_deref(), default)
}

/// Filter from `directives`, or `default` when they are unset, blank or
/// do not parse.
fn build_filter(directives: Option<&str>, default: &str) -> EnvFilter {
    directives
        .filter(|d| !d.trim().is_empty())
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(default))
}

/// Initialize logging system.
///
/// Creates `log_dir` if needed, clears any previous log file, and installs
/// the global subscriber.
///
/// # Arguments
///
/// * `log_dir` - Directory for the log file (the run directory)
/// * `log_file` - Log filename (e.g., "logs.txt")
///
/// # Errors
///
/// Returns error if the log file cannot be prepared or a global subscriber
/// is already installed.
pub fn init_logging(log_dir: &Path, log_file: &str) -> Result<LoggingGuard, io::Error> {
    fs::create_dir_all(log_dir)?;
    fs::write(log_dir.join(log_file), "")?;

    let file_appender = tracing_appender::rolling::never(log_dir, log_file);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false)
        .with_filter(filter_or(DEFAULT_FILE_LEVEL));

    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stdout)
        .with_target(false)
        .compact()
        .with_filter(filter_or(DEFAULT_STDOUT_LEVEL));

    tracing_subscriber::registry()
        .with(file_layer)
        .with(stdout_layer)
        .try_init()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}
