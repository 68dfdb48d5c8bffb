//! Logging infrastructure for project automation runs.
//!
//! This module provides:
//! - An append-only run log with file + console dual output
//! - Per-level counters and a tail buffer for the run summary
//! - Integration with the `tracing` ecosystem
//!
//! # Example
//!
//! ```no_run
//! use autoproj_core::logging::{LogConfig, RunLogger};
//!
//! let logger = RunLogger::new("/path/to/ScriptLog.txt", LogConfig::default(), None);
//!
//! logger.info("Starting run");
//! logger.phase("Phase 1: Import");
//! logger.warn("Missing slide: /slides/end.jpg");
//! logger.success("Project saved");
//! ```

mod run_logger;
mod types;

pub use run_logger::{RunLogger, RunLoggerBuilder, LOG_BANNER};
pub use types::{ConsoleCallback, LevelCounts, LogConfig, LogLevel, MessagePrefix};

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// File name of the diagnostics log written by [`init_tracing_with_file`].
pub const DIAGNOSTICS_FILE: &str = "autoproj-trace.log";

/// Initialize global tracing subscriber for application-wide logging.
///
/// This sets up a subscriber that:
/// - Respects RUST_LOG environment variable
/// - Falls back to the provided default level
/// - Outputs to stderr
///
/// Calling it more than once is harmless; later calls are ignored.
pub fn init_tracing(default_level: LogLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_to_filter_str(default_level)));

    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .try_init();
}

/// Like [`init_tracing`], additionally writing every event to
/// `logs_dir/autoproj-trace.log`.
///
/// The returned guard must be held for the lifetime of the program so the
/// background writer flushes on exit. Returns `None` if the directory cannot
/// be created; stderr output is still installed in that case.
pub fn init_tracing_with_file(default_level: LogLevel, logs_dir: &Path) -> Option<WorkerGuard> {
    if let Err(e) = std::fs::create_dir_all(logs_dir) {
        eprintln!(
            "[WARNING] Cannot create logs folder {}: {}",
            logs_dir.display(),
            e
        );
        init_tracing(default_level);
        return None;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_to_filter_str(default_level)));

    let appender = tracing_appender::rolling::never(logs_dir, DIAGNOSTICS_FILE);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr),
        )
        .with(fmt::layer().with_ansi(false).with_writer(writer))
        .with(filter)
        .try_init();

    Some(guard)
}

/// Initialize tracing for tests (only logs warnings and above).
#[cfg(test)]
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("warn")
        .with_test_writer()
        .try_init();
}

/// Convert LogLevel to filter string.
fn level_to_filter_str(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Debug => "debug",
        LogLevel::Info | LogLevel::Success => "info",
        LogLevel::Warning => "warn",
        LogLevel::Error => "error",
    }
}
