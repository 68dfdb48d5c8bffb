//! Append-only run logger.
//!
//! Each run appends to a persistent log file:
//! - Creates the file with a banner line if it does not exist yet
//! - One line per event: `[YYYY-MM-DD HH:MM:SS] [LEVEL] message`
//! - Never rotates or truncates
//! - Write failures go to stderr and never interrupt the run
//!
//! Every line is also forwarded to `tracing`, an optional console callback,
//! a bounded tail buffer and per-level counters.

use std::collections::VecDeque;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use parking_lot::Mutex;

use super::types::{ConsoleCallback, LevelCounts, LogConfig, LogLevel, MessagePrefix};

/// First line of a newly created log file.
pub const LOG_BANNER: &str = "=== Script Log Started ===";

/// Run logger with file, console and tracing output.
pub struct RunLogger {
    /// Path to log file (if any).
    log_path: Option<PathBuf>,
    /// File writer, `None` when detached or after a failed open.
    file_writer: Mutex<Option<BufWriter<File>>>,
    /// Console callback.
    console: Mutex<Option<ConsoleCallback>>,
    config: LogConfig,
    /// Recent formatted lines.
    tail_buffer: Mutex<VecDeque<String>>,
    counts: Mutex<LevelCounts>,
}

impl RunLogger {
    /// Create a logger appending to `log_path`.
    ///
    /// An unopenable log file is reported on stderr and the logger carries
    /// on without file output.
    pub fn new(
        log_path: impl Into<PathBuf>,
        config: LogConfig,
        console: Option<ConsoleCallback>,
    ) -> Self {
        let log_path = log_path.into();
        let writer = match open_append(&log_path) {
            Ok(writer) => Some(writer),
            Err(e) => {
                eprintln!(
                    "[ERROR] Failed to open log file {}: {}",
                    log_path.display(),
                    e
                );
                None
            }
        };

        Self {
            log_path: Some(log_path),
            file_writer: Mutex::new(writer),
            console: Mutex::new(console),
            tail_buffer: Mutex::new(VecDeque::with_capacity(config.error_tail)),
            config,
            counts: Mutex::new(LevelCounts::default()),
        }
    }

    /// Create a logger without a log file.
    pub fn detached(config: LogConfig, console: Option<ConsoleCallback>) -> Self {
        Self {
            log_path: None,
            file_writer: Mutex::new(None),
            console: Mutex::new(console),
            tail_buffer: Mutex::new(VecDeque::with_capacity(config.error_tail)),
            config,
            counts: Mutex::new(LevelCounts::default()),
        }
    }

    /// Get the log file path.
    pub fn log_path(&self) -> Option<&Path> {
        self.log_path.as_deref()
    }

    /// Log a message at the specified level.
    pub fn log(&self, level: LogLevel, message: &str) {
        if level < self.config.level {
            return;
        }

        match level {
            LogLevel::Debug => tracing::debug!(target: "autoproj::run", "{}", message),
            LogLevel::Info | LogLevel::Success => {
                tracing::info!(target: "autoproj::run", "{}", message)
            }
            LogLevel::Warning => tracing::warn!(target: "autoproj::run", "{}", message),
            LogLevel::Error => tracing::error!(target: "autoproj::run", "{}", message),
        }

        self.counts.lock().bump(level);
        let formatted = self.format_message(level, message);
        self.output(&formatted);
    }

    /// Log an info message.
    pub fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    /// Log a debug message.
    pub fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message);
    }

    /// Log a success message.
    pub fn success(&self, message: &str) {
        self.log(LogLevel::Success, message);
    }

    /// Log a warning message.
    pub fn warn(&self, message: &str) {
        self.log(LogLevel::Warning, message);
    }

    /// Log an error message.
    pub fn error(&self, message: &str) {
        self.log(LogLevel::Error, message);
    }

    /// Log a phase marker.
    pub fn phase(&self, phase_name: &str) {
        self.info(&MessagePrefix::Phase.format(phase_name));
    }

    /// Log a section marker.
    pub fn section(&self, section_name: &str) {
        self.info(&MessagePrefix::Section.format(section_name));
    }

    /// Number of lines logged at `level` so far.
    pub fn count(&self, level: LogLevel) -> usize {
        self.counts.lock().get(level)
    }

    /// Snapshot of all counters.
    pub fn counts(&self) -> LevelCounts {
        *self.counts.lock()
    }

    /// Get the current tail buffer contents.
    pub fn tail(&self) -> Vec<String> {
        self.tail_buffer.lock().iter().cloned().collect()
    }

    /// Lines in the tail buffer containing `needle`.
    pub fn tail_matching(&self, needle: &str) -> Vec<String> {
        self.tail_buffer
            .lock()
            .iter()
            .filter(|line| line.contains(needle))
            .cloned()
            .collect()
    }

    /// Flush the log file.
    pub fn flush(&self) {
        if let Some(ref mut writer) = *self.file_writer.lock() {
            if let Err(e) = writer.flush() {
                eprintln!("[ERROR] Failed to write to log file: {}", e);
            }
        }
    }

    /// Close the logger and release the file.
    pub fn close(&self) {
        self.flush();
        *self.file_writer.lock() = None;
    }

    /// Format a message with timestamp (if enabled) and level label.
    fn format_message(&self, level: LogLevel, message: &str) -> String {
        if self.config.show_timestamps {
            let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
            format!("[{}] [{}] {}", timestamp, level.label(), message)
        } else {
            format!("[{}] {}", level.label(), message)
        }
    }

    /// Output a formatted line to file, console and tail buffer.
    fn output(&self, formatted: &str) {
        {
            let mut guard = self.file_writer.lock();
            if let Some(writer) = guard.as_mut() {
                let written = writeln!(writer, "{}", formatted).and_then(|_| writer.flush());
                if let Err(e) = written {
                    eprintln!("[ERROR] Failed to write to log file: {}", e);
                }
            }
        }

        if let Some(ref callback) = *self.console.lock() {
            callback(formatted);
        }

        let mut buffer = self.tail_buffer.lock();
        if self.config.error_tail > 0 {
            if buffer.len() >= self.config.error_tail {
                buffer.pop_front();
            }
            buffer.push_back(formatted.to_string());
        }
    }
}

impl Drop for RunLogger {
    fn drop(&mut self) {
        self.close();
    }
}

/// Open for appending, writing the banner if the file is new.
fn open_append(path: &Path) -> std::io::Result<BufWriter<File>> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let is_new = !path.exists();
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut writer = BufWriter::new(file);
    if is_new {
        writeln!(writer, "{}", LOG_BANNER)?;
        writer.flush()?;
    }
    Ok(writer)
}

/// Builder for creating a RunLogger with fluent API.
pub struct RunLoggerBuilder {
    log_path: Option<PathBuf>,
    config: LogConfig,
    console: Option<ConsoleCallback>,
}

impl RunLoggerBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            log_path: None,
            config: LogConfig::default(),
            console: None,
        }
    }

    /// Append to this log file.
    pub fn log_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_path = Some(path.into());
        self
    }

    /// Set the logging configuration.
    pub fn config(mut self, config: LogConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the log level.
    pub fn level(mut self, level: LogLevel) -> Self {
        self.config.level = level;
        self
    }

    /// Set the console callback.
    pub fn console(mut self, callback: ConsoleCallback) -> Self {
        self.console = Some(callback);
        self
    }

    /// Build the RunLogger.
    pub fn build(self) -> RunLogger {
        match self.log_path {
            Some(path) => RunLogger::new(path, self.config, self.console),
            None => RunLogger::detached(self.config, self.console),
        }
    }
}

impl Default for RunLoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tempfile::tempdir;

    #[test]
    fn new_file_starts_with_banner() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("logs").join("run.log");
        let logger = RunLogger::new(&path, LogConfig::default(), None);

        logger.info("Hello");
        logger.close();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], LOG_BANNER);
        assert!(lines[1].ends_with("] [INFO] Hello"));
    }

    #[test]
    fn appends_across_runs_without_second_banner() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("run.log");

        RunLogger::new(&path, LogConfig::default(), None).warn("first");
        RunLogger::new(&path, LogConfig::default(), None).error("second");

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.matches(LOG_BANNER).count(), 1);
        assert!(content.contains("[WARNING] first"));
        assert!(content.contains("[ERROR] second"));
    }

    #[test]
    fn line_format_has_date_and_time() {
        let logger = RunLogger::detached(LogConfig::default(), None);
        logger.success("done");
        let line = &logger.tail()[0];
        // [YYYY-MM-DD HH:MM:SS] [SUCCESS] done
        assert_eq!(&line[0..1], "[");
        assert_eq!(&line[20..21], "]");
        assert_eq!(&line[21..], " [SUCCESS] done");
    }

    #[test]
    fn unwritable_log_file_does_not_panic() {
        let dir = tempdir().unwrap();
        // A directory cannot be opened as a log file.
        let logger = RunLogger::new(dir.path(), LogConfig::default(), None);
        logger.error("still counted");
        assert_eq!(logger.count(LogLevel::Error), 1);
    }

    #[test]
    fn filters_below_configured_level() {
        let logger = RunLoggerBuilder::new().level(LogLevel::Warning).build();
        logger.info("hidden");
        logger.debug("hidden");
        logger.warn("shown");
        assert_eq!(logger.tail().len(), 1);
        assert_eq!(logger.count(LogLevel::Info), 0);
        assert_eq!(logger.count(LogLevel::Warning), 1);
    }

    #[test]
    fn calls_console_callback() {
        let call_count = Arc::new(AtomicUsize::new(0));
        let count_clone = call_count.clone();

        let logger = RunLoggerBuilder::new()
            .console(Box::new(move |_line| {
                count_clone.fetch_add(1, Ordering::SeqCst);
            }))
            .build();

        logger.info("Message 1");
        logger.phase("Phase");

        assert_eq!(call_count.load(Ordering::SeqCst), 2);
        assert_eq!(logger.tail_matching("=== Phase ===").len(), 1);
    }

    #[test]
    fn tail_buffer_maintains_limit() {
        let mut config = LogConfig::default();
        config.error_tail = 3;
        let logger = RunLogger::detached(config, None);

        for i in 0..10 {
            logger.info(&format!("Line {}", i));
        }

        let tail = logger.tail();
        assert_eq!(tail.len(), 3);
        assert!(tail[0].ends_with("Line 7"));
        assert_eq!(logger.count(LogLevel::Info), 10);
    }
}
