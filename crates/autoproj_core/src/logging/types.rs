//! Logging types and configuration.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Severity of a run log line.
///
/// `Success` sits between `Info` and `Warning`: it is informational, but
/// marks a completed unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Debug information (not written unless enabled).
    Debug,
    /// General information.
    #[default]
    Info,
    /// A unit of work completed.
    Success,
    /// A resource was missing; the affected unit was skipped.
    Warning,
    /// A host or I/O operation failed.
    Error,
}

impl LogLevel {
    /// All levels, lowest first.
    pub const ALL: [LogLevel; 5] = [
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Success,
        LogLevel::Warning,
        LogLevel::Error,
    ];

    /// Label written between brackets in the log file.
    pub fn label(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Success => "SUCCESS",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
        }
    }

    /// Convert to tracing level.
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info | LogLevel::Success => tracing::Level::INFO,
            LogLevel::Warning => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Configuration for logging behavior.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Minimum log level to output.
    pub level: LogLevel,
    /// Number of recent lines kept for diagnosis.
    pub error_tail: usize,
    /// Prefix lines with a timestamp.
    pub show_timestamps: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            error_tail: 50,
            show_timestamps: true,
        }
    }
}

impl LogConfig {
    /// Create a debug configuration (verbose).
    pub fn debug() -> Self {
        Self {
            level: LogLevel::Debug,
            error_tail: 200,
            show_timestamps: true,
        }
    }
}

/// Console callback; receives each formatted line.
pub type ConsoleCallback = Box<dyn Fn(&str) + Send + Sync>;

/// Message decorations for structural markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessagePrefix {
    /// Phase marker: `=== Phase ===`
    Phase,
    /// Section marker: `--- Section ---`
    Section,
    /// No prefix
    None,
}

impl MessagePrefix {
    /// Format a message with this prefix.
    pub fn format(&self, message: &str) -> String {
        match self {
            MessagePrefix::Phase => format!("=== {} ===", message),
            MessagePrefix::Section => format!("--- {} ---", message),
            MessagePrefix::None => message.to_string(),
        }
    }
}

/// Per-level line counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LevelCounts([usize; 5]);

impl LevelCounts {
    pub fn get(&self, level: LogLevel) -> usize {
        self.0[level.index()]
    }

    pub(crate) fn bump(&mut self, level: LogLevel) {
        self.0[level.index()] += 1;
    }
}
