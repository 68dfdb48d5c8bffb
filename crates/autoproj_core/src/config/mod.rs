//! Configuration management for project automation.
//!
//! This module provides:
//! - TOML-based configuration with logical sections
//! - Atomic file writes (write to temp, then rename)
//! - Section-level updates (only changed section is modified)
//! - Validation on load with automatic defaults
//!
//! # Example
//!
//! ```no_run
//! use autoproj_core::config::{ConfigManager, ConfigSection, OnExistingSequence};
//!
//! let mut config = ConfigManager::new(".config/autoproj.toml");
//! config.load_or_create().unwrap();
//!
//! println!("Manifest: {}", config.settings().manifest_file().display());
//!
//! config.settings_mut().sequences.on_existing = OnExistingSequence::Replace;
//! config.update_section(ConfigSection::Sequences).unwrap();
//! ```

mod manager;
mod settings;

pub use manager::{ConfigError, ConfigManager, ConfigResult, DEFAULT_CONFIG_PATH};
pub use settings::{
    BinSettings, ConfigSection, LoggingSettings, OnExistingProject, OnExistingSequence,
    PathSettings, ProjectSettings, SequenceSettings, Settings,
};
