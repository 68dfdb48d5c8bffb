//! Settings struct with TOML-based sections.
//!
//! Settings are organized into logical sections that map to TOML tables.
//! Each section can be updated independently for atomic section-level updates.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::logging::{LogConfig, LogLevel};
use crate::timeline::Ticks;

/// Root settings structure containing all configuration sections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Project, media, manifest and log locations.
    #[serde(default)]
    pub paths: PathSettings,

    /// Existing project handling.
    #[serde(default)]
    pub project: ProjectSettings,

    /// Bin hierarchy names and color labels.
    #[serde(default)]
    pub bins: BinSettings,

    /// Sequence assembly.
    #[serde(default)]
    pub sequences: SequenceSettings,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSettings,
}

impl Settings {
    /// Resolve a configured path against `paths.project_dir`.
    ///
    /// Absolute paths are returned unchanged.
    pub fn resolve(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            Path::new(&self.paths.project_dir).join(path)
        }
    }

    pub fn project_file(&self) -> PathBuf {
        self.resolve(&self.paths.project_file)
    }

    pub fn video_folder(&self) -> PathBuf {
        self.resolve(&self.paths.video_folder)
    }

    pub fn slide_folder(&self) -> PathBuf {
        self.resolve(&self.paths.slide_folder)
    }

    pub fn manifest_file(&self) -> PathBuf {
        self.resolve(&self.paths.manifest_file)
    }

    pub fn log_file(&self) -> PathBuf {
        self.resolve(&self.paths.log_file)
    }

    pub fn logs_folder(&self) -> PathBuf {
        self.resolve(&self.paths.logs_folder)
    }

    pub fn rename_map(&self) -> PathBuf {
        self.resolve(&self.paths.rename_map)
    }
}

/// Path configuration. Relative entries resolve against `project_dir`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathSettings {
    /// Root directory of the automation project.
    #[serde(default = "default_project_dir")]
    pub project_dir: String,

    /// Project document.
    #[serde(default = "default_project_file")]
    pub project_file: String,

    /// Folder holding source videos.
    #[serde(default = "default_video_folder")]
    pub video_folder: String,

    /// Folder holding slide images.
    #[serde(default = "default_slide_folder")]
    pub slide_folder: String,

    /// JSON manifest describing sections and sequences.
    #[serde(default = "default_manifest_file")]
    pub manifest_file: String,

    /// Append-only run log.
    #[serde(default = "default_log_file")]
    pub log_file: String,

    /// Folder for tracing diagnostics.
    #[serde(default = "default_logs_folder")]
    pub logs_folder: String,

    /// JSON old→new file name mapping used by `rename`.
    #[serde(default = "default_rename_map")]
    pub rename_map: String,
}

fn default_project_dir() -> String {
    ".".to_string()
}

fn default_project_file() -> String {
    "project/project.json".to_string()
}

fn default_video_folder() -> String {
    "source/videos".to_string()
}

fn default_slide_folder() -> String {
    "source/slides".to_string()
}

fn default_manifest_file() -> String {
    "scripts/sequence_mapping.json".to_string()
}

fn default_log_file() -> String {
    "scripts/script_log.txt".to_string()
}

fn default_logs_folder() -> String {
    ".logs".to_string()
}

fn default_rename_map() -> String {
    "scripts/rename_map.json".to_string()
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            project_dir: default_project_dir(),
            project_file: default_project_file(),
            video_folder: default_video_folder(),
            slide_folder: default_slide_folder(),
            manifest_file: default_manifest_file(),
            log_file: default_log_file(),
            logs_folder: default_logs_folder(),
            rename_map: default_rename_map(),
        }
    }
}

/// What to do when the project document already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OnExistingProject {
    /// Open it and build into it.
    #[default]
    Open,
    /// Delete it and start from an empty document.
    Overwrite,
}

/// Existing project handling.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectSettings {
    #[serde(default)]
    pub on_existing: OnExistingProject,
}

/// Names and color labels of the fixed bin hierarchy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BinSettings {
    #[serde(default = "default_master_name")]
    pub master_name: String,

    #[serde(default = "default_master_color")]
    pub master_color: u8,

    #[serde(default = "default_videos_name")]
    pub videos_name: String,

    #[serde(default = "default_slides_name")]
    pub slides_name: String,

    #[serde(default = "default_sequences_name")]
    pub sequences_name: String,

    /// Color of the Videos, Slides and Sequences bins.
    #[serde(default = "default_group_color")]
    pub group_color: u8,

    /// Color of per-section bins.
    #[serde(default = "default_section_color")]
    pub section_color: u8,
}

fn default_master_name() -> String {
    "Master Bin".to_string()
}

fn default_master_color() -> u8 {
    3
}

fn default_videos_name() -> String {
    "Videos".to_string()
}

fn default_slides_name() -> String {
    "Slides".to_string()
}

fn default_sequences_name() -> String {
    "Sequences".to_string()
}

fn default_group_color() -> u8 {
    6
}

fn default_section_color() -> u8 {
    13
}

impl Default for BinSettings {
    fn default() -> Self {
        Self {
            master_name: default_master_name(),
            master_color: default_master_color(),
            videos_name: default_videos_name(),
            slides_name: default_slides_name(),
            sequences_name: default_sequences_name(),
            group_color: default_group_color(),
            section_color: default_section_color(),
        }
    }
}

/// What to do when a sequence with the same name already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OnExistingSequence {
    /// Leave the existing sequence untouched.
    #[default]
    Skip,
    /// Remove it and build again.
    Replace,
}

/// Sequence assembly settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SequenceSettings {
    #[serde(default)]
    pub on_existing: OnExistingSequence,

    /// Video track slides are inserted on.
    #[serde(default)]
    pub video_track: usize,

    /// Audio track slides are inserted on.
    #[serde(default)]
    pub audio_track: usize,

    /// Duration given to still images, in seconds.
    #[serde(default = "default_still_duration_secs")]
    pub still_duration_secs: f64,
}

fn default_still_duration_secs() -> f64 {
    5.0
}

impl Default for SequenceSettings {
    fn default() -> Self {
        Self {
            on_existing: OnExistingSequence::default(),
            video_track: 0,
            audio_track: 0,
            still_duration_secs: default_still_duration_secs(),
        }
    }
}

impl SequenceSettings {
    pub fn still_duration(&self) -> Ticks {
        Ticks::from_secs_f64(self.still_duration_secs)
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Minimum level written to the run log.
    #[serde(default)]
    pub level: LogLevel,

    /// Echo run log lines on the console.
    #[serde(default = "default_true")]
    pub echo_console: bool,

    /// Number of recent lines kept for the summary.
    #[serde(default = "default_error_tail")]
    pub error_tail: u32,
}

fn default_true() -> bool {
    true
}

fn default_error_tail() -> u32 {
    50
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            echo_console: default_true(),
            error_tail: default_error_tail(),
        }
    }
}

impl LoggingSettings {
    pub fn log_config(&self) -> LogConfig {
        LogConfig {
            level: self.level,
            error_tail: self.error_tail as usize,
            show_timestamps: true,
        }
    }
}

/// Names of config sections for targeted updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigSection {
    Paths,
    Project,
    Bins,
    Sequences,
    Logging,
}

impl ConfigSection {
    pub const ALL: [ConfigSection; 5] = [
        ConfigSection::Paths,
        ConfigSection::Project,
        ConfigSection::Bins,
        ConfigSection::Sequences,
        ConfigSection::Logging,
    ];

    /// Get the TOML table name for this section.
    pub fn table_name(&self) -> &'static str {
        match self {
            ConfigSection::Paths => "paths",
            ConfigSection::Project => "project",
            ConfigSection::Bins => "bins",
            ConfigSection::Sequences => "sequences",
            ConfigSection::Logging => "logging",
        }
    }

    /// Comment written above the table in generated files.
    pub fn description(&self) -> &'static str {
        match self {
            ConfigSection::Paths => "Project, media, manifest and log locations",
            ConfigSection::Project => "Existing project handling: \"open\" or \"overwrite\"",
            ConfigSection::Bins => "Bin hierarchy names and color labels",
            ConfigSection::Sequences => "Sequence assembly: on_existing is \"skip\" or \"replace\"",
            ConfigSection::Logging => "Run log settings",
        }
    }
}
