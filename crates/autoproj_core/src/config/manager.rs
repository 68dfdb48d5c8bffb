//! Reads and writes `autoproj.toml`.
//!
//! Writes go through a temp file and a rename. A single section can be
//! rewritten with `toml_edit` without touching the rest of the file, and
//! tables the automation does not know are dropped on load.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use toml_edit::{DocumentMut, Item};

use super::settings::{ConfigSection, Settings};

/// Default location of the configuration file.
pub const DEFAULT_CONFIG_PATH: &str = ".config/autoproj.toml";

/// Config file errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("Failed to parse config for editing: {0}")]
    EditParseError(#[from] toml_edit::TomlError),

    #[error("Config file not found: {}", .0.display())]
    NotFound(PathBuf),
}

/// Config result.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Owns the settings and the path they were loaded from.
pub struct ConfigManager {
    config_path: PathBuf,
    settings: Settings,
}

impl ConfigManager {
    /// Manager for `config_path` holding default settings until loaded.
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
            settings: Settings::default(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// In-memory only until [`save`](Self::save) or
    /// [`update_section`](Self::update_section).
    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    /// Consume the manager, keeping the settings.
    pub fn into_settings(self) -> Settings {
        self.settings
    }

    /// Read the file; [`ConfigError::NotFound`] when it is absent.
    pub fn load(&mut self) -> ConfigResult<()> {
        if !self.config_path.exists() {
            return Err(ConfigError::NotFound(self.config_path.clone()));
        }

        let content = fs::read_to_string(&self.config_path)?;
        self.settings = toml::from_str(&content)?;
        Ok(())
    }

    /// Read the file, or write the defaults when there is none.
    ///
    /// A file with unknown or missing tables is rewritten.
    pub fn load_or_create(&mut self) -> ConfigResult<()> {
        if self.config_path.exists() {
            let content = fs::read_to_string(&self.config_path)?;
            let (settings, was_modified) = self.parse_validate_and_clean(&content)?;
            self.settings = settings;

            if was_modified {
                tracing::debug!("Rewriting cleaned config: {}", self.config_path.display());
                self.save()?;
            }
        } else {
            tracing::info!("Creating default config: {}", self.config_path.display());
            self.settings = Settings::default();
            self.save()?;
        }
        Ok(())
    }

    /// Settings plus whether the file on disk needs rewriting.
    fn parse_validate_and_clean(&self, content: &str) -> ConfigResult<(Settings, bool)> {
        let doc: DocumentMut = content.parse()?;

        // Missing fields take their defaults here.
        let settings: Settings = toml::from_str(content)?;

        let has_unknown = doc
            .iter()
            .any(|(key, _)| !valid_sections().contains(&key));

        let has_missing = ConfigSection::ALL
            .iter()
            .any(|section| !doc.contains_key(section.table_name()));

        Ok((settings, has_unknown || has_missing))
    }

    /// Write every section.
    pub fn save(&self) -> ConfigResult<()> {
        let content = self.render_with_comments()?;
        self.atomic_write(&content)?;
        Ok(())
    }

    /// Rewrite one table of the file on disk from the in-memory settings.
    ///
    /// Other tables keep their on-disk content and comments.
    pub fn update_section(&mut self, section: ConfigSection) -> ConfigResult<()> {
        let current_content = if self.config_path.exists() {
            fs::read_to_string(&self.config_path)?
        } else {
            String::new()
        };

        let mut doc: DocumentMut = if current_content.is_empty() {
            DocumentMut::new()
        } else {
            current_content.parse()?
        };

        let section_doc: DocumentMut = self.section_toml(section)?.parse()?;
        let section_table = section_doc.as_table().clone();

        doc[section.table_name()] = Item::Table(section_table);

        self.atomic_write(&doc.to_string())?;

        Ok(())
    }

    /// Serialize one section's fields (without the table header).
    fn section_toml(&self, section: ConfigSection) -> ConfigResult<String> {
        let content = match section {
            ConfigSection::Paths => toml::to_string_pretty(&self.settings.paths)?,
            ConfigSection::Project => toml::to_string_pretty(&self.settings.project)?,
            ConfigSection::Bins => toml::to_string_pretty(&self.settings.bins)?,
            ConfigSection::Sequences => toml::to_string_pretty(&self.settings.sequences)?,
            ConfigSection::Logging => toml::to_string_pretty(&self.settings.logging)?,
        };
        Ok(content)
    }

    fn render_with_comments(&self) -> ConfigResult<String> {
        let mut output = String::new();

        output.push_str("# Project automation configuration\n");
        output.push_str(
            "# This file is auto-generated. Comments may be preserved on section updates.\n",
        );

        for section in ConfigSection::ALL {
            output.push('\n');
            output.push_str(&format!("# {}\n", section.description()));
            output.push_str(&format!("[{}]\n", section.table_name()));
            for line in self.section_toml(section)?.lines() {
                output.push_str(line);
                output.push('\n');
            }
        }

        Ok(output)
    }

    fn atomic_write(&self, content: &str) -> io::Result<()> {
        if let Some(parent) = self.config_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        // Same directory as the target so the rename stays atomic.
        let temp_path = self.config_path.with_extension("toml.tmp");

        {
            let mut file = fs::File::create(&temp_path)?;
            file.write_all(content.as_bytes())?;
            file.sync_all()?;
        }

        fs::rename(&temp_path, &self.config_path)?;

        Ok(())
    }
}

fn valid_sections() -> Vec<&'static str> {
    ConfigSection::ALL.iter().map(|s| s.table_name()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{OnExistingProject, OnExistingSequence};
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn load_or_create_creates_default() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join(".config").join("autoproj.toml");

        let mut manager = ConfigManager::new(&config_path);
        manager.load_or_create().unwrap();

        assert!(config_path.exists());
        let content = fs::read_to_string(&config_path).unwrap();
        for section in ConfigSection::ALL {
            assert!(content.contains(&format!("[{}]", section.table_name())));
        }

        // The generated file parses back to the defaults.
        let mut reloaded = ConfigManager::new(&config_path);
        reloaded.load().unwrap();
        assert_eq!(reloaded.settings().bins.master_name, "Master Bin");
    }

    #[test]
    fn load_or_create_preserves_existing() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("autoproj.toml");

        fs::write(
            &config_path,
            "[paths]\nvideo_folder = \"raw/videos\"\n\n[project]\non_existing = \"overwrite\"\n",
        )
        .unwrap();

        let mut manager = ConfigManager::new(&config_path);
        manager.load_or_create().unwrap();

        assert_eq!(manager.settings().paths.video_folder, "raw/videos");
        assert_eq!(
            manager.settings().project.on_existing,
            OnExistingProject::Overwrite
        );

        // Missing sections were filled in on disk.
        let content = fs::read_to_string(&config_path).unwrap();
        assert!(content.contains("[sequences]"));
        assert!(content.contains("raw/videos"));
    }

    #[test]
    fn unknown_sections_are_dropped() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("autoproj.toml");
        fs::write(&config_path, "[analysis]\nchunk_count = 10\n").unwrap();

        let mut manager = ConfigManager::new(&config_path);
        manager.load_or_create().unwrap();

        let content = fs::read_to_string(&config_path).unwrap();
        assert!(!content.contains("[analysis]"));
    }

    #[test]
    fn update_section_only_changes_target() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("autoproj.toml");

        let mut manager = ConfigManager::new(&config_path);
        manager.load_or_create().unwrap();

        manager.settings_mut().sequences.on_existing = OnExistingSequence::Replace;
        manager.settings_mut().paths.video_folder = "in-memory-only".to_string();
        manager.update_section(ConfigSection::Sequences).unwrap();

        let content = fs::read_to_string(&config_path).unwrap();
        assert!(content.contains("on_existing = \"replace\""));
        assert!(!content.contains("in-memory-only"));
        assert!(content.contains("[paths]"));
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempdir().unwrap();
        let mut manager = ConfigManager::new(dir.path().join("absent.toml"));
        assert!(matches!(manager.load(), Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn atomic_write_creates_no_temp_on_success() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("autoproj.toml");

        let mut manager = ConfigManager::new(&config_path);
        manager.load_or_create().unwrap();

        let temp_path = config_path.with_extension("toml.tmp");
        assert!(!temp_path.exists());
    }
}
