//! Renaming source media according to an old→new name mapping.
//!
//! The mapping is a JSON object of file names inside one folder:
//!
//! ```json
//! { "dns advance.mp4": "Advanced DNS Configuration.mp4" }
//! ```

use std::collections::BTreeMap;
use std::io;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;

use crate::host::FileSystem;

/// Old file name → new file name.
pub type RenameMap = BTreeMap<String, String>;

#[derive(Error, Debug)]
pub enum RenameError {
    #[error("Rename map not found: {}", .path.display())]
    MapNotFound { path: PathBuf },

    #[error("Failed to read rename map {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse rename map {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid rename entry '{from}' -> '{to}': names must be plain file names")]
    InvalidEntry { from: String, to: String },

    #[error("Media folder not found: {}", .path.display())]
    FolderNotFound { path: PathBuf },
}

/// What happened to each mapping entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenameReport {
    pub renamed: Vec<(String, String)>,
    /// Entries whose old and new names are identical.
    pub unchanged: Vec<String>,
    /// Source file not present.
    pub missing: Vec<String>,
    /// Target already exists; nothing was touched.
    pub conflicts: Vec<(String, String)>,
    /// The rename itself failed.
    pub failed: Vec<(String, String)>,
}

impl RenameReport {
    pub fn is_clean(&self) -> bool {
        self.missing.is_empty() && self.conflicts.is_empty() && self.failed.is_empty()
    }
}

/// Read a rename map from a JSON file.
pub fn load_rename_map(fs: &dyn FileSystem, path: &Path) -> Result<RenameMap, RenameError> {
    if !fs.exists(path) {
        return Err(RenameError::MapNotFound {
            path: path.to_path_buf(),
        });
    }
    let text = fs.read_to_string(path).map_err(|source| RenameError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| RenameError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Apply `mapping` to the files in `dir`.
///
/// Entries are processed in name order. Existing files are never
/// overwritten. Every entry is checked before any file is renamed.
pub fn rename_media(
    fs: &dyn FileSystem,
    dir: &Path,
    mapping: &RenameMap,
) -> Result<RenameReport, RenameError> {
    if !fs.exists(dir) {
        return Err(RenameError::FolderNotFound {
            path: dir.to_path_buf(),
        });
    }

    if let Some((from, to)) = mapping
        .iter()
        .find(|(from, to)| !is_plain_name(from) || !is_plain_name(to))
    {
        return Err(RenameError::InvalidEntry {
            from: from.clone(),
            to: to.clone(),
        });
    }

    let mut report = RenameReport::default();

    for (from, to) in mapping {
        if from == to {
            report.unchanged.push(from.clone());
            continue;
        }

        let source = dir.join(from);
        let target = dir.join(to);

        if !fs.exists(&source) {
            tracing::warn!("File '{}' not found, skipping", from);
            report.missing.push(from.clone());
            continue;
        }
        if fs.exists(&target) {
            tracing::warn!("Not renaming '{}': '{}' already exists", from, to);
            report.conflicts.push((from.clone(), to.clone()));
            continue;
        }

        match fs.rename(&source, &target) {
            Ok(()) => {
                tracing::info!("Renamed '{}' to '{}'", from, to);
                report.renamed.push((from.clone(), to.clone()));
            }
            Err(e) => {
                tracing::error!("Failed to rename '{}': {}", from, e);
                report.failed.push((from.clone(), e.to_string()));
            }
        }
    }

    Ok(report)
}

fn is_plain_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}
