//! Creation and lookup of the fixed bin hierarchy.
//!
//! ```text
//! Root
//! └── Master Bin
//!     ├── Videos
//!     ├── Slides
//!     └── Sequences
//!         └── <one bin per manifest section>
//! ```
//!
//! Lookups are always by name with a first-match tie-break: when several
//! bins share a name, the first one in host iteration order wins.

use thiserror::Error;

use crate::config::BinSettings;
use crate::host::{HostProject, HostResult, ItemHandle, ProjectItemKind};
use crate::logging::RunLogger;

/// Handles to the four fixed bins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectBins {
    pub master: ItemHandle,
    pub videos: ItemHandle,
    pub slides: ItemHandle,
    pub sequences: ItemHandle,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BinError {
    #[error("Bin '{name}' could not be found or created")]
    Unavailable { name: String },

    #[error("Project root is unavailable: {0}")]
    Root(String),
}

/// First direct child of `parent` with the given name and kind.
pub fn find_child(
    host: &dyn HostProject,
    parent: ItemHandle,
    name: &str,
    kind: ProjectItemKind,
) -> HostResult<Option<ItemHandle>> {
    Ok(host
        .children(parent)?
        .into_iter()
        .find(|item| item.kind == kind && item.name == name)
        .map(|item| item.handle))
}

/// Bin operations that report failures to the run log.
pub struct BinOrganizer<'a> {
    logger: &'a RunLogger,
}

impl<'a> BinOrganizer<'a> {
    pub fn new(logger: &'a RunLogger) -> Self {
        Self { logger }
    }

    /// Create a bin under `parent` and tag it with `color_label`.
    ///
    /// Always creates; callers wanting idempotence use
    /// [`find_or_create`](Self::find_or_create). Returns `None` if the host
    /// refuses the bin.
    pub fn ensure_bin(
        &self,
        host: &mut dyn HostProject,
        name: &str,
        color_label: u8,
        parent: ItemHandle,
    ) -> Option<ItemHandle> {
        let bin = match host.create_bin(parent, name) {
            Ok(bin) => bin,
            Err(e) => {
                self.logger
                    .error(&format!("Error creating bin '{}': {}", name, e));
                return None;
            }
        };

        // The label is cosmetic; the bin stays usable without it.
        if let Err(e) = host.set_color_label(bin, color_label) {
            self.logger
                .error(&format!("Error setting color of bin '{}': {}", name, e));
        }

        self.logger.success(&format!("Created bin: {}", name));
        Some(bin)
    }

    /// First bin named `name` directly under `parent`.
    pub fn find_bin(
        &self,
        host: &dyn HostProject,
        name: &str,
        parent: ItemHandle,
    ) -> Option<ItemHandle> {
        match find_child(host, parent, name, ProjectItemKind::Bin) {
            Ok(found) => found,
            Err(e) => {
                self.logger
                    .error(&format!("Error finding bin '{}': {}", name, e));
                None
            }
        }
    }

    /// Reuse an existing bin or create it.
    pub fn find_or_create(
        &self,
        host: &mut dyn HostProject,
        name: &str,
        color_label: u8,
        parent: ItemHandle,
    ) -> Option<ItemHandle> {
        if let Some(bin) = self.find_bin(host, name, parent) {
            self.logger.info(&format!("Using existing bin: {}", name));
            return Some(bin);
        }
        self.ensure_bin(host, name, color_label, parent)
    }

    /// Find or create the four fixed bins.
    pub fn setup_hierarchy(
        &self,
        host: &mut dyn HostProject,
        settings: &BinSettings,
    ) -> Result<ProjectBins, BinError> {
        let root = host
            .root_item()
            .map_err(|e| BinError::Root(e.to_string()))?;

        let master = self
            .find_or_create(host, &settings.master_name, settings.master_color, root)
            .ok_or_else(|| unavailable(&settings.master_name))?;

        let mut child = |name: &str| {
            self.find_or_create(host, name, settings.group_color, master)
                .ok_or_else(|| unavailable(name))
        };

        Ok(ProjectBins {
            master,
            videos: child(&settings.videos_name)?,
            slides: child(&settings.slides_name)?,
            sequences: child(&settings.sequences_name)?,
        })
    }

    /// Re-resolve the four fixed bins by name without creating anything.
    pub fn locate_hierarchy(
        &self,
        host: &dyn HostProject,
        settings: &BinSettings,
    ) -> Result<ProjectBins, BinError> {
        let root = host
            .root_item()
            .map_err(|e| BinError::Root(e.to_string()))?;
        let find = |name: &str, parent: ItemHandle| {
            self.find_bin(host, name, parent)
                .ok_or_else(|| unavailable(name))
        };

        let master = find(&settings.master_name, root)?;
        Ok(ProjectBins {
            master,
            videos: find(&settings.videos_name, master)?,
            slides: find(&settings.slides_name, master)?,
            sequences: find(&settings.sequences_name, master)?,
        })
    }
}

fn unavailable(name: &str) -> BinError {
    BinError::Unavailable {
        name: name.to_string(),
    }
}
