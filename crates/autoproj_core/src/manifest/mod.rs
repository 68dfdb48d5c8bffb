//! The declarative manifest: sections of sequences to build.
//!
//! A manifest is decoded with `serde_json` into a loose [`serde_json::Value`]
//! first and then checked by [`validate`], so structural problems are
//! reported with their position instead of as a generic decode error.
//!
//! ```json
//! { "sections": [ { "section": "Intro",
//!                   "sequences": [ { "video": "a.mp4", "startSlide": "s1.jpg",
//!                                    "endSlide": "s2.jpg", "sequenceName": "Intro_01" } ] } ] }
//! ```

mod errors;
mod validate;

use std::io;
use std::path::Path;

use serde::Serialize;

pub use errors::{ManifestError, ValidationError};
pub use validate::validate;

use crate::host::FileSystem;

/// A validated manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Manifest {
    pub sections: Vec<Section>,
}

/// A named group of sequences. Gets its own bin under Sequences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    #[serde(rename = "section")]
    pub name: String,
    pub sequences: Vec<SequenceSpec>,
}

/// One sequence to assemble: start slide, video, end slide.
///
/// `video` is relative to the video folder, the slides to the slide folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SequenceSpec {
    pub video: String,
    pub start_slide: String,
    pub end_slide: String,
    pub sequence_name: String,
}

impl Manifest {
    /// Total number of sequence entries across all sections.
    pub fn sequence_count(&self) -> usize {
        self.sections.iter().map(|s| s.sequences.len()).sum()
    }

    /// Every entry with its section, in manifest order.
    pub fn entries(&self) -> impl Iterator<Item = (&Section, &SequenceSpec)> {
        self.sections
            .iter()
            .flat_map(|section| section.sequences.iter().map(move |spec| (section, spec)))
    }
}

/// Decode and validate manifest text.
pub fn parse_manifest(text: &str, path: &Path) -> Result<Manifest, ManifestError> {
    let raw: serde_json::Value =
        serde_json::from_str(text).map_err(|source| ManifestError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    validate(&raw).map_err(|source| ManifestError::Invalid {
        path: path.to_path_buf(),
        source,
    })
}

/// Read, decode and validate the manifest at `path`.
pub fn load_manifest(fs: &dyn FileSystem, path: &Path) -> Result<Manifest, ManifestError> {
    if !fs.exists(path) {
        return Err(ManifestError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let text = fs.read_to_string(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => ManifestError::NotFound {
            path: path.to_path_buf(),
        },
        _ => ManifestError::Read {
            path: path.to_path_buf(),
            source,
        },
    })?;

    let manifest = parse_manifest(&text, path)?;
    tracing::debug!(
        "Loaded manifest {}: {} sections, {} sequences",
        path.display(),
        manifest.sections.len(),
        manifest.sequence_count()
    );
    Ok(manifest)
}
