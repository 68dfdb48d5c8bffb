//! Handle and item types shared by every host implementation.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::timeline::Ticks;

/// Opaque reference to a node in the host project's item tree.
///
/// Handles are owned by the host. They are only guaranteed to stay valid
/// while the document that produced them remains open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemHandle(pub u64);

impl fmt::Display for ItemHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "item#{}", self.0)
    }
}

/// Type of a project item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectItemKind {
    /// The project root.
    Root,
    /// A container of other items.
    Bin,
    /// An imported media file.
    Clip,
    /// An edited sequence.
    Sequence,
}

impl fmt::Display for ProjectItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectItemKind::Root => write!(f, "root"),
            ProjectItemKind::Bin => write!(f, "bin"),
            ProjectItemKind::Clip => write!(f, "clip"),
            ProjectItemKind::Sequence => write!(f, "sequence"),
        }
    }
}

/// A direct child as listed by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectItem {
    pub handle: ItemHandle,
    pub name: String,
    pub kind: ProjectItemKind,
}

/// Properties reported by a media probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaInfo {
    /// Usable duration (out point minus in point).
    pub duration: Ticks,
    pub has_video: bool,
    pub has_audio: bool,
}

impl MediaInfo {
    /// Video with an audio stream.
    pub fn av(duration: Ticks) -> Self {
        Self {
            duration,
            has_video: true,
            has_audio: true,
        }
    }

    /// Still image: picture only.
    pub fn still(duration: Ticks) -> Self {
        Self {
            duration,
            has_video: true,
            has_audio: false,
        }
    }
}
