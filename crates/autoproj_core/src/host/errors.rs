//! Errors raised by host project operations.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use super::types::{ItemHandle, ProjectItemKind};
use crate::timeline::{ClipId, Ticks, TrackKind};

/// A host create/import/insert call failed.
#[derive(Error, Debug)]
pub enum HostError {
    /// An operation needed an open document.
    #[error("No project document is open")]
    NoDocument,

    /// Opening, creating or saving a document failed.
    #[error("Document operation on {} failed: {message}", .path.display())]
    Document { path: PathBuf, message: String },

    /// The handle does not name an item of the open document.
    #[error("Unknown project item {0}")]
    UnknownItem(ItemHandle),

    /// The item exists but has the wrong type for the operation.
    #[error("Project item {item} is a {actual}, expected a {expected}")]
    WrongKind {
        item: ItemHandle,
        expected: ProjectItemKind,
        actual: ProjectItemKind,
    },

    /// A batch import was rejected as a whole.
    #[error("Import failed: {0}")]
    ImportFailed(String),

    /// Media could not be probed.
    #[error("Failed to probe {}: {message}", .path.display())]
    ProbeFailed { path: PathBuf, message: String },

    /// The sequence has no such track.
    #[error("Sequence '{sequence}' has no {kind} track {index}")]
    NoSuchTrack {
        sequence: String,
        kind: TrackKind,
        index: usize,
    },

    /// The clip is not placed in the sequence.
    #[error("Sequence '{sequence}' has no {clip}")]
    UnknownClip { sequence: String, clip: ClipId },

    /// A placement would overlap an existing clip.
    #[error("Placing '{name}' at {at} on {kind} track {track} overlaps '{other}'")]
    Overlap {
        name: String,
        at: Ticks,
        kind: TrackKind,
        track: usize,
        other: String,
    },

    /// The operation is not permitted on this item.
    #[error("{0}")]
    NotPermitted(String),

    /// File I/O error.
    #[error("I/O error in {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: io::Error,
    },
}

impl HostError {
    /// Create a document error.
    pub fn document(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Document {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a wrong-kind error.
    pub fn wrong_kind(item: ItemHandle, expected: ProjectItemKind, actual: ProjectItemKind) -> Self {
        Self::WrongKind {
            item,
            expected,
            actual,
        }
    }

    /// Create a probe error.
    pub fn probe_failed(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::ProbeFailed {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an I/O error with context.
    pub fn io(operation: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            source,
        }
    }
}

/// Result type for host operations.
pub type HostResult<T> = Result<T, HostError>;
