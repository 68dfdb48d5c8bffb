//! Manifest error types.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Structural problem in a decoded manifest.
///
/// Indices are zero-based positions in the `sections` and `sequences` lists.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("manifest must be a JSON object")]
    NotAnObject,

    #[error("'sections' is missing")]
    MissingSections,

    #[error("'sections' must be a list")]
    SectionsNotList,

    #[error("'sections' is empty")]
    EmptySections,

    #[error("section {section}: must be an object")]
    SectionNotObject { section: usize },

    #[error("section {section}: '{field}' is missing or empty")]
    MissingSectionField { section: usize, field: &'static str },

    #[error("section {section}: '{field}' must be {expected}")]
    InvalidSectionField {
        section: usize,
        field: &'static str,
        expected: &'static str,
    },

    #[error("section {section}, sequence {sequence}: must be an object")]
    SequenceNotObject { section: usize, sequence: usize },

    #[error("section {section}, sequence {sequence}: '{field}' is missing or empty")]
    MissingSequenceField {
        section: usize,
        sequence: usize,
        field: &'static str,
    },

    #[error("section {section}, sequence {sequence}: '{field}' must be a string")]
    InvalidSequenceField {
        section: usize,
        sequence: usize,
        field: &'static str,
    },
}

impl ValidationError {
    /// Name of the offending field, if the error concerns one.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            ValidationError::MissingSections
            | ValidationError::SectionsNotList
            | ValidationError::EmptySections => Some("sections"),
            ValidationError::MissingSectionField { field, .. }
            | ValidationError::InvalidSectionField { field, .. }
            | ValidationError::MissingSequenceField { field, .. }
            | ValidationError::InvalidSequenceField { field, .. } => Some(field),
            ValidationError::NotAnObject
            | ValidationError::SectionNotObject { .. }
            | ValidationError::SequenceNotObject { .. } => None,
        }
    }
}

/// Failure to obtain a validated manifest from disk.
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("Manifest file not found: {}", .path.display())]
    NotFound { path: PathBuf },

    #[error("Failed to read manifest {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse manifest {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid manifest {}: {source}", .path.display())]
    Invalid {
        path: PathBuf,
        #[source]
        source: ValidationError,
    },
}
