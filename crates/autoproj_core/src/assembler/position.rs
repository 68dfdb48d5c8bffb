//! Where an inserted clip lands relative to its reference time.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Insertion policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsertPosition {
    /// At the reference time, after shifting everything from there on
    /// forward by the clip's duration.
    Before,
    /// At the reference time plus the inserted clip's duration, no shift.
    After,
    /// At the current end of the sequence, no shift.
    End,
}

impl InsertPosition {
    pub fn as_str(&self) -> &'static str {
        match self {
            InsertPosition::Before => "before",
            InsertPosition::After => "after",
            InsertPosition::End => "end",
        }
    }
}

impl fmt::Display for InsertPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid position '{0}'. Use 'before', 'after', or 'end'.")]
pub struct InvalidPosition(pub String);

impl FromStr for InsertPosition {
    type Err = InvalidPosition;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "before" => Ok(InsertPosition::Before),
            "after" => Ok(InsertPosition::After),
            "end" => Ok(InsertPosition::End),
            _ => Err(InvalidPosition(s.to_string())),
        }
    }
}
