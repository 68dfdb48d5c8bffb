//! Project bin hierarchy.

mod organizer;

pub use organizer::{find_child, BinError, BinOrganizer, ProjectBins};
