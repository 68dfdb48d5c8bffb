//! Sequence timeline model and the track shift algorithm.
//!
//! - `Ticks`: exact integer time in host units
//! - `TrackLayout`: video/audio tracks with ordered, non-overlapping clips
//! - `plan_shift`: snapshot of the clip moves needed before an insertion

mod layout;
mod shift;
mod ticks;

pub use layout::{ClipId, ClipPlacement, LayoutViolation, Track, TrackKind, TrackLayout};
pub use shift::{apply_shift, plan_shift, shift_layout, ClipMove};
pub use ticks::{Ticks, TICKS_PER_SECOND};
