//! Track and clip placement types.
//!
//! A sequence is a set of video tracks and audio tracks. Each track holds
//! its clips ordered by start time, and no two clips on a track may overlap.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::ticks::Ticks;

/// Opaque identifier of a clip placed on a sequence track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClipId(pub u64);

impl fmt::Display for ClipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "clip#{}", self.0)
    }
}

/// Kind of sequence track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    Video,
    Audio,
}

impl fmt::Display for TrackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackKind::Video => write!(f, "video"),
            TrackKind::Audio => write!(f, "audio"),
        }
    }
}

/// A clip occupying `[start, start + duration)` on a track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClipPlacement {
    pub id: ClipId,
    /// Name of the project item the clip was made from.
    pub name: String,
    pub start: Ticks,
    pub duration: Ticks,
}

impl ClipPlacement {
    pub fn end(&self) -> Ticks {
        self.start + self.duration
    }

    /// Whether the half-open spans of two clips intersect.
    pub fn overlaps(&self, start: Ticks, duration: Ticks) -> bool {
        let end = start + duration;
        self.start < end && start < self.end()
    }
}

/// One track of a sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub kind: TrackKind,
    pub index: usize,
    #[serde(default)]
    pub clips: Vec<ClipPlacement>,
}

impl Track {
    pub fn new(kind: TrackKind, index: usize) -> Self {
        Self {
            kind,
            index,
            clips: Vec::new(),
        }
    }

    /// End of the last clip, or zero for an empty track.
    pub fn end(&self) -> Ticks {
        self.clips
            .iter()
            .map(ClipPlacement::end)
            .max()
            .unwrap_or(Ticks::ZERO)
    }

    /// Find a clip (other than `ignore`) that would collide with the span.
    pub fn collision(
        &self,
        start: Ticks,
        duration: Ticks,
        ignore: Option<ClipId>,
    ) -> Option<&ClipPlacement> {
        self.clips
            .iter()
            .filter(|c| Some(c.id) != ignore)
            .find(|c| c.overlaps(start, duration))
    }

    /// Restore start-time order after a mutation.
    pub fn sort(&mut self) {
        self.clips.sort_by_key(|c| (c.start, c.id));
    }

    /// Check the per-track invariant: sorted by start, no overlaps.
    pub fn check(&self) -> Result<(), LayoutViolation> {
        for pair in self.clips.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            if b.start < a.start {
                return Err(LayoutViolation::Unsorted {
                    kind: self.kind,
                    track: self.index,
                });
            }
            if a.end() > b.start {
                return Err(LayoutViolation::Overlap {
                    kind: self.kind,
                    track: self.index,
                    first: a.id,
                    second: b.id,
                });
            }
        }
        Ok(())
    }
}

/// All tracks of one sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackLayout {
    pub video: Vec<Track>,
    pub audio: Vec<Track>,
}

impl TrackLayout {
    /// Layout with the given number of empty video and audio tracks.
    pub fn with_tracks(video: usize, audio: usize) -> Self {
        Self {
            video: (0..video).map(|i| Track::new(TrackKind::Video, i)).collect(),
            audio: (0..audio).map(|i| Track::new(TrackKind::Audio, i)).collect(),
        }
    }

    pub fn track(&self, kind: TrackKind, index: usize) -> Option<&Track> {
        match kind {
            TrackKind::Video => self.video.get(index),
            TrackKind::Audio => self.audio.get(index),
        }
    }

    pub fn track_mut(&mut self, kind: TrackKind, index: usize) -> Option<&mut Track> {
        match kind {
            TrackKind::Video => self.video.get_mut(index),
            TrackKind::Audio => self.audio.get_mut(index),
        }
    }

    /// Video tracks followed by audio tracks.
    pub fn tracks(&self) -> impl Iterator<Item = &Track> {
        self.video.iter().chain(self.audio.iter())
    }

    /// Locate a clip by id: (kind, track index, placement).
    pub fn find_clip(&self, id: ClipId) -> Option<(TrackKind, usize, &ClipPlacement)> {
        self.tracks().find_map(|t| {
            t.clips
                .iter()
                .find(|c| c.id == id)
                .map(|c| (t.kind, t.index, c))
        })
    }

    /// Total duration: the latest clip end on any track.
    pub fn end(&self) -> Ticks {
        self.tracks().map(Track::end).max().unwrap_or(Ticks::ZERO)
    }

    pub fn clip_count(&self) -> usize {
        self.tracks().map(|t| t.clips.len()).sum()
    }

    /// Check every track's invariant.
    pub fn check(&self) -> Result<(), LayoutViolation> {
        self.tracks().try_for_each(Track::check)
    }
}

/// A broken track invariant.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutViolation {
    #[error("{kind} track {track} is not sorted by start time")]
    Unsorted { kind: TrackKind, track: usize },

    #[error("{kind} track {track}: {first} overlaps {second}")]
    Overlap {
        kind: TrackKind,
        track: usize,
        first: ClipId,
        second: ClipId,
    },
}
