//! Track shifting ahead of an insertion.
//!
//! Making room for a clip at time `t` with duration `d` moves every clip that
//! starts at or after `t`, on every video and audio track, forward by `d`.
//! Clips starting before `t` are untouched.
//!
//! The set of clips to move is taken as a snapshot before anything is
//! mutated, so a clip that has already been moved is never evaluated (and
//! moved) a second time.

use super::layout::{ClipId, TrackKind, TrackLayout};
use super::ticks::Ticks;

/// A single planned clip move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClipMove {
    pub kind: TrackKind,
    pub track: usize,
    pub clip: ClipId,
    pub from: Ticks,
    pub to: Ticks,
}

/// Plan the moves that open a gap of `by` at `at`.
///
/// Moves are returned latest-start first. Applied in that order, no
/// intermediate placement collides with a clip that has not moved yet.
pub fn plan_shift(layout: &TrackLayout, at: Ticks, by: Ticks) -> Vec<ClipMove> {
    if by <= Ticks::ZERO {
        return Vec::new();
    }

    let mut moves: Vec<ClipMove> = layout
        .tracks()
        .flat_map(move |track| {
            track
                .clips
                .iter()
                .filter(move |clip| clip.start >= at)
                .map(move |clip| ClipMove {
                    kind: track.kind,
                    track: track.index,
                    clip: clip.id,
                    from: clip.start,
                    to: clip.start + by,
                })
        })
        .collect();

    moves.sort_by(|a, b| b.from.cmp(&a.from).then(b.clip.cmp(&a.clip)));

    tracing::debug!(
        "Planned shift of {} clips at {} by {}",
        moves.len(),
        at,
        by
    );

    moves
}

/// Apply planned moves to an in-memory layout and restore track order.
///
/// Moves whose clip is no longer at `from` are ignored.
pub fn apply_shift(layout: &mut TrackLayout, moves: &[ClipMove]) {
    for mv in moves {
        if let Some(track) = layout.track_mut(mv.kind, mv.track) {
            if let Some(clip) = track
                .clips
                .iter_mut()
                .find(|c| c.id == mv.clip && c.start == mv.from)
            {
                clip.start = mv.to;
            }
        }
    }

    for track in layout.video.iter_mut().chain(layout.audio.iter_mut()) {
        track.sort();
    }
}

/// Plan and apply in one step.
pub fn shift_layout(layout: &mut TrackLayout, at: Ticks, by: Ticks) -> usize {
    let moves = plan_shift(layout, at, by);
    apply_shift(layout, &moves);
    moves.len()
}
