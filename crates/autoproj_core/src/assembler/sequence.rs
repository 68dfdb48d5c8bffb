//! Sequence assembly: source video framed by a start and an end slide.

use std::path::Path;

use super::errors::AssembleError;
use super::position::InsertPosition;
use crate::bins::{find_child, ProjectBins};
use crate::config::{BinSettings, SequenceSettings};
use crate::host::{HostProject, HostResult, ItemHandle, ProjectItemKind};
use crate::logging::RunLogger;
use crate::manifest::SequenceSpec;
use crate::timeline::{plan_shift, Ticks, TrackKind};

/// A sequence that was created, possibly without some slides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltSequence {
    pub sequence: ItemHandle,
    /// Clips on all video tracks.
    pub clips: usize,
    pub duration: Ticks,
    /// Slides that were not in the slide bin.
    pub missing_slides: Vec<String>,
}

/// First clip item named `name` directly in `bin`.
pub fn find_clip_by_name(
    host: &dyn HostProject,
    name: &str,
    bin: ItemHandle,
) -> HostResult<Option<ItemHandle>> {
    find_child(host, bin, name, ProjectItemKind::Clip)
}

/// Name under which the host lists an imported asset.
pub fn clip_name(reference: &str) -> String {
    Path::new(reference)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| reference.to_string())
}

/// Builds sequences and inserts clips into them.
pub struct TimelineAssembler<'a> {
    logger: &'a RunLogger,
    bins: &'a BinSettings,
    video_track: usize,
    audio_track: usize,
}

impl<'a> TimelineAssembler<'a> {
    pub fn new(logger: &'a RunLogger, bins: &'a BinSettings, sequences: &SequenceSettings) -> Self {
        Self {
            logger,
            bins,
            video_track: sequences.video_track,
            audio_track: sequences.audio_track,
        }
    }

    /// Create `spec.sequence_name` in `section_bin` as
    /// `[start slide, video, end slide]`.
    ///
    /// A missing video fails the build. A missing slide is left out and
    /// reported in [`BuiltSequence::missing_slides`]. If an insertion fails
    /// after the sequence was created, the half-built sequence is removed.
    pub fn build_sequence(
        &self,
        host: &mut dyn HostProject,
        spec: &SequenceSpec,
        bins: &ProjectBins,
        section_bin: ItemHandle,
    ) -> Result<BuiltSequence, AssembleError> {
        let video_name = clip_name(&spec.video);
        let video = find_clip_by_name(host, &video_name, bins.videos)
            .map_err(|e| AssembleError::host(format!("Finding clip '{}'", video_name), e))?
            .ok_or_else(|| AssembleError::missing("Clip", &video_name, &self.bins.videos_name))?;

        let sequence = host
            .create_sequence_from_clips(&spec.sequence_name, &[video], section_bin)
            .map_err(|e| {
                AssembleError::host(format!("Creating sequence '{}'", spec.sequence_name), e)
            })?;
        self.logger
            .success(&format!("Created sequence: {}", spec.sequence_name));

        match self.frame_with_slides(host, sequence, spec, bins) {
            Ok(built) => Ok(built),
            Err(e) => {
                if let Err(cleanup) = host.remove_item(sequence) {
                    tracing::warn!(
                        "Could not remove incomplete sequence '{}': {}",
                        spec.sequence_name,
                        cleanup
                    );
                }
                Err(e)
            }
        }
    }

    fn frame_with_slides(
        &self,
        host: &mut dyn HostProject,
        sequence: ItemHandle,
        spec: &SequenceSpec,
        bins: &ProjectBins,
    ) -> Result<BuiltSequence, AssembleError> {
        let mut missing_slides = Vec::new();

        for (slide, position) in [
            (&spec.start_slide, InsertPosition::Before),
            (&spec.end_slide, InsertPosition::End),
        ] {
            self.logger.info(&format!(
                "Inserting {} slide: {}",
                if position == InsertPosition::Before { "start" } else { "end" },
                slide
            ));
            match self.insert_slide(host, sequence, slide, bins.slides, Ticks::ZERO, position) {
                Ok(_) => {}
                Err(AssembleError::ResourceMissing { name, .. }) => missing_slides.push(name),
                Err(e) => return Err(e),
            }
        }

        let layout = host
            .track_layout(sequence)
            .map_err(|e| AssembleError::host("Reading sequence layout", e))?;

        Ok(BuiltSequence {
            sequence,
            clips: layout.video.iter().map(|t| t.clips.len()).sum(),
            duration: layout.end(),
            missing_slides,
        })
    }

    /// Look up a slide by name in `bin` and insert it.
    pub fn insert_slide(
        &self,
        host: &mut dyn HostProject,
        sequence: ItemHandle,
        slide: &str,
        bin: ItemHandle,
        insert_at: Ticks,
        position: InsertPosition,
    ) -> Result<Ticks, AssembleError> {
        let name = clip_name(slide);
        let item = find_clip_by_name(host, &name, bin)
            .map_err(|e| AssembleError::host(format!("Finding clip '{}'", name), e))?
            .ok_or_else(|| AssembleError::missing("Clip", &name, &self.bins.slides_name))?;

        let placed = self.insert_item(host, sequence, item, insert_at, position)?;
        self.logger.success(&format!(
            "Inserted clip '{}' {} position at {:.3} seconds.",
            name,
            position,
            placed.as_secs_f64()
        ));
        Ok(placed)
    }

    /// Insert `item` relative to `insert_at` and return where it landed.
    ///
    /// For [`InsertPosition::Before`] every clip starting at or after
    /// `insert_at`, on all tracks, is moved forward by the item's duration
    /// first. The moves are computed from one snapshot of the layout and
    /// applied latest-first.
    pub fn insert_item(
        &self,
        host: &mut dyn HostProject,
        sequence: ItemHandle,
        item: ItemHandle,
        insert_at: Ticks,
        position: InsertPosition,
    ) -> Result<Ticks, AssembleError> {
        let duration = host
            .media_duration(item)
            .map_err(|e| AssembleError::host("Reading clip duration", e))?;

        let target = match position {
            InsertPosition::Before => {
                self.shift_all_tracks(host, sequence, insert_at, duration)?;
                insert_at
            }
            InsertPosition::After => insert_at + duration,
            InsertPosition::End => host
                .sequence_end(sequence)
                .map_err(|e| AssembleError::host("Reading sequence end", e))?,
        };

        host.insert_clip(sequence, item, target, self.video_track, self.audio_track)
            .map_err(|e| AssembleError::host("Inserting clip", e))?;
        Ok(target)
    }

    /// Move every clip starting at or after `at` forward by `by`.
    pub fn shift_all_tracks(
        &self,
        host: &mut dyn HostProject,
        sequence: ItemHandle,
        at: Ticks,
        by: Ticks,
    ) -> Result<usize, AssembleError> {
        let layout = host
            .track_layout(sequence)
            .map_err(|e| AssembleError::host("Reading sequence layout", e))?;
        let moves = plan_shift(&layout, at, by);

        for mv in &moves {
            host.set_clip_start(sequence, mv.clip, mv.to).map_err(|e| {
                let track = match mv.kind {
                    TrackKind::Video => "video",
                    TrackKind::Audio => "audio",
                };
                AssembleError::host(format!("Shifting clip on {} track {}", track, mv.track), e)
            })?;
        }

        if !moves.is_empty() {
            self.logger.info(&format!(
                "Shifted {} clips after {:.3} seconds by {:.3} seconds.",
                moves.len(),
                at.as_secs_f64(),
                by.as_secs_f64()
            ));
        }
        Ok(moves.len())
    }
}
