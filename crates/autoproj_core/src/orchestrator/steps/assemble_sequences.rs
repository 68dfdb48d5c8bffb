//! Assemble Sequences step - phase 2 of the run.
//!
//! Re-finds every section bin by name and builds each manifest entry as
//! `[start slide, video, end slide]`. Every entry gets exactly one
//! [`SequenceOutcome`]; a failing entry never stops its siblings.

use std::collections::HashSet;

use crate::assembler::{clip_name, AssembleError, TimelineAssembler};
use crate::assets::asset_path;
use crate::bins::{find_child, BinOrganizer, ProjectBins};
use crate::config::OnExistingSequence;
use crate::host::{HostProject, ItemHandle, ProjectItemKind};
use crate::manifest::{Section, SequenceSpec};
use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, RunState, SequenceOutcome, SequenceStatus, StepOutcome};

/// Builds every sequence named in the manifest.
pub struct AssembleSequencesStep;

impl AssembleSequencesStep {
    pub fn new() -> Self {
        Self
    }

    /// Decide what to do with one entry and do it.
    ///
    /// Under the replace policy the existing sequence is removed only after
    /// its replacement was built, so a failed rebuild keeps the old one.
    fn process_spec(
        ctx: &Context,
        host: &mut dyn HostProject,
        state: &RunState,
        assembler: &TimelineAssembler<'_>,
        bins: &ProjectBins,
        section_bin: ItemHandle,
        spec: &SequenceSpec,
    ) -> (SequenceStatus, Option<ItemHandle>) {
        let logger = &ctx.logger;
        let name = &spec.sequence_name;

        let replacing = match find_child(host, section_bin, name, ProjectItemKind::Sequence) {
            Ok(Some(existing)) => match ctx.settings.sequences.on_existing {
                OnExistingSequence::Skip => {
                    logger.info(&format!(
                        "Sequence '{}' already exists. Skipping.",
                        name
                    ));
                    return (SequenceStatus::Skipped("already exists".to_string()), None);
                }
                OnExistingSequence::Replace => Some(existing),
            },
            Ok(None) => None,
            Err(e) => {
                logger.error(&format!("Error finding sequence '{}': {}", name, e));
                return (SequenceStatus::Failed(e.to_string()), None);
            }
        };

        // Phase 1 already reported the cause.
        if let Some(reason) = Self::unusable_reference(ctx, state, spec) {
            let kept = if replacing.is_some() {
                " Existing sequence kept."
            } else {
                ""
            };
            logger.info(&format!("Skipping sequence '{}': {}.{}", name, reason, kept));
            return (SequenceStatus::Skipped(reason), None);
        }

        logger.info(&format!("Creating sequence: {}", name));
        let built = match assembler.build_sequence(host, spec, bins, section_bin) {
            Ok(built) => built,
            Err(e @ AssembleError::ResourceMissing { .. }) => {
                logger.warn(&format!("Failed to create sequence '{}': {}", name, e));
                return (SequenceStatus::Skipped(e.to_string()), None);
            }
            Err(e) => {
                logger.error(&format!("Error processing sequence '{}': {}", name, e));
                return (SequenceStatus::Failed(e.to_string()), None);
            }
        };

        if let Some(old) = replacing {
            if let Err(e) = host.remove_item(old) {
                logger.error(&format!(
                    "Error removing existing sequence '{}': {}",
                    name, e
                ));
                if let Err(cleanup) = host.remove_item(built.sequence) {
                    tracing::warn!("Could not remove new sequence '{}': {}", name, cleanup);
                }
                return (SequenceStatus::Failed(e.to_string()), None);
            }
            logger.info(&format!("Replaced existing sequence '{}'.", name));
        }

        if built.missing_slides.is_empty() {
            logger.success(&format!("Sequence '{}' created successfully.", name));
            return (
                SequenceStatus::Built {
                    clips: built.clips,
                    duration: built.duration,
                },
                Some(built.sequence),
            );
        }

        let slide_root = ctx.settings.slide_folder();
        for slide in [&spec.start_slide, &spec.end_slide] {
            if !built.missing_slides.contains(&clip_name(slide)) {
                continue;
            }
            let message = format!(
                "Clip '{}' not found in bin '{}'. Sequence '{}' built without it.",
                clip_name(slide),
                ctx.settings.bins.slides_name,
                name
            );
            if state.is_unavailable(&asset_path(slide, &slide_root)) {
                logger.info(&message);
            } else {
                logger.warn(&message);
            }
        }
        (
            SequenceStatus::Partial {
                clips: built.clips,
                duration: built.duration,
                missing_slides: built.missing_slides,
            },
            Some(built.sequence),
        )
    }

    /// Why the entry cannot be built from what phase 1 imported, if so.
    fn unusable_reference(
        ctx: &Context,
        state: &RunState,
        spec: &SequenceSpec,
    ) -> Option<String> {
        let video_root = ctx.settings.video_folder();
        let slide_root = ctx.settings.slide_folder();
        let references = [
            (&spec.video, &video_root),
            (&spec.start_slide, &slide_root),
            (&spec.end_slide, &slide_root),
        ];

        let clashing = references
            .into_iter()
            .find(|(reference, root)| state.name_clashes.contains(&asset_path(reference, root)));
        if let Some((reference, _)) = clashing {
            return Some(format!(
                "clip name '{}' of '{}' is used by another file",
                clip_name(reference),
                reference
            ));
        }

        if state.is_unavailable(&asset_path(&spec.video, &video_root)) {
            return Some(format!("video '{}' not imported", spec.video));
        }
        None
    }

    /// Record every entry of a section that could not be processed.
    fn skip_section(section: &Section, reason: &str, outcomes: &mut Vec<SequenceOutcome>) {
        outcomes.extend(section.sequences.iter().map(|spec| SequenceOutcome {
            section: section.name.clone(),
            sequence_name: spec.sequence_name.clone(),
            status: SequenceStatus::Skipped(reason.to_string()),
            sequence: None,
        }));
    }
}

impl Default for AssembleSequencesStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for AssembleSequencesStep {
    fn name(&self) -> &str {
        "Assemble Sequences"
    }

    fn description(&self) -> &str {
        "Build one sequence per manifest entry"
    }

    fn validate_input(&self, _ctx: &Context, state: &RunState) -> StepResult<()> {
        if state.manifest.is_none() {
            return Err(StepError::invalid_input("No manifest loaded"));
        }
        if state.video_import.is_none() || state.slide_import.is_none() {
            return Err(StepError::invalid_input("Media has not been imported"));
        }
        Ok(())
    }

    fn execute(
        &self,
        ctx: &Context,
        host: &mut dyn HostProject,
        state: &mut RunState,
    ) -> StepResult<StepOutcome> {
        let manifest = state
            .manifest
            .clone()
            .ok_or_else(|| StepError::precondition_failed("Manifest required"))?;

        // Handles from phase 1 are not reused; everything is found again by name.
        let organizer = BinOrganizer::new(&ctx.logger);
        let bins = organizer.locate_hierarchy(host, &ctx.settings.bins)?;
        let assembler =
            TimelineAssembler::new(&ctx.logger, &ctx.settings.bins, &ctx.settings.sequences);

        let mut outcomes = Vec::with_capacity(manifest.sequence_count());
        let mut used_names: HashSet<&str> = HashSet::new();

        for section in &manifest.sections {
            ctx.logger
                .section(&format!("Section: {}", section.name));

            let section_bin = match organizer.find_bin(host, &section.name, bins.sequences) {
                Some(bin) => bin,
                None => {
                    let message = format!("Section bin '{}' not found. Skipping.", section.name);
                    if state.failed_sections.contains(&section.name) {
                        ctx.logger.info(&message);
                    } else {
                        ctx.logger.warn(&message);
                    }
                    Self::skip_section(section, "section bin unavailable", &mut outcomes);
                    continue;
                }
            };

            for spec in &section.sequences {
                let (status, sequence) = if used_names.insert(&spec.sequence_name) {
                    Self::process_spec(ctx, host, state, &assembler, &bins, section_bin, spec)
                } else {
                    ctx.logger.warn(&format!(
                        "Duplicate sequence name '{}' in manifest. Skipping.",
                        spec.sequence_name
                    ));
                    (
                        SequenceStatus::Skipped("duplicate sequence name".to_string()),
                        None,
                    )
                };

                outcomes.push(SequenceOutcome {
                    section: section.name.clone(),
                    sequence_name: spec.sequence_name.clone(),
                    status,
                    sequence,
                });
            }
        }

        let built = outcomes.iter().filter(|o| o.status.is_built()).count();
        ctx.logger.info(&format!(
            "Assembled {} of {} sequences",
            built,
            outcomes.len()
        ));

        state.outcomes = outcomes;
        Ok(StepOutcome::Success)
    }

    fn validate_output(
        &self,
        _ctx: &Context,
        host: &dyn HostProject,
        state: &RunState,
    ) -> StepResult<()> {
        let expected = state
            .manifest
            .as_ref()
            .map(|m| m.sequence_count())
            .unwrap_or(0);
        if state.outcomes.len() != expected {
            return Err(StepError::invalid_output(format!(
                "{} outcomes recorded for {} manifest entries",
                state.outcomes.len(),
                expected
            )));
        }

        for outcome in &state.outcomes {
            let Some(sequence) = outcome.sequence else {
                continue;
            };
            let layout = host
                .track_layout(sequence)
                .map_err(|e| StepError::host("Reading sequence layout", e))?;
            layout.check().map_err(|e| {
                StepError::invalid_output(format!(
                    "Sequence '{}' has an invalid layout: {}",
                    outcome.sequence_name, e
                ))
            })?;
        }
        Ok(())
    }
}
