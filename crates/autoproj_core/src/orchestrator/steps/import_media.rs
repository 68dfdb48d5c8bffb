//! Import Media step - phase 1 of the run.
//!
//! Ensures one bin per manifest section under Sequences, then imports every
//! referenced video and slide with one batch call each. Missing files are
//! reported here, once, and remembered in `RunState` so phase 2 does not
//! report them again.

use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;

use crate::assembler::clip_name;
use crate::assets::{asset_path, BatchImporter, ImportOutcome};
use crate::bins::BinOrganizer;
use crate::host::{HostProject, ItemHandle};
use crate::logging::RunLogger;
use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, RunState, StepOutcome};

/// Creates section bins and batch-imports all referenced media.
pub struct ImportMediaStep;

impl ImportMediaStep {
    pub fn new() -> Self {
        Self
    }

    fn import(
        &self,
        ctx: &Context,
        host: &mut dyn HostProject,
        label: &str,
        paths: Vec<PathBuf>,
        target: ItemHandle,
    ) -> ImportOutcome {
        ctx.logger
            .info(&format!("Importing all {} files in a single batch.", label));
        let outcome = BatchImporter::new(ctx.fs.as_ref()).import_batch(host, paths, target);
        report_outcome(&ctx.logger, &outcome);
        outcome
    }
}

impl Default for ImportMediaStep {
    fn default() -> Self {
        Self::new()
    }
}

/// Keep the first file for each clip name.
///
/// The host lists imported media by file name only, so a later file with
/// the same name could not be told apart. It is left out and recorded in
/// `clashes` with one warning.
fn drop_name_clashes(
    logger: &RunLogger,
    paths: Vec<PathBuf>,
    clashes: &mut BTreeSet<PathBuf>,
) -> Vec<PathBuf> {
    let mut owners: HashMap<String, PathBuf> = HashMap::new();
    let mut kept = Vec::with_capacity(paths.len());

    for path in paths {
        let name = clip_name(&path.to_string_lossy());
        match owners.get(&name) {
            Some(owner) if *owner == path => {}
            Some(owner) => {
                if clashes.insert(path.clone()) {
                    logger.warn(&format!(
                        "Skipping file {}: clip name '{}' is already used by {}.",
                        path.display(),
                        name,
                        owner.display()
                    ));
                }
            }
            None => {
                owners.insert(name, path.clone());
                kept.push(path);
            }
        }
    }
    kept
}

/// One line per imported or missing file, one line for a failed batch.
fn report_outcome(logger: &RunLogger, outcome: &ImportOutcome) {
    for path in &outcome.imported {
        logger.success(&format!("Imported: {}", path.display()));
    }
    for path in &outcome.missing {
        logger.warn(&format!("Missing file: {}", path.display()));
    }
    if let Some(error) = &outcome.error {
        logger.error(&format!(
            "Error importing files ({} not imported): {}",
            outcome.failed.len(),
            error
        ));
    }
}

impl PipelineStep for ImportMediaStep {
    fn name(&self) -> &str {
        "Import Media"
    }

    fn description(&self) -> &str {
        "Create section bins and import videos and slides"
    }

    fn validate_input(&self, _ctx: &Context, state: &RunState) -> StepResult<()> {
        if state.manifest.is_none() {
            return Err(StepError::invalid_input("No manifest loaded"));
        }
        if state.bins.is_none() {
            return Err(StepError::invalid_input("Project bins are not set up"));
        }
        Ok(())
    }

    fn execute(
        &self,
        ctx: &Context,
        host: &mut dyn HostProject,
        state: &mut RunState,
    ) -> StepResult<StepOutcome> {
        let (manifest, bins) = match (state.manifest.as_ref(), state.bins) {
            (Some(manifest), Some(bins)) => (manifest, bins),
            _ => return Err(StepError::precondition_failed("Manifest and bins required")),
        };

        let organizer = BinOrganizer::new(&ctx.logger);
        let video_root = ctx.settings.video_folder();
        let slide_root = ctx.settings.slide_folder();

        let mut videos = Vec::new();
        let mut slides = Vec::new();
        let mut failed_sections = Vec::new();

        for section in &manifest.sections {
            ctx.logger
                .info(&format!("Processing section: {}", section.name));

            let bin = organizer.find_or_create(
                host,
                &section.name,
                ctx.settings.bins.section_color,
                bins.sequences,
            );
            if bin.is_none() {
                // Creation failure was already logged by the organizer.
                ctx.logger.info(&format!(
                    "Skipping section '{}' due to bin creation failure.",
                    section.name
                ));
                failed_sections.push(section.name.clone());
                continue;
            }

            if section.sequences.is_empty() {
                ctx.logger.info(&format!(
                    "No sequences found in section '{}'.",
                    section.name
                ));
            }

            for spec in &section.sequences {
                videos.push(asset_path(&spec.video, &video_root));
                slides.push(asset_path(&spec.start_slide, &slide_root));
                slides.push(asset_path(&spec.end_slide, &slide_root));
            }
        }

        let mut name_clashes = BTreeSet::new();
        let videos = drop_name_clashes(&ctx.logger, videos, &mut name_clashes);
        let slides = drop_name_clashes(&ctx.logger, slides, &mut name_clashes);

        let video_import = self.import(ctx, host, "video", videos, bins.videos);
        let slide_import = self.import(ctx, host, "slide", slides, bins.slides);

        ctx.logger.info(&format!(
            "Imported {}/{} videos and {}/{} slides",
            video_import.imported.len(),
            video_import.total(),
            slide_import.imported.len(),
            slide_import.total()
        ));

        state.failed_sections.extend(failed_sections);
        state.name_clashes = name_clashes;
        state.video_import = Some(video_import);
        state.slide_import = Some(slide_import);
        Ok(StepOutcome::Success)
    }

    fn validate_output(
        &self,
        _ctx: &Context,
        _host: &dyn HostProject,
        state: &RunState,
    ) -> StepResult<()> {
        if state.video_import.is_none() || state.slide_import.is_none() {
            return Err(StepError::invalid_output("Import results were not recorded"));
        }
        Ok(())
    }
}
