//! Load Manifest step - reads and validates the sequence manifest.
//!
//! Runs before anything touches the host, so a malformed manifest ends the
//! run with zero host calls.

use crate::host::HostProject;
use crate::manifest::load_manifest;
use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, RunState, StepOutcome};

/// Reads the manifest file, decodes it as JSON and validates its structure.
pub struct LoadManifestStep;

impl LoadManifestStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LoadManifestStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for LoadManifestStep {
    fn name(&self) -> &str {
        "Load Manifest"
    }

    fn description(&self) -> &str {
        "Read and validate the sequence manifest"
    }

    fn validate_input(&self, ctx: &Context, _state: &RunState) -> StepResult<()> {
        if ctx.settings.paths.manifest_file.trim().is_empty() {
            return Err(StepError::invalid_input("No manifest file configured"));
        }
        Ok(())
    }

    fn execute(
        &self,
        ctx: &Context,
        _host: &mut dyn HostProject,
        state: &mut RunState,
    ) -> StepResult<StepOutcome> {
        let path = ctx.settings.manifest_file();
        ctx.logger
            .info(&format!("Loading manifest: {}", path.display()));

        let manifest = load_manifest(ctx.fs.as_ref(), &path)?;

        ctx.logger.info(&format!(
            "Manifest has {} sections with {} sequences",
            manifest.sections.len(),
            manifest.sequence_count()
        ));

        state.manifest = Some(manifest);
        Ok(StepOutcome::Success)
    }

    fn validate_output(
        &self,
        _ctx: &Context,
        _host: &dyn HostProject,
        state: &RunState,
    ) -> StepResult<()> {
        if state.manifest.is_none() {
            return Err(StepError::invalid_output("Manifest was not recorded"));
        }
        Ok(())
    }
}
