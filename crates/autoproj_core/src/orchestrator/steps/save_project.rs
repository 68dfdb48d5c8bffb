//! Save Project step - writes the document back to the project file.

use crate::host::HostProject;
use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, RunState, StepOutcome};

pub struct SaveProjectStep;

impl SaveProjectStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SaveProjectStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for SaveProjectStep {
    fn name(&self) -> &str {
        "Save Project"
    }

    fn description(&self) -> &str {
        "Save the project document"
    }

    fn validate_input(&self, _ctx: &Context, state: &RunState) -> StepResult<()> {
        if state.project.is_none() {
            return Err(StepError::invalid_input("No project document"));
        }
        Ok(())
    }

    fn execute(
        &self,
        ctx: &Context,
        host: &mut dyn HostProject,
        state: &mut RunState,
    ) -> StepResult<StepOutcome> {
        let path = ctx.settings.project_file();
        host.save_document(&path)
            .map_err(|e| StepError::host("Saving project", e))?;

        ctx.logger
            .success(&format!("Project saved: {}", path.display()));
        state.saved_to = Some(path);
        Ok(StepOutcome::Success)
    }

    fn validate_output(
        &self,
        ctx: &Context,
        _host: &dyn HostProject,
        state: &RunState,
    ) -> StepResult<()> {
        match &state.saved_to {
            Some(path) if ctx.fs.exists(path) => Ok(()),
            Some(path) => Err(StepError::invalid_output(format!(
                "Project file {} missing after save",
                path.display()
            ))),
            None => Err(StepError::invalid_output("Save was not recorded")),
        }
    }
}
