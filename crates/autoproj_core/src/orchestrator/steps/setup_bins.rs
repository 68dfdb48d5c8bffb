//! Setup Bins step - finds or creates the fixed bin hierarchy.

use crate::bins::BinOrganizer;
use crate::host::HostProject;
use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, RunState, StepOutcome};

/// Ensures Master Bin with its Videos, Slides and Sequences children.
///
/// Existing bins are reused, so running twice leaves one copy of each.
pub struct SetupBinsStep;

impl SetupBinsStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SetupBinsStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for SetupBinsStep {
    fn name(&self) -> &str {
        "Setup Bins"
    }

    fn description(&self) -> &str {
        "Find or create the project bin hierarchy"
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
        let organizer = BinOrganizer::new(&ctx.logger);
        let bins = organizer.setup_hierarchy(host, &ctx.settings.bins)?;
        state.bins = Some(bins);
        Ok(StepOutcome::Success)
    }

    fn validate_output(
        &self,
        _ctx: &Context,
        _host: &dyn HostProject,
        state: &RunState,
    ) -> StepResult<()> {
        if state.bins.is_none() {
            return Err(StepError::invalid_output("Bins were not recorded"));
        }
        Ok(())
    }
}
