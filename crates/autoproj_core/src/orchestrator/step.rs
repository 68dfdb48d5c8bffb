//! Pipeline step trait definition.
//!
//! All pipeline steps implement this trait, providing a consistent
//! interface for validation and execution.

use super::errors::StepResult;
use super::types::{Context, RunState, StepOutcome};
use crate::host::HostProject;

/// Trait for pipeline steps.
///
/// Each step in the pipeline implements this trait. The pipeline runner
/// calls these methods in order:
///
/// 1. `validate_input` - Check preconditions before execution
/// 2. `execute` - Perform the step's work
/// 3. `validate_output` - Verify the step produced valid output
///
/// # Example
///
/// ```ignore
/// struct SaveProjectStep;
///
/// impl PipelineStep for SaveProjectStep {
///     fn name(&self) -> &str { "Save Project" }
///
///     fn validate_input(&self, _ctx: &Context, state: &RunState) -> StepResult<()> {
///         if state.project.is_none() {
///             return Err(StepError::invalid_input("No project document"));
///         }
///         Ok(())
///     }
///
///     fn execute(
///         &self,
///         ctx: &Context,
///         host: &mut dyn HostProject,
///         state: &mut RunState,
///     ) -> StepResult<StepOutcome> {
///         let path = ctx.settings.project_file();
///         host.save_document(&path).map_err(|e| StepError::host("Saving project", e))?;
///         state.saved_to = Some(path);
///         Ok(StepOutcome::Success)
///     }
///
///     fn validate_output(
///         &self,
///         _ctx: &Context,
///         _host: &dyn HostProject,
///         state: &RunState,
///     ) -> StepResult<()> {
///         if state.saved_to.is_none() {
///             return Err(StepError::invalid_output("Save not recorded"));
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait PipelineStep: Send + Sync {
    /// Get the step name (for logging and error context).
    fn name(&self) -> &str;

    /// Validate inputs before execution.
    ///
    /// Called before `execute`. Should check that the earlier steps this
    /// one depends on have recorded their results.
    fn validate_input(&self, ctx: &Context, state: &RunState) -> StepResult<()>;

    /// Execute the step's main work.
    ///
    /// All host calls go through `host`. Results are recorded in `state`,
    /// log lines go to `ctx.logger`.
    ///
    /// Returns `StepOutcome::Success` on completion, or `StepOutcome::Skipped`
    /// if the step determined it should be skipped (not an error).
    fn execute(
        &self,
        ctx: &Context,
        host: &mut dyn HostProject,
        state: &mut RunState,
    ) -> StepResult<StepOutcome>;

    /// Validate outputs after execution.
    ///
    /// Called after `execute` returns `Success`.
    fn validate_output(
        &self,
        ctx: &Context,
        host: &dyn HostProject,
        state: &RunState,
    ) -> StepResult<()>;

    /// Human-readable description of what this step does.
    fn description(&self) -> &str {
        self.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockStep {
        name: &'static str,
        should_skip: bool,
    }

    impl PipelineStep for MockStep {
        fn name(&self) -> &str {
            self.name
        }

        fn validate_input(&self, _ctx: &Context, _state: &RunState) -> StepResult<()> {
            Ok(())
        }

        fn execute(
            &self,
            _ctx: &Context,
            _host: &mut dyn HostProject,
            _state: &mut RunState,
        ) -> StepResult<StepOutcome> {
            if self.should_skip {
                Ok(StepOutcome::Skipped("Test skip".to_string()))
            } else {
                Ok(StepOutcome::Success)
            }
        }

        fn validate_output(
            &self,
            _ctx: &Context,
            _host: &dyn HostProject,
            _state: &RunState,
        ) -> StepResult<()> {
            Ok(())
        }
    }

    #[test]
    fn step_trait_object_works() {
        let step: Box<dyn PipelineStep> = Box::new(MockStep {
            name: "TestStep",
            should_skip: false,
        });

        assert_eq!(step.name(), "TestStep");
        assert_eq!(step.description(), "TestStep");
    }
}
