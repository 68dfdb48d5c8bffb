//! Initialize Project step - opens or creates the project document.

use crate::config::OnExistingProject;
use crate::host::HostProject;
use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, ProjectAction, RunState, StepOutcome};

/// Makes the configured project file the open document.
///
/// An already open document is closed first. An existing file is either
/// opened or replaced, depending on `project.on_existing`.
pub struct InitializeProjectStep;

impl InitializeProjectStep {
    pub fn new() -> Self {
        Self
    }

    fn create_new(
        &self,
        ctx: &Context,
        host: &mut dyn HostProject,
        path: &std::path::Path,
    ) -> StepResult<()> {
        host.new_document(path)
            .map_err(|e| StepError::host("Creating project", e))?;
        host.save_document(path)
            .map_err(|e| StepError::host("Saving new project", e))?;

        ctx.logger
            .debug(&format!("New project document at {}", path.display()));
        Ok(())
    }
}

impl Default for InitializeProjectStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for InitializeProjectStep {
    fn name(&self) -> &str {
        "Initialize Project"
    }

    fn description(&self) -> &str {
        "Open or create the project document"
    }

    fn validate_input(&self, _ctx: &Context, state: &RunState) -> StepResult<()> {
        if state.manifest.is_none() {
            return Err(StepError::invalid_input(
                "Manifest must be loaded before the project is touched",
            ));
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

        if host.is_document_open(&path) {
            host.close_document()
                .map_err(|e| StepError::host("Closing project", e))?;
            ctx.logger.info("Closed existing project document.");
        }

        let action = if ctx.fs.exists(&path) {
            match ctx.settings.project.on_existing {
                OnExistingProject::Open => {
                    host.open_document(&path)
                        .map_err(|e| StepError::host("Opening project", e))?;
                    ctx.logger.success("Opened existing project.");
                    ProjectAction::Opened
                }
                OnExistingProject::Overwrite => {
                    ctx.fs
                        .remove_file(&path)
                        .map_err(|e| StepError::io_error("Removing existing project file", e))?;
                    self.create_new(ctx, host, &path)?;
                    ctx.logger
                        .success("Overwritten existing project and created a new one.");
                    ProjectAction::Overwritten
                }
            }
        } else {
            self.create_new(ctx, host, &path)?;
            ctx.logger.success("Created and saved a new project.");
            ProjectAction::Created
        };

        state.project = Some(action);
        Ok(StepOutcome::Success)
    }

    fn validate_output(
        &self,
        ctx: &Context,
        host: &dyn HostProject,
        state: &RunState,
    ) -> StepResult<()> {
        if state.project.is_none() {
            return Err(StepError::invalid_output("Project action was not recorded"));
        }
        if !host.is_document_open(&ctx.settings.project_file()) {
            return Err(StepError::invalid_output(format!(
                "Project {} is not the open document",
                ctx.settings.project_file().display()
            )));
        }
        Ok(())
    }
}
