//! Pipeline orchestrator for building a project from a manifest.
//!
//! A run is a sequence of steps that validate, execute, and record their
//! results in a shared [`RunState`]. Every host call goes through the
//! [`HostProject`] passed to [`Orchestrator::run`].
//!
//! # Architecture
//!
//! ```text
//! Pipeline
//!     ├── Step: Load Manifest
//!     ├── Step: Initialize Project
//!     ├── Step: Setup Bins
//!     ├── Step: Import Media         (phase 1)
//!     ├── Step: Assemble Sequences   (phase 2)
//!     └── Step: Save Project
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use autoproj_core::orchestrator::Orchestrator;
//!
//! let logger = Arc::new(RunLogger::new(&settings.log_file(), settings.logging.log_config(), None));
//! let orchestrator = Orchestrator::new(settings, logger);
//! let report = orchestrator.run(&mut host)?;
//! println!("{}", report.summary());
//! ```

mod errors;
mod pipeline;
mod step;
pub mod steps;
mod types;

use std::sync::Arc;

pub use errors::{PipelineError, PipelineResult, StepError, StepResult};
pub use pipeline::{CancelHandle, Pipeline, PipelineRunResult};
pub use step::PipelineStep;
pub use steps::{
    AssembleSequencesStep, ImportMediaStep, InitializeProjectStep, LoadManifestStep,
    SaveProjectStep, SetupBinsStep,
};
pub use types::{
    Context, ProgressCallback, ProjectAction, RunReport, RunState, SequenceOutcome,
    SequenceStatus, StepOutcome,
};

use crate::config::Settings;
use crate::host::{FileSystem, HostProject};
use crate::logging::RunLogger;

/// Create a standard pipeline with all steps in the correct order.
///
/// 1. Load Manifest - read and validate the manifest (no host calls)
/// 2. Initialize Project - open or create the project document
/// 3. Setup Bins - find or create Master Bin and its children
/// 4. Import Media - section bins plus one batch import per media kind
/// 5. Assemble Sequences - build every manifest entry
/// 6. Save Project - write the document
pub fn create_standard_pipeline() -> Pipeline {
    Pipeline::new()
        .with_step(LoadManifestStep::new())
        .with_step(InitializeProjectStep::new())
        .with_step(SetupBinsStep::new())
        .with_step(ImportMediaStep::new())
        .with_step(AssembleSequencesStep::new())
        .with_step(SaveProjectStep::new())
}

/// Runs the standard pipeline with a fixed configuration.
pub struct Orchestrator {
    context: Context,
    pipeline: Pipeline,
}

impl Orchestrator {
    pub fn new(settings: Settings, logger: Arc<RunLogger>) -> Self {
        Self {
            context: Context::new(settings, "build", logger),
            pipeline: create_standard_pipeline(),
        }
    }

    /// Replace the filesystem collaborator.
    pub fn with_fs(mut self, fs: impl FileSystem + 'static) -> Self {
        self.context = self.context.with_fs(fs);
        self
    }

    /// Set a progress callback.
    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.context = self.context.with_progress_callback(callback);
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.context.settings
    }

    pub fn logger(&self) -> &Arc<RunLogger> {
        &self.context.logger
    }

    /// Handle that stops the run at the next step boundary.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.pipeline.cancel_handle()
    }

    /// Build the project against `host`.
    ///
    /// Per-sequence failures are part of the returned report. An error is
    /// returned only when a step the rest of the run depends on fails.
    pub fn run(&self, host: &mut dyn HostProject) -> PipelineResult<RunReport> {
        let ctx = &self.context;
        let run_id = format!("{}", chrono::Local::now().format("%Y%m%d-%H%M%S"));
        let mut state = RunState::new(run_id);

        ctx.logger.info("=== Project Automation Script Started ===");

        let result = self.pipeline.run(ctx, host, &mut state);
        let result = match result {
            Ok(result) => result,
            Err(e) => {
                ctx.logger.flush();
                return Err(e);
            }
        };

        let report = RunReport {
            run_id: state.run_id,
            project: state.project,
            video_import: state.video_import.unwrap_or_default(),
            slide_import: state.slide_import.unwrap_or_default(),
            outcomes: state.outcomes,
            steps_completed: result.steps_completed,
            log_counts: ctx.logger.counts(),
        };

        ctx.logger.info(&format!("Summary: {}", report.summary()));
        ctx.logger.info("=== Project Automation Completed ===");
        ctx.logger.flush();

        Ok(report)
    }
}
