//! Core types for the orchestrator pipeline.

use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;

use crate::assets::ImportOutcome;
use crate::bins::ProjectBins;
use crate::config::Settings;
use crate::host::{FileSystem, ItemHandle, LocalFileSystem};
use crate::logging::{LevelCounts, RunLogger};
use crate::manifest::Manifest;
use crate::timeline::Ticks;

/// Progress callback type for reporting pipeline progress.
///
/// Arguments: (step_name, percent_complete, message)
pub type ProgressCallback = Box<dyn Fn(&str, u32, &str) + Send + Sync>;

/// Read-only context passed to pipeline steps.
///
/// Contains the run configuration and shared collaborators. Mutable state
/// goes in `RunState`; the host project is passed to each step separately.
pub struct Context {
    /// Automation settings.
    pub settings: Settings,
    /// Run name used in error context.
    pub run_name: String,
    /// Run logger.
    pub logger: Arc<RunLogger>,
    /// Filesystem collaborator.
    pub fs: Box<dyn FileSystem>,
    /// Optional progress callback.
    progress_callback: Option<ProgressCallback>,
}

impl Context {
    /// Create a context using the local filesystem.
    pub fn new(settings: Settings, run_name: impl Into<String>, logger: Arc<RunLogger>) -> Self {
        Self {
            settings,
            run_name: run_name.into(),
            logger,
            fs: Box::new(LocalFileSystem),
            progress_callback: None,
        }
    }

    /// Replace the filesystem collaborator.
    pub fn with_fs(mut self, fs: impl FileSystem + 'static) -> Self {
        self.fs = Box::new(fs);
        self
    }

    /// Set the progress callback.
    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Report progress to callback (if set).
    pub fn report_progress(&self, step_name: &str, percent: u32, message: &str) {
        if let Some(ref callback) = self.progress_callback {
            callback(step_name, percent, message);
        }
    }
}

/// How the project document was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectAction {
    Created,
    Opened,
    Overwritten,
}

/// Mutable run state that accumulates results from pipeline steps.
///
/// Each step writes its own field; later steps read earlier ones.
#[derive(Debug, Clone, Default)]
pub struct RunState {
    /// Unique run identifier.
    pub run_id: String,
    /// When the run started.
    pub started_at: Option<String>,
    /// Validated manifest (from Load Manifest).
    pub manifest: Option<Manifest>,
    /// Project document handling (from Initialize Project).
    pub project: Option<ProjectAction>,
    /// Fixed bins as found or created (from Setup Bins).
    pub bins: Option<ProjectBins>,
    /// Sections whose bin could not be created (from Import Media).
    pub failed_sections: BTreeSet<String>,
    /// Files left out of the import because an earlier file has the same
    /// clip name (from Import Media).
    pub name_clashes: BTreeSet<PathBuf>,
    /// Video import result (from Import Media).
    pub video_import: Option<ImportOutcome>,
    /// Slide import result (from Import Media).
    pub slide_import: Option<ImportOutcome>,
    /// Per-sequence results in manifest order (from Assemble Sequences).
    pub outcomes: Vec<SequenceOutcome>,
    /// Where the document was saved (from Save Project).
    pub saved_to: Option<PathBuf>,
}

impl RunState {
    /// Create a new run state with the given ID.
    pub fn new(run_id: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            started_at: Some(chrono::Local::now().to_rfc3339()),
            ..Default::default()
        }
    }

    /// Whether `path` was requested but not imported in phase 1.
    pub fn is_unavailable(&self, path: &std::path::Path) -> bool {
        [&self.video_import, &self.slide_import]
            .iter()
            .filter_map(|outcome| outcome.as_ref())
            .any(|outcome| outcome.is_unavailable(path))
    }
}

/// Result for one manifest sequence entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceOutcome {
    pub section: String,
    pub sequence_name: String,
    pub status: SequenceStatus,
    /// Handle of the built sequence, valid while the document stays open.
    pub sequence: Option<ItemHandle>,
}

/// What happened to a sequence entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SequenceStatus {
    /// Fully assembled.
    Built { clips: usize, duration: Ticks },
    /// Assembled without some slides.
    Partial {
        clips: usize,
        duration: Ticks,
        missing_slides: Vec<String>,
    },
    /// Not attempted or given up on because something was missing.
    Skipped(String),
    /// A host operation failed.
    Failed(String),
}

impl SequenceStatus {
    pub fn label(&self) -> &'static str {
        match self {
            SequenceStatus::Built { .. } => "built",
            SequenceStatus::Partial { .. } => "partial",
            SequenceStatus::Skipped(_) => "skipped",
            SequenceStatus::Failed(_) => "failed",
        }
    }

    /// Whether a sequence exists after the run.
    pub fn is_built(&self) -> bool {
        matches!(
            self,
            SequenceStatus::Built { .. } | SequenceStatus::Partial { .. }
        )
    }
}

impl fmt::Display for SequenceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SequenceStatus::Built { clips, duration } => {
                write!(f, "built ({} clips, {})", clips, duration)
            }
            SequenceStatus::Partial {
                clips,
                duration,
                missing_slides,
            } => write!(
                f,
                "partial ({} clips, {}, missing {})",
                clips,
                duration,
                missing_slides.join(", ")
            ),
            SequenceStatus::Skipped(reason) => write!(f, "skipped: {}", reason),
            SequenceStatus::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

/// Summary of a completed run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub run_id: String,
    pub project: Option<ProjectAction>,
    pub video_import: ImportOutcome,
    pub slide_import: ImportOutcome,
    pub outcomes: Vec<SequenceOutcome>,
    pub steps_completed: Vec<String>,
    /// Run log lines per level.
    pub log_counts: LevelCounts,
}

impl RunReport {
    /// Number of outcomes with the given status label.
    pub fn count(&self, label: &str) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.status.label() == label)
            .count()
    }

    /// Outcomes belonging to one section.
    pub fn section(&self, name: &str) -> Vec<&SequenceOutcome> {
        self.outcomes.iter().filter(|o| o.section == name).collect()
    }

    /// One line summary.
    pub fn summary(&self) -> String {
        format!(
            "{} built, {} partial, {} skipped, {} failed",
            self.count("built"),
            self.count("partial"),
            self.count("skipped"),
            self.count("failed")
        )
    }
}

/// Result of executing a pipeline step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// Step completed successfully.
    Success,
    /// Step was skipped (preconditions not met, but not an error).
    Skipped(String),
}
