//! Shared fixtures for pipeline tests.
//!
//! A [`Workspace`] is a temporary project directory with settings pointing
//! into it. [`RecordingHost`] wraps [`MemoryHost`] and records every call.

#![allow(dead_code)]

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::{tempdir, TempDir};

use autoproj_core::config::Settings;
use autoproj_core::host::{
    FixedMediaProbe, HostProject, HostResult, ItemHandle, MediaInfo, MemoryHost, ProjectItem,
};
use autoproj_core::logging::{LogConfig, RunLogger};
use autoproj_core::orchestrator::{Orchestrator, PipelineResult, RunReport};
use autoproj_core::timeline::{ClipId, Ticks, TrackLayout};

/// Probe with known durations for the media used across the tests.
pub fn probe() -> FixedMediaProbe {
    FixedMediaProbe::new()
        .with("a.mp4", MediaInfo::av(Ticks::from_secs(30)))
        .with("b.mp4", MediaInfo::av(Ticks::from_secs(20)))
        .with("c.mp4", MediaInfo::av(Ticks::from_secs(10)))
        .with("s1.jpg", MediaInfo::still(Ticks::from_secs(5)))
        .with("s2.jpg", MediaInfo::still(Ticks::from_secs(4)))
        .with_default(MediaInfo::still(Ticks::from_secs(5)))
}

/// One sequence entry as manifest JSON.
pub fn entry(video: &str, start: &str, end: &str, name: &str) -> serde_json::Value {
    serde_json::json!({
        "video": video,
        "startSlide": start,
        "endSlide": end,
        "sequenceName": name,
    })
}

/// A temporary project directory.
pub struct Workspace {
    pub dir: TempDir,
    pub settings: Settings,
}

impl Workspace {
    pub fn new() -> Self {
        let dir = tempdir().unwrap();
        let mut settings = Settings::default();
        settings.paths.project_dir = dir.path().to_string_lossy().into_owned();

        fs::create_dir_all(settings.video_folder()).unwrap();
        fs::create_dir_all(settings.slide_folder()).unwrap();

        Self { dir, settings }
    }

    pub fn write_manifest(&self, manifest: &serde_json::Value) {
        self.write_manifest_text(&manifest.to_string());
    }

    pub fn write_manifest_text(&self, text: &str) {
        let path = self.settings.manifest_file();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, text).unwrap();
    }

    pub fn add_videos(&self, names: &[&str]) {
        for name in names {
            fs::write(self.settings.video_folder().join(name), b"video").unwrap();
        }
    }

    pub fn add_slides(&self, names: &[&str]) {
        for name in names {
            fs::write(self.settings.slide_folder().join(name), b"slide").unwrap();
        }
    }

    pub fn video(&self, name: &str) -> PathBuf {
        self.settings.video_folder().join(name)
    }

    pub fn slide(&self, name: &str) -> PathBuf {
        self.settings.slide_folder().join(name)
    }

    pub fn logger(&self) -> Arc<RunLogger> {
        Arc::new(RunLogger::new(
            self.settings.log_file(),
            LogConfig::default(),
            None,
        ))
    }

    /// Run the standard pipeline once with a fresh logger.
    pub fn run(&self, host: &mut dyn HostProject) -> (PipelineResult<RunReport>, Arc<RunLogger>) {
        let logger = self.logger();
        let orchestrator = Orchestrator::new(self.settings.clone(), Arc::clone(&logger));
        let result = orchestrator.run(host);
        (result, logger)
    }

    pub fn log_text(&self) -> String {
        fs::read_to_string(self.settings.log_file()).unwrap_or_default()
    }

    /// Run log lines containing `needle`.
    pub fn log_lines(&self, needle: &str) -> Vec<String> {
        self.log_text()
            .lines()
            .filter(|line| line.contains(needle))
            .map(str::to_string)
            .collect()
    }
}

/// `MemoryHost` that records the name of every call.
pub struct RecordingHost {
    pub inner: MemoryHost,
    calls: RefCell<Vec<&'static str>>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self {
            inner: MemoryHost::new(probe()),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.borrow().clone()
    }

    pub fn count(&self, name: &str) -> usize {
        self.calls.borrow().iter().filter(|c| **c == name).count()
    }

    /// Handle of the item at `names` below the root, first match per level.
    pub fn resolve(&self, names: &[&str]) -> Option<ItemHandle> {
        self.inner.document()?.resolve_path(names)
    }

    /// Names of the direct children of the item at `names`.
    pub fn child_names(&self, names: &[&str]) -> Vec<String> {
        let Some(doc) = self.inner.document() else {
            return Vec::new();
        };
        let Some(handle) = doc.resolve_path(names) else {
            return Vec::new();
        };
        doc.node(handle)
            .map(|node| {
                node.children
                    .iter()
                    .filter_map(|c| doc.node(*c).ok())
                    .map(|n| n.name.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn record(&self, name: &'static str) {
        self.calls.borrow_mut().push(name);
    }
}

impl HostProject for RecordingHost {
    fn is_document_open(&self, path: &Path) -> bool {
        self.record("is_document_open");
        self.inner.is_document_open(path)
    }

    fn open_document(&mut self, path: &Path) -> HostResult<()> {
        self.record("open_document");
        self.inner.open_document(path)
    }

    fn new_document(&mut self, path: &Path) -> HostResult<()> {
        self.record("new_document");
        self.inner.new_document(path)
    }

    fn save_document(&mut self, path: &Path) -> HostResult<()> {
        self.record("save_document");
        self.inner.save_document(path)
    }

    fn close_document(&mut self) -> HostResult<()> {
        self.record("close_document");
        self.inner.close_document()
    }

    fn root_item(&self) -> HostResult<ItemHandle> {
        self.record("root_item");
        self.inner.root_item()
    }

    fn create_bin(&mut self, parent: ItemHandle, name: &str) -> HostResult<ItemHandle> {
        self.record("create_bin");
        self.inner.create_bin(parent, name)
    }

    fn set_color_label(&mut self, item: ItemHandle, label: u8) -> HostResult<()> {
        self.record("set_color_label");
        self.inner.set_color_label(item, label)
    }

    fn children(&self, parent: ItemHandle) -> HostResult<Vec<ProjectItem>> {
        self.record("children");
        self.inner.children(parent)
    }

    fn import_files(&mut self, paths: &[PathBuf], target: ItemHandle) -> HostResult<()> {
        self.record("import_files");
        self.inner.import_files(paths, target)
    }

    fn media_duration(&self, item: ItemHandle) -> HostResult<Ticks> {
        self.record("media_duration");
        self.inner.media_duration(item)
    }

    fn create_sequence_from_clips(
        &mut self,
        name: &str,
        clips: &[ItemHandle],
        bin: ItemHandle,
    ) -> HostResult<ItemHandle> {
        self.record("create_sequence_from_clips");
        self.inner.create_sequence_from_clips(name, clips, bin)
    }

    fn track_layout(&self, sequence: ItemHandle) -> HostResult<TrackLayout> {
        self.record("track_layout");
        self.inner.track_layout(sequence)
    }

    fn set_clip_start(
        &mut self,
        sequence: ItemHandle,
        clip: ClipId,
        start: Ticks,
    ) -> HostResult<()> {
        self.record("set_clip_start");
        self.inner.set_clip_start(sequence, clip, start)
    }

    fn insert_clip(
        &mut self,
        sequence: ItemHandle,
        item: ItemHandle,
        at: Ticks,
        video_track: usize,
        audio_track: usize,
    ) -> HostResult<()> {
        self.record("insert_clip");
        self.inner
            .insert_clip(sequence, item, at, video_track, audio_track)
    }

    fn sequence_end(&self, sequence: ItemHandle) -> HostResult<Ticks> {
        self.record("sequence_end");
        self.inner.sequence_end(sequence)
    }

    fn remove_item(&mut self, item: ItemHandle) -> HostResult<()> {
        self.record("remove_item");
        self.inner.remove_item(item)
    }
}
