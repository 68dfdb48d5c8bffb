//! In-memory host project persisted as JSON.
//!
//! `MemoryHost` keeps the whole project tree in memory and writes it to the
//! project path on save. It honours the host contracts the pipeline relies
//! on: atomic batch imports, duplicate-import safety, and rejection of any
//! placement that would overlap another clip on the same track.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::errors::{HostError, HostResult};
use super::probe::MediaProbe;
use super::types::{ItemHandle, MediaInfo, ProjectItem, ProjectItemKind};
use super::HostProject;
use crate::timeline::{ClipId, ClipPlacement, Ticks, TrackKind, TrackLayout};

/// Video and audio tracks created for every new sequence.
pub const DEFAULT_TRACK_COUNT: usize = 3;

/// Document format version.
const FORMAT_VERSION: u32 = 1;

/// Media backing a clip item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaRecord {
    pub path: PathBuf,
    pub info: MediaInfo,
}

/// One node of the project tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemNode {
    pub name: String,
    pub kind: ProjectItemKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<ItemHandle>,
    /// Children in creation order.
    #[serde(default)]
    pub children: Vec<ItemHandle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_label: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<MediaRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<TrackLayout>,
}

impl ItemNode {
    fn new(name: impl Into<String>, kind: ProjectItemKind) -> Self {
        Self {
            name: name.into(),
            kind,
            parent: None,
            children: Vec::new(),
            color_label: None,
            media: None,
            layout: None,
        }
    }
}

/// Serialized project document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectDocument {
    pub version: u32,
    pub root: ItemHandle,
    next_item: u64,
    next_clip: u64,
    pub items: BTreeMap<u64, ItemNode>,
}

impl Default for ProjectDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl ProjectDocument {
    /// Empty document containing only the root.
    pub fn new() -> Self {
        let mut items = BTreeMap::new();
        items.insert(0, ItemNode::new("Root", ProjectItemKind::Root));
        Self {
            version: FORMAT_VERSION,
            root: ItemHandle(0),
            next_item: 1,
            next_clip: 1,
            items,
        }
    }

    pub fn node(&self, item: ItemHandle) -> HostResult<&ItemNode> {
        self.items.get(&item.0).ok_or(HostError::UnknownItem(item))
    }

    fn node_mut(&mut self, item: ItemHandle) -> HostResult<&mut ItemNode> {
        self.items
            .get_mut(&item.0)
            .ok_or(HostError::UnknownItem(item))
    }

    fn expect_container(&self, item: ItemHandle) -> HostResult<&ItemNode> {
        let node = self.node(item)?;
        match node.kind {
            ProjectItemKind::Root | ProjectItemKind::Bin => Ok(node),
            other => Err(HostError::wrong_kind(item, ProjectItemKind::Bin, other)),
        }
    }

    fn media(&self, item: ItemHandle) -> HostResult<(String, MediaInfo)> {
        let node = self.node(item)?;
        match (&node.kind, &node.media) {
            (ProjectItemKind::Clip, Some(media)) => Ok((node.name.clone(), media.info)),
            (kind, _) => Err(HostError::wrong_kind(item, ProjectItemKind::Clip, *kind)),
        }
    }

    fn layout(&self, sequence: ItemHandle) -> HostResult<&TrackLayout> {
        let node = self.node(sequence)?;
        node.layout.as_ref().ok_or(HostError::wrong_kind(
            sequence,
            ProjectItemKind::Sequence,
            node.kind,
        ))
    }

    fn layout_mut(&mut self, sequence: ItemHandle) -> HostResult<&mut TrackLayout> {
        let node = self.node_mut(sequence)?;
        let kind = node.kind;
        node.layout.as_mut().ok_or(HostError::wrong_kind(
            sequence,
            ProjectItemKind::Sequence,
            kind,
        ))
    }

    fn alloc_clip(&mut self) -> ClipId {
        let id = ClipId(self.next_clip);
        self.next_clip += 1;
        id
    }

    fn add_child(&mut self, parent: ItemHandle, mut node: ItemNode) -> HostResult<ItemHandle> {
        self.expect_container(parent)?;
        let handle = ItemHandle(self.next_item);
        self.next_item += 1;
        node.parent = Some(parent);
        self.items.insert(handle.0, node);
        self.node_mut(parent)?.children.push(handle);
        Ok(handle)
    }

    /// Walk down from the root by names, first match at each level.
    pub fn resolve_path(&self, names: &[&str]) -> Option<ItemHandle> {
        names.iter().try_fold(self.root, |current, name| {
            self.items.get(&current.0)?.children.iter().copied().find(|c| {
                self.items
                    .get(&c.0)
                    .map(|n| n.name == *name)
                    .unwrap_or(false)
            })
        })
    }
}

/// A document together with the path it belongs to.
#[derive(Debug, Clone)]
struct OpenDocument {
    path: PathBuf,
    project: ProjectDocument,
}

/// `HostProject` implementation over an in-memory document.
pub struct MemoryHost {
    probe: Box<dyn MediaProbe>,
    document: Option<OpenDocument>,
}

impl MemoryHost {
    /// Create a host with no open document.
    pub fn new(probe: impl MediaProbe + 'static) -> Self {
        Self {
            probe: Box::new(probe),
            document: None,
        }
    }

    /// The open document, if any.
    pub fn document(&self) -> Option<&ProjectDocument> {
        self.document.as_ref().map(|d| &d.project)
    }

    /// Path of the open document, if any.
    pub fn document_path(&self) -> Option<&Path> {
        self.document.as_ref().map(|d| d.path.as_path())
    }

    fn doc(&self) -> HostResult<&ProjectDocument> {
        self.document
            .as_ref()
            .map(|d| &d.project)
            .ok_or(HostError::NoDocument)
    }

    fn doc_mut(&mut self) -> HostResult<&mut ProjectDocument> {
        self.document
            .as_mut()
            .map(|d| &mut d.project)
            .ok_or(HostError::NoDocument)
    }

    /// Probe every new path before touching the document.
    fn plan_import(
        &self,
        paths: &[PathBuf],
        target: ItemHandle,
    ) -> HostResult<Vec<(PathBuf, MediaInfo)>> {
        let doc = self.doc()?;
        let container = doc.expect_container(target)?;

        let mut seen: HashSet<&Path> = container
            .children
            .iter()
            .filter_map(|c| doc.items.get(&c.0))
            .filter_map(|n| n.media.as_ref())
            .map(|m| m.path.as_path())
            .collect();

        let mut pending = Vec::new();
        for path in paths {
            if !seen.insert(path.as_path()) {
                continue;
            }
            if !path.exists() {
                return Err(HostError::ImportFailed(format!(
                    "File not found: {}",
                    path.display()
                )));
            }
            let info = self
                .probe
                .probe(path)
                .map_err(|e| HostError::ImportFailed(e.to_string()))?;
            pending.push((path.clone(), info));
        }
        Ok(pending)
    }
}

impl HostProject for MemoryHost {
    fn is_document_open(&self, path: &Path) -> bool {
        self.document_path() == Some(path)
    }

    fn open_document(&mut self, path: &Path) -> HostResult<()> {
        let content = fs::read_to_string(path)
            .map_err(|e| HostError::document(path, format!("read failed: {}", e)))?;
        let project: ProjectDocument = serde_json::from_str(&content)
            .map_err(|e| HostError::document(path, format!("not a project document: {}", e)))?;

        if project.version != FORMAT_VERSION {
            return Err(HostError::document(
                path,
                format!("unsupported document version {}", project.version),
            ));
        }

        tracing::debug!("Opened project document {}", path.display());
        self.document = Some(OpenDocument {
            path: path.to_path_buf(),
            project,
        });
        Ok(())
    }

    fn new_document(&mut self, path: &Path) -> HostResult<()> {
        self.document = Some(OpenDocument {
            path: path.to_path_buf(),
            project: ProjectDocument::new(),
        });
        Ok(())
    }

    fn save_document(&mut self, path: &Path) -> HostResult<()> {
        let content = serde_json::to_string_pretty(self.doc()?)
            .map_err(|e| HostError::document(path, format!("serialize failed: {}", e)))?;

        atomic_write(path, &content).map_err(|e| HostError::io("save document", e))?;

        if let Some(open) = self.document.as_mut() {
            open.path = path.to_path_buf();
        }
        tracing::debug!("Saved project document {}", path.display());
        Ok(())
    }

    fn close_document(&mut self) -> HostResult<()> {
        self.document = None;
        Ok(())
    }

    fn root_item(&self) -> HostResult<ItemHandle> {
        Ok(self.doc()?.root)
    }

    fn create_bin(&mut self, parent: ItemHandle, name: &str) -> HostResult<ItemHandle> {
        self.doc_mut()?
            .add_child(parent, ItemNode::new(name, ProjectItemKind::Bin))
    }

    fn set_color_label(&mut self, item: ItemHandle, label: u8) -> HostResult<()> {
        self.doc_mut()?.node_mut(item)?.color_label = Some(label);
        Ok(())
    }

    fn children(&self, parent: ItemHandle) -> HostResult<Vec<ProjectItem>> {
        let doc = self.doc()?;
        let container = doc.expect_container(parent)?;
        container
            .children
            .iter()
            .map(|&handle| {
                let node = doc.node(handle)?;
                Ok(ProjectItem {
                    handle,
                    name: node.name.clone(),
                    kind: node.kind,
                })
            })
            .collect()
    }

    fn import_files(&mut self, paths: &[PathBuf], target: ItemHandle) -> HostResult<()> {
        let pending = self.plan_import(paths, target)?;
        let doc = self.doc_mut()?;

        for (path, info) in pending {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            let mut node = ItemNode::new(name, ProjectItemKind::Clip);
            node.media = Some(MediaRecord { path, info });
            doc.add_child(target, node)?;
        }
        Ok(())
    }

    fn media_duration(&self, item: ItemHandle) -> HostResult<Ticks> {
        Ok(self.doc()?.media(item)?.1.duration)
    }

    fn create_sequence_from_clips(
        &mut self,
        name: &str,
        clips: &[ItemHandle],
        bin: ItemHandle,
    ) -> HostResult<ItemHandle> {
        if clips.is_empty() {
            return Err(HostError::NotPermitted(format!(
                "Sequence '{}' needs at least one clip",
                name
            )));
        }

        let doc = self.doc_mut()?;
        doc.expect_container(bin)?;

        let mut layout = TrackLayout::with_tracks(DEFAULT_TRACK_COUNT, DEFAULT_TRACK_COUNT);
        let mut cursor = Ticks::ZERO;

        for &clip in clips {
            let (clip_name, info) = doc.media(clip)?;
            if info.has_video {
                let id = doc.alloc_clip();
                layout.video[0].clips.push(placement(id, &clip_name, cursor, info.duration));
            }
            if info.has_audio {
                let id = doc.alloc_clip();
                layout.audio[0].clips.push(placement(id, &clip_name, cursor, info.duration));
            }
            cursor += info.duration;
        }

        let mut node = ItemNode::new(name, ProjectItemKind::Sequence);
        node.layout = Some(layout);
        doc.add_child(bin, node)
    }

    fn track_layout(&self, sequence: ItemHandle) -> HostResult<TrackLayout> {
        self.doc()?.layout(sequence).cloned()
    }

    fn set_clip_start(
        &mut self,
        sequence: ItemHandle,
        clip: ClipId,
        start: Ticks,
    ) -> HostResult<()> {
        if start < Ticks::ZERO {
            return Err(HostError::NotPermitted(format!(
                "Clip start {} is before the sequence start",
                start
            )));
        }

        let doc = self.doc_mut()?;
        let sequence_name = doc.node(sequence)?.name.clone();
        let layout = doc.layout_mut(sequence)?;

        let unknown = || HostError::UnknownClip {
            sequence: sequence_name.clone(),
            clip,
        };

        let (kind, index) = layout
            .find_clip(clip)
            .map(|(kind, index, _)| (kind, index))
            .ok_or_else(unknown)?;
        let track = layout.track_mut(kind, index).ok_or_else(unknown)?;

        let (name, duration) = track
            .clips
            .iter()
            .find(|c| c.id == clip)
            .map(|c| (c.name.clone(), c.duration))
            .ok_or_else(unknown)?;

        if let Some(other) = track.collision(start, duration, Some(clip)) {
            return Err(HostError::Overlap {
                name,
                at: start,
                kind,
                track: index,
                other: other.name.clone(),
            });
        }

        if let Some(placed) = track.clips.iter_mut().find(|c| c.id == clip) {
            placed.start = start;
        }
        track.sort();
        Ok(())
    }

    fn insert_clip(
        &mut self,
        sequence: ItemHandle,
        item: ItemHandle,
        at: Ticks,
        video_track: usize,
        audio_track: usize,
    ) -> HostResult<()> {
        let doc = self.doc_mut()?;
        let (name, info) = doc.media(item)?;
        let sequence_name = doc.node(sequence)?.name.clone();
        doc.layout(sequence)?;

        let mut targets = Vec::new();
        if info.has_video {
            targets.push((TrackKind::Video, video_track, doc.alloc_clip()));
        }
        if info.has_audio {
            targets.push((TrackKind::Audio, audio_track, doc.alloc_clip()));
        }

        let layout = doc.layout_mut(sequence)?;

        // Check every target track before placing anything.
        for &(kind, index, _) in &targets {
            let track = layout
                .track(kind, index)
                .ok_or_else(|| HostError::NoSuchTrack {
                    sequence: sequence_name.clone(),
                    kind,
                    index,
                })?;
            if let Some(other) = track.collision(at, info.duration, None) {
                return Err(HostError::Overlap {
                    name: name.clone(),
                    at,
                    kind,
                    track: index,
                    other: other.name.clone(),
                });
            }
        }

        for (kind, index, id) in targets {
            if let Some(track) = layout.track_mut(kind, index) {
                track.clips.push(placement(id, &name, at, info.duration));
                track.sort();
            }
        }
        Ok(())
    }

    fn sequence_end(&self, sequence: ItemHandle) -> HostResult<Ticks> {
        Ok(self.doc()?.layout(sequence)?.end())
    }

    fn remove_item(&mut self, item: ItemHandle) -> HostResult<()> {
        let doc = self.doc_mut()?;
        if item == doc.root {
            return Err(HostError::NotPermitted(
                "The project root cannot be removed".to_string(),
            ));
        }

        let parent = doc.node(item)?.parent;
        if let Some(parent) = parent {
            doc.node_mut(parent)?.children.retain(|c| *c != item);
        }

        let mut stack = vec![item];
        while let Some(current) = stack.pop() {
            if let Some(node) = doc.items.remove(&current.0) {
                stack.extend(node.children);
            }
        }
        Ok(())
    }
}

fn placement(id: ClipId, name: &str, start: Ticks, duration: Ticks) -> ClipPlacement {
    ClipPlacement {
        id,
        name: name.to_string(),
        start,
        duration,
    }
}

/// Write to a temp file next to `path`, then rename over it.
fn atomic_write(path: &Path, content: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut temp_name = path.as_os_str().to_owned();
    temp_name.push(".tmp");
    let temp_path = PathBuf::from(temp_name);

    {
        let mut file = fs::File::create(&temp_path)?;
        file.write_all(content.as_bytes())?;
        file.sync_all()?;
    }

    fs::rename(&temp_path, path)
}
