//! Host editing application collaborator.
//!
//! The pipeline never talks to an editing application directly. Everything
//! it needs from the host project goes through [`HostProject`], and the
//! filesystem goes through [`FileSystem`]. Both are injected, so the whole
//! pipeline runs against [`MemoryHost`] in tests.
//!
//! # Handle stability
//!
//! [`ItemHandle`]s are only assumed valid while the document that issued
//! them stays open. Callers re-resolve bins by name between phases instead
//! of caching handles.

mod errors;
mod fs;
mod memory;
mod probe;
mod types;

use std::path::{Path, PathBuf};

pub use errors::{HostError, HostResult};
pub use fs::{FileSystem, LocalFileSystem};
pub use memory::{ItemNode, MediaRecord, MemoryHost, ProjectDocument, DEFAULT_TRACK_COUNT};
pub use probe::{is_still, FfprobeMediaProbe, FixedMediaProbe, MediaProbe, STILL_EXTENSIONS};
pub use types::{ItemHandle, MediaInfo, ProjectItem, ProjectItemKind};

use crate::timeline::{ClipId, Ticks, TrackLayout};

/// Operations consumed from the host project.
///
/// Execution is strictly sequential: one caller, no interleaving. A
/// multi-threaded caller must serialize access to the whole host.
pub trait HostProject {
    /// Whether the document at `path` is the one currently open.
    fn is_document_open(&self, path: &Path) -> bool;

    /// Open an existing document, replacing any open one.
    fn open_document(&mut self, path: &Path) -> HostResult<()>;

    /// Start a new, empty document that will be saved at `path`.
    fn new_document(&mut self, path: &Path) -> HostResult<()>;

    /// Save the open document at `path`.
    fn save_document(&mut self, path: &Path) -> HostResult<()>;

    /// Close the open document without saving.
    fn close_document(&mut self) -> HostResult<()>;

    /// The root container of the open document.
    fn root_item(&self) -> HostResult<ItemHandle>;

    /// Create a child bin. Name collisions are allowed.
    fn create_bin(&mut self, parent: ItemHandle, name: &str) -> HostResult<ItemHandle>;

    /// Tag an item with a cosmetic color label.
    fn set_color_label(&mut self, item: ItemHandle, label: u8) -> HostResult<()>;

    /// Direct children of a container, in host iteration order.
    fn children(&self, parent: ItemHandle) -> HostResult<Vec<ProjectItem>>;

    /// Import a batch of absolute paths into `target` in a single call.
    ///
    /// The call succeeds or fails as a whole. Paths already imported into
    /// `target` are left as they are.
    fn import_files(&mut self, paths: &[PathBuf], target: ItemHandle) -> HostResult<()>;

    /// Usable duration of a clip item (out point minus in point).
    fn media_duration(&self, item: ItemHandle) -> HostResult<Ticks>;

    /// Create a sequence in `bin` seeded with `clips` placed back to back.
    fn create_sequence_from_clips(
        &mut self,
        name: &str,
        clips: &[ItemHandle],
        bin: ItemHandle,
    ) -> HostResult<ItemHandle>;

    /// Snapshot of the sequence's tracks and clip placements.
    fn track_layout(&self, sequence: ItemHandle) -> HostResult<TrackLayout>;

    /// Move a placed clip to a new start time.
    fn set_clip_start(&mut self, sequence: ItemHandle, clip: ClipId, start: Ticks)
        -> HostResult<()>;

    /// Place `item` at `at` on the given video/audio tracks without moving
    /// anything else.
    fn insert_clip(
        &mut self,
        sequence: ItemHandle,
        item: ItemHandle,
        at: Ticks,
        video_track: usize,
        audio_track: usize,
    ) -> HostResult<()>;

    /// Total duration of the sequence.
    fn sequence_end(&self, sequence: ItemHandle) -> HostResult<Ticks>;

    /// Remove an item and everything below it.
    fn remove_item(&mut self, item: ItemHandle) -> HostResult<()>;
}
