//! Batched media import.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use super::locator::AssetLocator;
use crate::host::{FileSystem, HostProject, ItemHandle};

/// Result of one batch import.
///
/// Every requested path ends up in exactly one of the three sets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportOutcome {
    /// Present in the target bin after the call.
    pub imported: BTreeSet<PathBuf>,
    /// Not found on disk; never sent to the host.
    pub missing: BTreeSet<PathBuf>,
    /// Sent to the host, but the import call failed.
    pub failed: BTreeSet<PathBuf>,
    /// Cause reported by the host when the call failed.
    pub error: Option<String>,
}

impl ImportOutcome {
    /// Number of distinct paths requested.
    pub fn total(&self) -> usize {
        self.imported.len() + self.missing.len() + self.failed.len()
    }

    /// Whether every requested path was imported.
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty() && self.failed.is_empty()
    }

    /// Whether `path` is not usable after this import.
    pub fn is_unavailable(&self, path: &Path) -> bool {
        self.missing.contains(path) || self.failed.contains(path)
    }
}

/// Imports a set of files with a single host call.
pub struct BatchImporter<'a> {
    locator: AssetLocator<'a>,
}

impl<'a> BatchImporter<'a> {
    pub fn new(fs: &'a dyn FileSystem) -> Self {
        Self {
            locator: AssetLocator::new(fs),
        }
    }

    /// Import `paths` into `target`.
    ///
    /// Duplicates are collapsed, missing files are split off, and the
    /// remaining files go to the host in one `import_files` call. A failed
    /// call marks every file of the batch as failed. No host call is made
    /// when nothing exists on disk.
    pub fn import_batch<I>(
        &self,
        host: &mut dyn HostProject,
        paths: I,
        target: ItemHandle,
    ) -> ImportOutcome
    where
        I: IntoIterator<Item = PathBuf>,
    {
        let requested: BTreeSet<PathBuf> = paths.into_iter().collect();
        let mut outcome = ImportOutcome::default();
        let mut existing = BTreeSet::new();

        for path in requested {
            if self.locator.check(&path).exists {
                existing.insert(path);
            } else {
                outcome.missing.insert(path);
            }
        }

        if existing.is_empty() {
            tracing::debug!("Nothing to import into {}", target);
            return outcome;
        }

        let batch: Vec<PathBuf> = existing.iter().cloned().collect();
        tracing::debug!("Importing {} files into {}", batch.len(), target);

        match host.import_files(&batch, target) {
            Ok(()) => outcome.imported = existing,
            Err(e) => {
                tracing::warn!("Batch import into {} failed: {}", target, e);
                outcome.failed = existing;
                outcome.error = Some(e.to_string());
            }
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{FixedMediaProbe, LocalFileSystem, MediaInfo, MemoryHost};
    use crate::timeline::Ticks;
    use std::fs;
    use tempfile::{tempdir, TempDir};

    fn setup(files: &[&str]) -> (TempDir, MemoryHost, ItemHandle) {
        let dir = tempdir().unwrap();
        for name in files {
            fs::write(dir.path().join(name), b"media").unwrap();
        }
        let probe = FixedMediaProbe::new()
            .with("a.mp4", MediaInfo::av(Ticks::from_secs(10)))
            .with("b.mp4", MediaInfo::av(Ticks::from_secs(20)));
        let mut host = MemoryHost::new(probe);
        host.new_document(&dir.path().join("project.json")).unwrap();
        let root = host.root_item().unwrap();
        let bin = host.create_bin(root, "Videos").unwrap();
        (dir, host, bin)
    }

    #[test]
    fn partitions_requested_paths() {
        let (dir, mut host, bin) = setup(&["a.mp4", "b.mp4"]);
        let paths = vec![
            dir.path().join("a.mp4"),
            dir.path().join("b.mp4"),
            dir.path().join("gone.mp4"),
            dir.path().join("a.mp4"),
        ];

        let outcome = BatchImporter::new(&LocalFileSystem).import_batch(&mut host, paths, bin);

        assert_eq!(outcome.imported.len(), 2);
        assert_eq!(outcome.missing.len(), 1);
        assert!(outcome.failed.is_empty());
        assert_eq!(outcome.total(), 3);
        assert!(outcome.is_unavailable(&dir.path().join("gone.mp4")));
        assert_eq!(host.children(bin).unwrap().len(), 2);
    }

    #[test]
    fn host_failure_fails_whole_batch() {
        // c.mp4 exists but the probe does not know it, so the host rejects the batch.
        let (dir, mut host, bin) = setup(&["a.mp4", "c.mp4"]);
        let paths = vec![
            dir.path().join("a.mp4"),
            dir.path().join("c.mp4"),
            dir.path().join("gone.mp4"),
        ];

        let outcome = BatchImporter::new(&LocalFileSystem).import_batch(&mut host, paths, bin);

        assert!(outcome.imported.is_empty());
        assert_eq!(outcome.failed.len(), 2);
        assert_eq!(outcome.missing.len(), 1);
        assert!(outcome.error.is_some());
        assert!(host.children(bin).unwrap().is_empty());
    }

    #[test]
    fn reimport_adds_nothing() {
        let (dir, mut host, bin) = setup(&["a.mp4", "b.mp4"]);
        let paths = || vec![dir.path().join("a.mp4"), dir.path().join("b.mp4")];
        let importer = BatchImporter::new(&LocalFileSystem);

        let first = importer.import_batch(&mut host, paths(), bin);
        let second = importer.import_batch(&mut host, paths(), bin);

        assert_eq!(first.imported, second.imported);
        assert_eq!(host.children(bin).unwrap().len(), 2);
    }
}
