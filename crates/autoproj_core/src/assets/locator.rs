//! Resolution of manifest asset references to absolute paths.

use std::env;
use std::path::{Path, PathBuf};

use crate::host::FileSystem;

/// A resolved asset reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetResolution {
    pub absolute_path: PathBuf,
    pub exists: bool,
}

/// Joins references onto a media root and checks existence.
///
/// A missing file is reported through [`AssetResolution::exists`], never as
/// an error.
#[derive(Clone, Copy)]
pub struct AssetLocator<'a> {
    fs: &'a dyn FileSystem,
}

impl<'a> AssetLocator<'a> {
    pub fn new(fs: &'a dyn FileSystem) -> Self {
        Self { fs }
    }

    /// Resolve `reference` relative to `root`.
    pub fn resolve(&self, reference: &str, root: &Path) -> AssetResolution {
        self.check(&asset_path(reference, root))
    }

    /// Existence of an already joined path.
    pub fn check(&self, path: &Path) -> AssetResolution {
        let absolute_path = absolutize(path);
        let exists = self.fs.exists(&absolute_path);
        AssetResolution {
            absolute_path,
            exists,
        }
    }
}

/// Join a reference onto its root without touching the filesystem.
pub fn asset_path(reference: &str, root: &Path) -> PathBuf {
    absolutize(&root.join(reference))
}

/// Anchor a relative path at the current directory.
///
/// Falls back to the path as given if the current directory is unavailable.
fn absolutize(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    match env::current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(e) => {
            tracing::warn!("Cannot read current directory: {}", e);
            path.to_path_buf()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::LocalFileSystem;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn resolves_existing_and_missing_files() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.mp4"), b"x").unwrap();
        let locator = AssetLocator::new(&LocalFileSystem);

        let found = locator.resolve("a.mp4", dir.path());
        assert!(found.exists);
        assert_eq!(found.absolute_path, dir.path().join("a.mp4"));

        let missing = locator.resolve("b.mp4", dir.path());
        assert!(!missing.exists);
        assert_eq!(missing.absolute_path, dir.path().join("b.mp4"));
    }

    #[test]
    fn relative_roots_become_absolute() {
        let path = asset_path("s1.jpg", Path::new("source/slides"));
        assert!(path.is_absolute());
        assert!(path.ends_with("source/slides/s1.jpg"));
    }
}
