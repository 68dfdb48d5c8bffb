//! Source media on disk: locating, importing and renaming.

pub mod importer;
pub mod locator;
pub mod renamer;

pub use importer::{BatchImporter, ImportOutcome};
pub use locator::{asset_path, AssetLocator, AssetResolution};
pub use renamer::{load_rename_map, rename_media, RenameError, RenameMap, RenameReport};
