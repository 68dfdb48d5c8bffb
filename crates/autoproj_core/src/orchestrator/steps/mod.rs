//! Pipeline step implementations.
//!
//! Each step handles one stage of the project build. Import Media is
//! phase 1, Assemble Sequences is phase 2.

mod assemble_sequences;
mod import_media;
mod initialize_project;
mod load_manifest;
mod save_project;
mod setup_bins;

pub use assemble_sequences::AssembleSequencesStep;
pub use import_media::ImportMediaStep;
pub use initialize_project::InitializeProjectStep;
pub use load_manifest::LoadManifestStep;
pub use save_project::SaveProjectStep;
pub use setup_bins::SetupBinsStep;
