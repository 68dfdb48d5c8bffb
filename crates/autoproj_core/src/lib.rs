//! Autoproj Core - manifest-driven editing project assembly
//!
//! Reads a manifest of sections and sequences, imports the referenced
//! videos and slides into a host project, and builds one sequence per entry
//! framed by its start and end slide. No CLI dependencies; the host project
//! and filesystem are injected.

pub mod assembler;
pub mod assets;
pub mod bins;
pub mod config;
pub mod host;
pub mod logging;
pub mod manifest;
pub mod orchestrator;
pub mod timeline;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
