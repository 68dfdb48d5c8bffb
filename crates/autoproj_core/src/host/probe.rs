//! Media probing for imported files.
//!
//! Still images get a fixed duration, everything else is probed with
//! `ffprobe -show_entries format=duration:stream=codec_type -of json`.

use std::collections::HashMap;
use std::path::Path;
use std::process::Command;

use serde_json::Value;

use super::errors::{HostError, HostResult};
use super::types::MediaInfo;
use crate::timeline::Ticks;

/// Extensions imported as still images.
pub const STILL_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "gif", "tif", "tiff", "psd"];

/// Source of media durations and stream layout.
pub trait MediaProbe {
    fn probe(&self, path: &Path) -> HostResult<MediaInfo>;
}

/// Whether the file extension marks a still image.
pub fn is_still(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| STILL_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Probe backed by the `ffprobe` executable.
#[derive(Debug, Clone)]
pub struct FfprobeMediaProbe {
    program: String,
    still_duration: Ticks,
}

impl FfprobeMediaProbe {
    pub fn new(still_duration: Ticks) -> Self {
        Self {
            program: "ffprobe".to_string(),
            still_duration,
        }
    }

    /// Use a different ffprobe binary.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }
}

impl MediaProbe for FfprobeMediaProbe {
    fn probe(&self, path: &Path) -> HostResult<MediaInfo> {
        if is_still(path) {
            return Ok(MediaInfo::still(self.still_duration));
        }

        tracing::debug!("Probing media: {}", path.display());

        let output = Command::new(&self.program)
            .args(["-v", "error", "-show_entries"])
            .arg("format=duration:stream=codec_type")
            .args(["-of", "json"])
            .arg(path)
            .output()
            .map_err(|e| {
                HostError::probe_failed(path, format!("Failed to run {}: {}", self.program, e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(HostError::probe_failed(
                path,
                format!(
                    "{} exited with code {}: {}",
                    self.program,
                    output.status.code().unwrap_or(-1),
                    stderr.trim()
                ),
            ));
        }

        let json: Value = serde_json::from_slice(&output.stdout)
            .map_err(|e| HostError::probe_failed(path, format!("Invalid probe output: {}", e)))?;

        parse_probe_json(&json).ok_or_else(|| HostError::probe_failed(path, "No duration reported"))
    }
}

/// Parse ffprobe's JSON output.
fn parse_probe_json(json: &Value) -> Option<MediaInfo> {
    let secs: f64 = json
        .get("format")?
        .get("duration")?
        .as_str()?
        .trim()
        .parse()
        .ok()?;

    let codec_types: Vec<&str> = json
        .get("streams")
        .and_then(|s| s.as_array())
        .map(|streams| {
            streams
                .iter()
                .filter_map(|s| s.get("codec_type").and_then(|c| c.as_str()))
                .collect()
        })
        .unwrap_or_default();

    Some(MediaInfo {
        duration: Ticks::from_secs_f64(secs),
        has_video: codec_types.contains(&"video"),
        has_audio: codec_types.contains(&"audio"),
    })
}

/// Table-driven probe keyed by file name.
///
/// Files without an entry fall back to the default, if one is set.
#[derive(Debug, Clone, Default)]
pub struct FixedMediaProbe {
    entries: HashMap<String, MediaInfo>,
    default: Option<MediaInfo>,
}

impl FixedMediaProbe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register media info for a file name.
    pub fn with(mut self, file_name: impl Into<String>, info: MediaInfo) -> Self {
        self.entries.insert(file_name.into(), info);
        self
    }

    /// Info used for unregistered files.
    pub fn with_default(mut self, info: MediaInfo) -> Self {
        self.default = Some(info);
        self
    }
}

impl MediaProbe for FixedMediaProbe {
    fn probe(&self, path: &Path) -> HostResult<MediaInfo> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        self.entries
            .get(&name)
            .copied()
            .or(self.default)
            .ok_or_else(|| HostError::probe_failed(path, "Unsupported media"))
    }
}
