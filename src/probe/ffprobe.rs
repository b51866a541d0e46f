use std::path::Path;
use std::process::Command;

use super::{DurationProbe, ProbeError};

/// Duration prober backed by the `ffprobe` binary.
///
/// Only the narrow "print the container duration as a decimal string"
/// surface is used, so any prober honoring that contract can stand in
/// via `ffprobe_binary` in the settings.
pub struct FfprobeProbe {
    binary: String,
}

impl FfprobeProbe {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl DurationProbe for FfprobeProbe {
    fn probe(&self, path: &Path) -> Result<f64, ProbeError> {
        let output = Command::new(&self.binary)
            .args([
                "-v",
                "error",
                "-show_entries",
                "format=duration",
                "-of",
                "default=noprint_wrappers=1:nokey=1",
            ])
            .arg(path)
            .output()
            .map_err(|source| ProbeError::Launch {
                binary: self.binary.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(ProbeError::Failed {
                binary: self.binary.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        parse_duration(&String::from_utf8_lossy(&output.stdout))
    }

    fn name(&self) -> &'static str {
        "ffprobe"
    }
}

fn parse_duration(stdout: &str) -> Result<f64, ProbeError> {
    let trimmed = stdout.trim();
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|secs| secs.is_finite() && *secs >= 0.0)
        .ok_or_else(|| ProbeError::Parse {
            output: trimmed.to_string(),
        })
}
