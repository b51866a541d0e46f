//! Duration probing.
//!
//! The pipeline depends on a narrow contract: given a file path, report the
//! container duration in seconds or fail. The production implementation
//! shells out to `ffprobe`; tests substitute deterministic stubs.

mod ffprobe;

pub use ffprobe::FfprobeProbe;

use std::path::Path;

use thiserror::Error;

/// Duration probing backend.
pub trait DurationProbe {
    /// Report the duration of `path` in seconds.
    fn probe(&self, path: &Path) -> Result<f64, ProbeError>;

    /// Get the name of this prober (for logging).
    fn name(&self) -> &'static str;
}

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("failed to launch {binary}: {source}")]
    Launch {
        binary: String,
        source: std::io::Error,
    },
    #[error("{binary} exited with {status}: {stderr}")]
    Failed {
        binary: String,
        status: std::process::ExitStatus,
        stderr: String,
    },
    #[error("could not parse duration from prober output {output:?}")]
    Parse { output: String },
}
