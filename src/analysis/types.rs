//! Analysis-related small types and capability traits.

use std::path::Path;

use thiserror::Error;

use super::key::PitchClass;

/// Mono samples decoded from the head of an audio file.
#[derive(Debug, Clone)]
pub struct DecodedAudio {
    /// Mono samples, normalized to [-1.0, 1.0].
    pub samples: Vec<f32>,
    /// Sample rate in Hz.
    pub sample_rate: u32,
}

impl DecodedAudio {
    pub fn duration_secs(&self) -> f32 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f32 / self.sample_rate as f32
    }
}

/// Errors that can occur while decoding or estimating.
///
/// These never abort a run: the pipeline logs a warning and falls back
/// per track.
#[derive(Debug, Clone, Error)]
pub enum AnalysisError {
    #[error("decode error: {0}")]
    Decode(String),
    #[error("estimation error: {0}")]
    Estimation(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Tempo detection backend.
pub trait TempoDetector {
    /// Candidate tempos for the track, best first.
    fn tempo_candidates(&self, path: &Path) -> Result<Vec<f32>, AnalysisError>;

    /// Get the name of this detector (for logging).
    fn name(&self) -> &'static str;
}

/// Musical key detection backend.
pub trait KeyDetector {
    /// The dominant pitch class of the track.
    fn dominant_pitch_class(&self, path: &Path) -> Result<PitchClass, AnalysisError>;

    /// Get the name of this detector (for logging).
    fn name(&self) -> &'static str;
}
