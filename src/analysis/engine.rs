//! Production analyzer: decode a window, run the estimators.

use std::path::Path;

use crate::config::AnalysisSettings;

use super::decode::decode_window;
use super::key::{PitchClass, dominant_pitch_class};
use super::tempo::TempoEstimator;
use super::types::{AnalysisError, KeyDetector, TempoDetector};

/// Runs the in-process estimators over symphonia-decoded samples.
///
/// Tempo looks at the head of the track (2 minutes by default), key at a
/// shorter window (30 seconds by default); both windows come from the
/// analysis settings.
pub struct SignalAnalyzer {
    settings: AnalysisSettings,
    tempo: TempoEstimator,
}

impl SignalAnalyzer {
    pub fn new(settings: AnalysisSettings) -> Self {
        Self {
            settings,
            tempo: TempoEstimator::new(),
        }
    }
}

impl TempoDetector for SignalAnalyzer {
    fn tempo_candidates(&self, path: &Path) -> Result<Vec<f32>, AnalysisError> {
        let audio = decode_window(path, self.settings.tempo_window_secs)?;
        log::debug!(
            "decoded {:.1}s at {} Hz from {} for beat tracking",
            audio.duration_secs(),
            audio.sample_rate,
            path.display()
        );
        self.tempo.candidates(&audio)
    }

    fn name(&self) -> &'static str {
        "signal"
    }
}

impl KeyDetector for SignalAnalyzer {
    fn dominant_pitch_class(&self, path: &Path) -> Result<PitchClass, AnalysisError> {
        let audio = decode_window(path, self.settings.key_window_secs)?;
        dominant_pitch_class(&audio)
    }

    fn name(&self) -> &'static str {
        "signal"
    }
}
