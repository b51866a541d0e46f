//! Tempo estimation from a spectral-flux onset envelope.

use super::stft::{FRAME_SIZE, HOP_SIZE, Stft};
use super::types::{AnalysisError, DecodedAudio};

/// Beat tracker producing ranked tempo candidates.
///
/// The onset envelope (spectral flux over a Hann-windowed STFT) is
/// autocorrelated at lags corresponding to the valid tempo range; the lag
/// with the highest correlation, refined by parabolic interpolation, is the
/// estimated beat period.
pub struct TempoEstimator {
    min_tempo: f32,
    max_tempo: f32,
}

impl Default for TempoEstimator {
    fn default() -> Self {
        Self::new()
    }
}

impl TempoEstimator {
    pub fn new() -> Self {
        Self {
            min_tempo: 50.0,
            max_tempo: 220.0,
        }
    }

    /// Candidate tempos in BPM, best first.
    ///
    /// The first element is the estimate a caller should use; the rest are
    /// octave alternatives kept for callers that want to resolve
    /// half/double-time ambiguity themselves.
    pub fn candidates(&self, audio: &DecodedAudio) -> Result<Vec<f32>, AnalysisError> {
        if audio.sample_rate == 0 {
            return Err(AnalysisError::InvalidInput(
                "sample rate must be positive".to_string(),
            ));
        }

        let stft = Stft::new(FRAME_SIZE, HOP_SIZE);
        let envelope = onset_envelope(&stft, &audio.samples);
        if envelope.len() < 64 {
            return Err(AnalysisError::Estimation(
                "signal too short for beat tracking".to_string(),
            ));
        }

        let frame_duration = stft.frame_duration(audio.sample_rate);
        self.candidates_from_envelope(&envelope, frame_duration)
    }

    fn candidates_from_envelope(
        &self,
        envelope: &[f32],
        frame_duration: f32,
    ) -> Result<Vec<f32>, AnalysisError> {
        let min_lag = (60.0 / (self.max_tempo * frame_duration)).floor() as usize;
        let max_lag = (60.0 / (self.min_tempo * frame_duration)).ceil() as usize;
        let max_lag = max_lag.min(envelope.len() / 2);

        if min_lag >= max_lag {
            return Err(AnalysisError::Estimation(
                "envelope too short for the configured tempo range".to_string(),
            ));
        }

        // Remove DC bias before correlating.
        let mean = envelope.iter().sum::<f32>() / envelope.len() as f32;
        let centered: Vec<f32> = envelope.iter().map(|&x| x - mean).collect();

        let energy: f32 = centered.iter().map(|&x| x * x).sum();
        if energy < 1e-10 {
            return Err(AnalysisError::Estimation(
                "onset envelope carries no energy".to_string(),
            ));
        }

        let corr_at = |lag: usize| -> f32 {
            let n = centered.len();
            centered[..n - lag]
                .iter()
                .zip(centered[lag..].iter())
                .map(|(&a, &b)| a * b)
                .sum::<f32>()
                / energy
        };

        let mut best_lag = min_lag;
        let mut best_corr = f32::NEG_INFINITY;
        for lag in min_lag..=max_lag {
            let corr = corr_at(lag);
            if corr > best_corr {
                best_corr = corr;
                best_lag = lag;
            }
        }

        if best_corr < 0.05 {
            return Err(AnalysisError::Estimation(
                "no periodicity found in onset envelope".to_string(),
            ));
        }

        // Parabolic interpolation around the peak for sub-frame precision.
        let tempo_lag = if best_lag > min_lag && best_lag < max_lag {
            let prev = corr_at(best_lag - 1);
            let next = corr_at(best_lag + 1);
            let denom = prev - 2.0 * best_corr + next;
            if denom.abs() > 1e-10 {
                best_lag as f32 + 0.5 * (prev - next) / denom
            } else {
                best_lag as f32
            }
        } else {
            best_lag as f32
        };

        let beat_period = tempo_lag * frame_duration;
        if beat_period <= 0.0 {
            return Err(AnalysisError::Estimation(
                "degenerate beat period".to_string(),
            ));
        }
        let bpm = 60.0 / beat_period;

        // Octave ambiguity: fast estimates often double a slower true tempo.
        // Prefer half-tempo when its correlation holds up against the peak.
        let mut candidates = Vec::with_capacity(2);
        let half_lag = (tempo_lag * 2.0).round() as usize;
        if bpm > 160.0 && half_lag <= max_lag && corr_at(half_lag) > best_corr * 0.6 {
            candidates.push(bpm / 2.0);
            candidates.push(bpm);
        } else {
            candidates.push(bpm);
            if bpm / 2.0 >= self.min_tempo {
                candidates.push(bpm / 2.0);
            } else if bpm * 2.0 <= self.max_tempo {
                candidates.push(bpm * 2.0);
            }
        }

        Ok(candidates)
    }
}

/// Normalized spectral flux of the signal.
///
/// Each flux value is normalized by frame energy so that amplitude or bit
/// depth does not affect the magnitude of detected changes.
fn onset_envelope(stft: &Stft, samples: &[f32]) -> Vec<f32> {
    let mut envelope = Vec::with_capacity(stft.frame_count(samples.len()));
    let mut prev: Option<Vec<f32>> = None;

    stft.for_each_frame(samples, |mags| {
        let flux = match prev.as_deref() {
            None => 0.0,
            Some(prev_mags) => {
                let raw: f32 = mags
                    .iter()
                    .zip(prev_mags.iter())
                    .map(|(&curr, &prev)| (curr - prev).max(0.0))
                    .sum();

                let curr_energy: f32 = mags.iter().map(|&m| m * m).sum();
                let prev_energy: f32 = prev_mags.iter().map(|&m| m * m).sum();
                let norm = (curr_energy * prev_energy).sqrt().max(1e-10).sqrt();

                raw / norm
            }
        };
        envelope.push(flux);
        prev = Some(mags.to_vec());
    });

    envelope
}
