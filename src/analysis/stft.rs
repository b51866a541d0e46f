//! Shared short-time Fourier transform plumbing for the estimators.

use std::sync::Arc;

use rustfft::{Fft, FftPlanner, num_complex::Complex};

pub(crate) const FRAME_SIZE: usize = 2048;
pub(crate) const HOP_SIZE: usize = 512;

/// Hann-windowed magnitude STFT over a mono signal.
pub(crate) struct Stft {
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    frame_size: usize,
    hop_size: usize,
}

impl Stft {
    pub(crate) fn new(frame_size: usize, hop_size: usize) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(frame_size);
        Self {
            fft,
            window: hann_window(frame_size),
            frame_size,
            hop_size,
        }
    }

    /// Number of frames `magnitudes` will visit for a signal of `len` samples.
    pub(crate) fn frame_count(&self, len: usize) -> usize {
        if len < self.frame_size {
            0
        } else {
            (len - self.frame_size) / self.hop_size + 1
        }
    }

    /// Seconds covered by one hop at the given sample rate.
    pub(crate) fn frame_duration(&self, sample_rate: u32) -> f32 {
        self.hop_size as f32 / sample_rate as f32
    }

    /// Visit the magnitude spectrum of every frame in order.
    ///
    /// Only the bins up to Nyquist (`frame_size / 2 + 1`) are passed to the
    /// callback. Frames are materialized one at a time, so a two-minute
    /// window never holds the full spectrogram in memory.
    pub(crate) fn for_each_frame(&self, samples: &[f32], mut visit: impl FnMut(&[f32])) {
        let nyquist = self.frame_size / 2 + 1;
        let mut buffer = vec![Complex::new(0.0f32, 0.0f32); self.frame_size];
        let mut magnitudes = vec![0.0f32; nyquist];

        let mut start = 0;
        while start + self.frame_size <= samples.len() {
            for (i, (sample, w)) in samples[start..start + self.frame_size]
                .iter()
                .zip(self.window.iter())
                .enumerate()
            {
                buffer[i] = Complex::new(sample * w, 0.0);
            }
            self.fft.process(&mut buffer);
            for (mag, bin) in magnitudes.iter_mut().zip(buffer.iter()) {
                *mag = bin.norm();
            }
            visit(&magnitudes);
            start += self.hop_size;
        }
    }
}

fn hann_window(size: usize) -> Vec<f32> {
    let denom = (size - 1) as f32;
    (0..size)
        .map(|n| 0.5 - 0.5 * (2.0 * std::f32::consts::PI * n as f32 / denom).cos())
        .collect()
}
