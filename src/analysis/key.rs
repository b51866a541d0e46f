//! Key estimation from a time-averaged chromagram.

use serde::Serialize;

use super::stft::{FRAME_SIZE, HOP_SIZE, Stft};
use super::types::{AnalysisError, DecodedAudio};

/// The musical range folded into pitch classes. Bins outside it carry
/// mostly rumble and noise.
const MIN_FREQ: f32 = 60.0;
const MAX_FREQ: f32 = 4000.0;

/// One of the 12 chromatic pitch classes, starting at C.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum PitchClass {
    #[serde(rename = "C")]
    C,
    #[serde(rename = "C#")]
    CSharp,
    #[serde(rename = "D")]
    D,
    #[serde(rename = "D#")]
    DSharp,
    #[serde(rename = "E")]
    E,
    #[serde(rename = "F")]
    F,
    #[serde(rename = "F#")]
    FSharp,
    #[serde(rename = "G")]
    G,
    #[serde(rename = "G#")]
    GSharp,
    #[serde(rename = "A")]
    A,
    #[serde(rename = "A#")]
    ASharp,
    #[serde(rename = "B")]
    B,
}

impl PitchClass {
    pub const ALL: [PitchClass; 12] = [
        PitchClass::C,
        PitchClass::CSharp,
        PitchClass::D,
        PitchClass::DSharp,
        PitchClass::E,
        PitchClass::F,
        PitchClass::FSharp,
        PitchClass::G,
        PitchClass::GSharp,
        PitchClass::A,
        PitchClass::ASharp,
        PitchClass::B,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PitchClass::C => "C",
            PitchClass::CSharp => "C#",
            PitchClass::D => "D",
            PitchClass::DSharp => "D#",
            PitchClass::E => "E",
            PitchClass::F => "F",
            PitchClass::FSharp => "F#",
            PitchClass::G => "G",
            PitchClass::GSharp => "G#",
            PitchClass::A => "A",
            PitchClass::ASharp => "A#",
            PitchClass::B => "B",
        }
    }
}

impl std::fmt::Display for PitchClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Estimate the dominant pitch class of the signal.
///
/// Computes a chromagram (per-frame 12-bin pitch-class energy), averages it
/// across time and picks the class with maximum mean energy.
pub fn dominant_pitch_class(audio: &DecodedAudio) -> Result<PitchClass, AnalysisError> {
    if audio.sample_rate == 0 {
        return Err(AnalysisError::InvalidInput(
            "sample rate must be positive".to_string(),
        ));
    }

    let stft = Stft::new(FRAME_SIZE, HOP_SIZE);
    if stft.frame_count(audio.samples.len()) == 0 {
        return Err(AnalysisError::Estimation(
            "signal too short for chroma analysis".to_string(),
        ));
    }

    let mut chroma = [0.0f64; 12];
    let mut frames = 0usize;
    stft.for_each_frame(&audio.samples, |mags| {
        accumulate_chroma(&mut chroma, mags, audio.sample_rate);
        frames += 1;
    });

    // Averaging across frames does not move the argmax, but keep the
    // profile in per-frame units in case it ever gets reported.
    for bin in &mut chroma {
        *bin /= frames as f64;
    }

    let (index, energy) = chroma
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(b.1))
        .map(|(i, &e)| (i, e))
        .unwrap_or((0, 0.0));
    if energy <= 0.0 {
        return Err(AnalysisError::Estimation(
            "no energy in the musical range".to_string(),
        ));
    }

    Ok(PitchClass::ALL[index])
}

fn accumulate_chroma(chroma: &mut [f64; 12], magnitudes: &[f32], sample_rate: u32) {
    for (bin, &mag) in magnitudes.iter().enumerate() {
        let freq = bin_to_freq(bin, sample_rate);
        if !(MIN_FREQ..=MAX_FREQ).contains(&freq) {
            continue;
        }
        let midi = freq_to_midi(freq);
        let pitch_class = (midi.round() as i32).rem_euclid(12) as usize;
        chroma[pitch_class] += (mag as f64) * (mag as f64);
    }
}

/// Convert an FFT bin index to its center frequency.
fn bin_to_freq(bin: usize, sample_rate: u32) -> f32 {
    bin as f32 * sample_rate as f32 / FRAME_SIZE as f32
}

/// Convert a frequency to a MIDI note number (A4 = 440 Hz = 69).
fn freq_to_midi(freq: f32) -> f32 {
    69.0 + 12.0 * (freq / 440.0).log2()
}
