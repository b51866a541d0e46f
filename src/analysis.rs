//! Signal analysis: audio decoding, tempo estimation and key estimation.
//!
//! The estimators run over samples decoded in-process; the pipeline talks
//! to them through the `TempoDetector`/`KeyDetector` capability traits so
//! tests can substitute deterministic fakes.

mod decode;
mod engine;
mod key;
mod stft;
mod tempo;
mod types;

pub use decode::decode_window;
pub use engine::SignalAnalyzer;
pub use key::{PitchClass, dominant_pitch_class};
pub use tempo::TempoEstimator;
pub use types::{AnalysisError, DecodedAudio, KeyDetector, TempoDetector};
