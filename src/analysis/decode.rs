//! Audio decoding via symphonia.

use std::fs::File;
use std::path::Path;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{CODEC_TYPE_NULL, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use super::types::{AnalysisError, DecodedAudio};

/// Decode up to the first `max_secs` seconds of `path` into mono samples
/// at the file's native sample rate.
///
/// Multi-channel audio is downmixed by averaging the channels.
pub fn decode_window(path: &Path, max_secs: u32) -> Result<DecodedAudio, AnalysisError> {
    if max_secs == 0 {
        return Err(AnalysisError::InvalidInput(
            "decode window must be at least one second".to_string(),
        ));
    }

    let file = File::open(path)
        .map_err(|e| AnalysisError::Decode(format!("failed to open {}: {e}", path.display())))?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| AnalysisError::Decode(format!("failed to probe format: {e}")))?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| AnalysisError::Decode("no audio track found".to_string()))?;

    let track_id = track.id;
    let sample_rate = track.codec_params.sample_rate.unwrap_or(44100);

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| AnalysisError::Decode(format!("failed to create decoder: {e}")))?;

    let max_samples = max_secs as usize * sample_rate as usize;
    let mut mono: Vec<f32> = Vec::with_capacity(max_samples);

    loop {
        let packet = match format.next_packet() {
            Ok(p) => p,
            Err(SymphoniaError::IoError(ref e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(SymphoniaError::ResetRequired) => {
                decoder.reset();
                continue;
            }
            Err(e) => return Err(AnalysisError::Decode(format!("failed to read packet: {e}"))),
        };

        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                let spec = *decoded.spec();
                let channels = spec.channels.count().max(1);
                let mut buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
                buf.copy_interleaved_ref(decoded);
                for frame in buf.samples().chunks_exact(channels) {
                    mono.push(frame.iter().sum::<f32>() / channels as f32);
                }
            }
            Err(SymphoniaError::DecodeError(e)) => {
                // Corrupt packets are recoverable; keep going.
                log::debug!("decode error in {} (skipping packet): {e}", path.display());
                continue;
            }
            Err(e) => return Err(AnalysisError::Decode(format!("decode failed: {e}"))),
        }

        if mono.len() >= max_samples {
            break;
        }
    }

    mono.truncate(max_samples);
    if mono.is_empty() {
        return Err(AnalysisError::Decode(
            "no audio frames decoded".to_string(),
        ));
    }

    Ok(DecodedAudio {
        samples: mono,
        sample_rate,
    })
}
