//! Cue-point generation.

use thiserror::Error;

/// 16 bars of 4/4 = 64 beats between suggested mix-in points.
const BEATS_PER_INTERVAL: f64 = 64.0;

/// Cue points never land inside the final fade-out.
const END_GUARD_SECS: f64 = 10.0;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CueError {
    #[error("bpm must be positive")]
    NonPositiveBpm,
}

/// Cue points for a track: 0, then one every 16 bars, stopping 10 seconds
/// short of the end.
///
/// Always returns at least `[0]`; for `duration <= 10` that is all.
pub fn generate_cue_points(duration: u32, bpm: u32) -> Result<Vec<u32>, CueError> {
    if bpm == 0 {
        return Err(CueError::NonPositiveBpm);
    }

    let seconds_per_beat = 60.0 / f64::from(bpm);
    let interval = seconds_per_beat * BEATS_PER_INTERVAL;
    let limit = f64::from(duration) - END_GUARD_SECS;

    let mut cue_points = vec![0u32];
    let mut current = interval;
    while current < limit {
        cue_points.push(current as u32);
        current += interval;
    }

    Ok(cue_points)
}
