use serde::Serialize;

use crate::analysis::PitchClass;

/// One entry in the metadata document, shaped the way the deck player
/// reads it (camelCase wire names, `key` absent when undetected).
#[derive(Debug, Clone, Serialize)]
pub struct TrackRecord {
    pub id: String,
    pub title: String,
    pub artist: String,
    pub bpm: u32,
    /// Whole seconds.
    pub duration: u32,
    /// File name relative to the scanned directory.
    pub filename: String,
    #[serde(rename = "cuePoints")]
    pub cue_points: Vec<u32>,
    #[serde(rename = "waveformColor")]
    pub waveform_color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<PitchClass>,
}

/// The whole output document: `{"tracks": [...]}`.
#[derive(Debug, Clone, Serialize)]
pub struct TrackCatalog {
    pub tracks: Vec<TrackRecord>,
}
