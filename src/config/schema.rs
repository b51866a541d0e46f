use std::path::PathBuf;

use serde::Deserialize;

/// Top-level generator settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/trackdeck/config.toml` or
/// `~/.config/trackdeck/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `TRACKDECK__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub library: LibrarySettings,
    pub analysis: AnalysisSettings,
    pub output: OutputSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            library: LibrarySettings::default(),
            analysis: AnalysisSettings::default(),
            output: OutputSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LibrarySettings {
    /// Directory scanned for audio files.
    pub dir: PathBuf,
    /// File extensions to treat as audio (case-insensitive, without dot).
    pub extensions: Vec<String>,
    /// Whether to follow symlinks during scanning.
    pub follow_links: bool,
    /// Whether to include hidden files/directories (dotfiles).
    pub include_hidden: bool,
    /// Whether to recurse into subdirectories.
    ///
    /// The deck content folder is flat, so this is off by default.
    pub recursive: bool,
    /// Optional cap on directory recursion depth.
    pub max_depth: Option<usize>,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("public/audio"),
            extensions: vec!["mp3".to_string()],
            follow_links: false,
            include_hidden: false,
            recursive: false,
            max_depth: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    /// How to obtain the BPM of a track.
    pub bpm: BpmPolicy,
    /// What to do with a track whose duration probe fails.
    pub duration: DurationPolicy,
    /// How many leading seconds of audio feed the tempo estimator.
    pub tempo_window_secs: u32,
    /// How many leading seconds of audio feed the key estimator.
    pub key_window_secs: u32,
    /// Name or path of the external duration prober binary.
    pub ffprobe_binary: String,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            bpm: BpmPolicy::Estimate,
            duration: DurationPolicy::Skip,
            tempo_window_secs: 120,
            key_window_secs: 30,
            ffprobe_binary: "ffprobe".to_string(),
        }
    }
}

/// BPM source for a track.
///
/// In TOML either a string or a table:
/// `bpm = "estimate"` or `bpm = { fixed = 120 }`
#[derive(Debug, Copy, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BpmPolicy {
    /// Run beat tracking over the decoded signal (falls back to 120 on failure).
    Estimate,
    /// Stamp every track with this tempo and skip analysis entirely.
    Fixed(u32),
}

/// What happens to a track whose duration probe fails.
///
/// In TOML either a string or a table:
/// `duration = "skip"` or `duration = { fallback = 180 }`
#[derive(Debug, Copy, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DurationPolicy {
    /// Drop the track from the output. Cue points derive from duration,
    /// so a fabricated duration would fabricate cue points too.
    Skip,
    /// Substitute this many seconds and keep the track.
    Fallback(u32),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// File name of the metadata document, written into the scanned directory.
    pub filename: String,
    /// Full output path override. When set, `filename` is ignored.
    pub path: Option<PathBuf>,
    /// Whether to indent the JSON output.
    pub pretty: bool,
    /// Artist stamped into every record.
    pub artist: String,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            filename: "tracks-metadata.json".to_string(),
            path: None,
            pretty: true,
            artist: "Pixabay".to_string(),
        }
    }
}
