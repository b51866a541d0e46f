//! The batch pipeline: scan, analyze each file in order, assemble the
//! catalog, write it.
//!
//! Processing is sequential; each file is fully handled before the next
//! begins. Per-file estimation failures degrade (fallback tempo, omitted
//! key) and only setup or write failures abort the run.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::analysis::{KeyDetector, TempoDetector};
use crate::catalog::{self, TrackCatalog, TrackRecord};
use crate::config::{BpmPolicy, DurationPolicy, Settings};
use crate::library::{self, ScanError};
use crate::probe::DurationProbe;

/// Tempo stamped on a track when estimation fails or is disabled.
pub const FALLBACK_BPM: u32 = 120;

#[derive(Debug)]
pub struct RunReport {
    pub written: usize,
    pub skipped: usize,
    pub output: PathBuf,
}

#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error("no matching audio files in {}", .0.display())]
    NoFiles(PathBuf),
    #[error("every file was skipped; nothing was written")]
    NothingProduced,
    #[error(transparent)]
    Cue(#[from] catalog::CueError),
    #[error(transparent)]
    Write(#[from] catalog::WriteError),
}

pub struct Pipeline {
    settings: Settings,
}

impl Pipeline {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    /// Run the whole pipeline once and report what was written.
    pub fn run(
        &self,
        probe: &dyn DurationProbe,
        tempo: &dyn TempoDetector,
        key: &dyn KeyDetector,
    ) -> Result<RunReport, RunError> {
        let dir = &self.settings.library.dir;
        let files = library::scan(dir, &self.settings.library)?;
        if files.is_empty() {
            return Err(RunError::NoFiles(dir.clone()));
        }

        println!("Found {} tracks to analyze\n", files.len());
        log::debug!(
            "backends: probe={}, tempo={}, key={}",
            probe.name(),
            tempo.name(),
            key.name()
        );

        let mut tracks: Vec<TrackRecord> = Vec::with_capacity(files.len());
        let mut skipped = 0usize;
        for (index, path) in files.iter().enumerate() {
            match self.process(index, path, probe, tempo, key)? {
                Some(record) => {
                    tracks.push(record);
                    println!();
                }
                None => skipped += 1,
            }
        }

        if tracks.is_empty() {
            return Err(RunError::NothingProduced);
        }

        let output = self.output_path();
        let written = tracks.len();
        catalog::write_catalog(&TrackCatalog { tracks }, &output, self.settings.output.pretty)?;

        println!("✓ Generated metadata for {written} tracks");
        println!("✓ Written to: {}", output.display());

        Ok(RunReport {
            written,
            skipped,
            output,
        })
    }

    /// Process one file. `Ok(None)` means the duration policy skipped it;
    /// the file still consumed its palette slot via `index`.
    fn process(
        &self,
        index: usize,
        path: &Path,
        probe: &dyn DurationProbe,
        tempo: &dyn TempoDetector,
        key: &dyn KeyDetector,
    ) -> Result<Option<TrackRecord>, RunError> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("UNKNOWN")
            .to_string();
        println!("Analyzing: {name}");

        let duration = match probe.probe(path) {
            Ok(secs) => secs as u32,
            Err(err) => match self.settings.analysis.duration {
                DurationPolicy::Skip => {
                    log::warn!("could not get duration for {name}, skipping: {err}");
                    return Ok(None);
                }
                DurationPolicy::Fallback(secs) => {
                    log::warn!("could not get duration for {name}, assuming {secs}s: {err}");
                    secs
                }
            },
        };

        let bpm = match self.settings.analysis.bpm {
            BpmPolicy::Fixed(value) => value,
            BpmPolicy::Estimate => match tempo.tempo_candidates(path) {
                Ok(candidates) => match candidates.first() {
                    Some(best) => best.round() as u32,
                    None => {
                        log::warn!("no tempo candidates for {name}, assuming {FALLBACK_BPM}");
                        FALLBACK_BPM
                    }
                },
                Err(err) => {
                    log::warn!("could not detect BPM for {name}: {err}");
                    FALLBACK_BPM
                }
            },
        };
        println!("  BPM: {bpm}");

        let key = match key.dominant_pitch_class(path) {
            Ok(pitch_class) => {
                println!("  Key: {pitch_class}");
                Some(pitch_class)
            }
            Err(err) => {
                log::warn!("could not detect key for {name}: {err}");
                None
            }
        };

        let cue_points = catalog::generate_cue_points(duration, bpm)?;

        let filename = path
            .strip_prefix(&self.settings.library.dir)
            .ok()
            .and_then(|p| p.to_str())
            .map(str::to_string)
            .unwrap_or_else(|| name.clone());

        Ok(Some(TrackRecord {
            id: catalog::track_id(&name),
            title: catalog::track_title(&name),
            artist: self.settings.output.artist.clone(),
            bpm,
            duration,
            filename,
            cue_points,
            waveform_color: catalog::waveform_color(index).to_string(),
            key,
        }))
    }

    fn output_path(&self) -> PathBuf {
        match &self.settings.output.path {
            Some(path) => path.clone(),
            None => self
                .settings
                .library
                .dir
                .join(&self.settings.output.filename),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{AnalysisError, PitchClass};
    use crate::probe::ProbeError;
    use std::fs;
    use tempfile::TempDir;

    struct StubProbe {
        seconds: f64,
        fail_for: Vec<String>,
    }

    impl StubProbe {
        fn fixed(seconds: f64) -> Self {
            Self {
                seconds,
                fail_for: Vec::new(),
            }
        }

        fn failing_for(seconds: f64, names: &[&str]) -> Self {
            Self {
                seconds,
                fail_for: names.iter().map(|s| s.to_string()).collect(),
            }
        }
    }

    impl DurationProbe for StubProbe {
        fn probe(&self, path: &Path) -> Result<f64, ProbeError> {
            let name = path.file_name().unwrap().to_str().unwrap();
            if self.fail_for.iter().any(|f| f == name) {
                return Err(ProbeError::Parse {
                    output: "N/A".to_string(),
                });
            }
            Ok(self.seconds)
        }

        fn name(&self) -> &'static str {
            "stub"
        }
    }

    struct StubTempo(Vec<f32>);

    impl TempoDetector for StubTempo {
        fn tempo_candidates(&self, _path: &Path) -> Result<Vec<f32>, AnalysisError> {
            Ok(self.0.clone())
        }

        fn name(&self) -> &'static str {
            "stub"
        }
    }

    struct FailingTempo;

    impl TempoDetector for FailingTempo {
        fn tempo_candidates(&self, _path: &Path) -> Result<Vec<f32>, AnalysisError> {
            Err(AnalysisError::Estimation("stub failure".to_string()))
        }

        fn name(&self) -> &'static str {
            "stub"
        }
    }

    struct StubKey(Option<PitchClass>);

    impl KeyDetector for StubKey {
        fn dominant_pitch_class(&self, _path: &Path) -> Result<PitchClass, AnalysisError> {
            self.0
                .ok_or_else(|| AnalysisError::Estimation("stub failure".to_string()))
        }

        fn name(&self) -> &'static str {
            "stub"
        }
    }

    fn library_with(names: &[&str]) -> (TempDir, Settings) {
        let dir = tempfile::tempdir().unwrap();
        for name in names {
            fs::write(dir.path().join(name), b"not a real mp3").unwrap();
        }
        let mut settings = Settings::default();
        settings.library.dir = dir.path().to_path_buf();
        (dir, settings)
    }

    fn read_output(settings: &Settings) -> serde_json::Value {
        let path = settings.library.dir.join(&settings.output.filename);
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
    }

    #[test]
    fn three_files_produce_three_records_in_sorted_order() {
        let (_dir, settings) = library_with(&["b.mp3", "a.mp3", "c.mp3"]);
        let pipeline = Pipeline::new(settings.clone());

        let report = pipeline
            .run(
                &StubProbe::fixed(200.0),
                &StubTempo(vec![120.0]),
                &StubKey(Some(PitchClass::A)),
            )
            .unwrap();
        assert_eq!(report.written, 3);
        assert_eq!(report.skipped, 0);

        let doc = read_output(&settings);
        let tracks = doc["tracks"].as_array().unwrap();
        assert_eq!(tracks.len(), 3);

        let ids: Vec<&str> = tracks.iter().map(|t| t["id"].as_str().unwrap()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);

        for (i, track) in tracks.iter().enumerate() {
            assert_eq!(track["artist"], "Pixabay");
            assert_eq!(track["bpm"], 120);
            assert_eq!(track["duration"], 200);
            assert_eq!(track["key"], "A");
            assert_eq!(
                track["cuePoints"],
                serde_json::json!([0, 32, 64, 96, 128, 160])
            );
            assert_eq!(track["waveformColor"], catalog::PALETTE[i]);
        }
    }

    #[test]
    fn duration_is_truncated_not_rounded() {
        let (_dir, settings) = library_with(&["a.mp3"]);
        let pipeline = Pipeline::new(settings.clone());
        pipeline
            .run(
                &StubProbe::fixed(212.9),
                &StubTempo(vec![120.0]),
                &StubKey(None),
            )
            .unwrap();

        let doc = read_output(&settings);
        assert_eq!(doc["tracks"][0]["duration"], 212);
    }

    #[test]
    fn first_tempo_candidate_wins_and_is_rounded() {
        let (_dir, settings) = library_with(&["a.mp3"]);
        let pipeline = Pipeline::new(settings.clone());
        pipeline
            .run(
                &StubProbe::fixed(200.0),
                &StubTempo(vec![87.6, 175.2]),
                &StubKey(None),
            )
            .unwrap();

        let doc = read_output(&settings);
        assert_eq!(doc["tracks"][0]["bpm"], 88);
    }

    #[test]
    fn failed_tempo_estimation_falls_back_to_120() {
        let (_dir, settings) = library_with(&["a.mp3"]);
        let pipeline = Pipeline::new(settings.clone());
        pipeline
            .run(&StubProbe::fixed(200.0), &FailingTempo, &StubKey(None))
            .unwrap();

        let doc = read_output(&settings);
        assert_eq!(doc["tracks"][0]["bpm"], 120);
    }

    #[test]
    fn failed_key_estimation_omits_the_field() {
        let (_dir, settings) = library_with(&["a.mp3"]);
        let pipeline = Pipeline::new(settings.clone());
        pipeline
            .run(
                &StubProbe::fixed(200.0),
                &StubTempo(vec![120.0]),
                &StubKey(None),
            )
            .unwrap();

        let doc = read_output(&settings);
        assert!(doc["tracks"][0].get("key").is_none());
    }

    #[test]
    fn skip_policy_drops_the_file_but_keeps_its_palette_slot() {
        let (_dir, settings) = library_with(&["a.mp3", "b.mp3", "c.mp3"]);
        let pipeline = Pipeline::new(settings.clone());

        let report = pipeline
            .run(
                &StubProbe::failing_for(200.0, &["b.mp3"]),
                &StubTempo(vec![120.0]),
                &StubKey(None),
            )
            .unwrap();
        assert_eq!(report.written, 2);
        assert_eq!(report.skipped, 1);

        let doc = read_output(&settings);
        let tracks = doc["tracks"].as_array().unwrap();
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0]["id"], "a");
        assert_eq!(tracks[1]["id"], "c");
        // b.mp3 sat at index 1, so c keeps palette slot 2.
        assert_eq!(tracks[0]["waveformColor"], catalog::PALETTE[0]);
        assert_eq!(tracks[1]["waveformColor"], catalog::PALETTE[2]);
    }

    #[test]
    fn fallback_policy_substitutes_duration_and_keeps_the_file() {
        let (_dir, mut settings) = library_with(&["a.mp3", "b.mp3"]);
        settings.analysis.duration = crate::config::DurationPolicy::Fallback(180);
        let pipeline = Pipeline::new(settings.clone());

        let report = pipeline
            .run(
                &StubProbe::failing_for(200.0, &["a.mp3"]),
                &StubTempo(vec![120.0]),
                &StubKey(None),
            )
            .unwrap();
        assert_eq!(report.written, 2);
        assert_eq!(report.skipped, 0);

        let doc = read_output(&settings);
        assert_eq!(doc["tracks"][0]["duration"], 180);
        assert_eq!(doc["tracks"][1]["duration"], 200);
    }

    #[test]
    fn fixed_bpm_policy_never_calls_the_estimator() {
        struct PanickingTempo;
        impl TempoDetector for PanickingTempo {
            fn tempo_candidates(&self, _path: &Path) -> Result<Vec<f32>, AnalysisError> {
                panic!("estimator must not run under a fixed bpm policy");
            }
            fn name(&self) -> &'static str {
                "panic"
            }
        }

        let (_dir, mut settings) = library_with(&["a.mp3"]);
        settings.analysis.bpm = crate::config::BpmPolicy::Fixed(128);
        let pipeline = Pipeline::new(settings.clone());
        pipeline
            .run(&StubProbe::fixed(200.0), &PanickingTempo, &StubKey(None))
            .unwrap();

        let doc = read_output(&settings);
        assert_eq!(doc["tracks"][0]["bpm"], 128);
    }

    #[test]
    fn empty_directory_is_a_setup_error_and_writes_nothing() {
        let (_dir, settings) = library_with(&[]);
        let pipeline = Pipeline::new(settings.clone());

        let err = pipeline
            .run(
                &StubProbe::fixed(200.0),
                &StubTempo(vec![120.0]),
                &StubKey(None),
            )
            .unwrap_err();
        assert!(matches!(err, RunError::NoFiles(_)));
        assert!(!settings.library.dir.join(&settings.output.filename).exists());
    }

    #[test]
    fn missing_directory_is_a_scan_error() {
        let mut settings = Settings::default();
        settings.library.dir = PathBuf::from("/tmp/trackdeck-no-such-library");
        let pipeline = Pipeline::new(settings);

        let err = pipeline
            .run(
                &StubProbe::fixed(200.0),
                &StubTempo(vec![120.0]),
                &StubKey(None),
            )
            .unwrap_err();
        assert!(matches!(err, RunError::Scan(_)));
    }

    #[test]
    fn all_files_skipped_writes_nothing_and_errors() {
        let (_dir, settings) = library_with(&["a.mp3"]);
        let pipeline = Pipeline::new(settings.clone());

        let err = pipeline
            .run(
                &StubProbe::failing_for(200.0, &["a.mp3"]),
                &StubTempo(vec![120.0]),
                &StubKey(None),
            )
            .unwrap_err();
        assert!(matches!(err, RunError::NothingProduced));
        assert!(!settings.library.dir.join(&settings.output.filename).exists());
    }

    #[test]
    fn output_path_override_wins() {
        let (dir, mut settings) = library_with(&["a.mp3"]);
        let target = dir.path().join("elsewhere.json");
        settings.output.path = Some(target.clone());
        let pipeline = Pipeline::new(settings);

        let report = pipeline
            .run(
                &StubProbe::fixed(200.0),
                &StubTempo(vec![120.0]),
                &StubKey(None),
            )
            .unwrap();
        assert_eq!(report.output, target);
        assert!(target.exists());
    }

    #[test]
    fn reruns_are_idempotent_with_deterministic_inputs() {
        let (_dir, settings) = library_with(&["a.mp3", "b.mp3"]);
        let pipeline = Pipeline::new(settings.clone());
        let probe = StubProbe::fixed(200.0);
        let tempo = StubTempo(vec![120.0]);
        let key = StubKey(Some(PitchClass::FSharp));

        pipeline.run(&probe, &tempo, &key).unwrap();
        let first = fs::read_to_string(settings.library.dir.join(&settings.output.filename))
            .unwrap();
        pipeline.run(&probe, &tempo, &key).unwrap();
        let second = fs::read_to_string(settings.library.dir.join(&settings.output.filename))
            .unwrap();

        assert_eq!(first, second);
    }
}
