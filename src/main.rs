use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

mod analysis;
mod catalog;
mod config;
mod library;
mod pipeline;
mod probe;

use analysis::SignalAnalyzer;
use pipeline::Pipeline;
use probe::FfprobeProbe;

/// Scan a folder of MP3 files and write `tracks-metadata.json` for the deck player.
#[derive(Parser)]
#[command(name = "trackdeck", version, about)]
struct Args {
    /// Directory to scan for audio files (defaults to the configured library directory)
    dir: Option<PathBuf>,

    /// Write the JSON document here instead of `<dir>/tracks-metadata.json`
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Minify the JSON output instead of pretty-printing it
    #[arg(long)]
    compact: bool,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("trackdeck: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    let mut settings = config::load_settings();
    if let Some(dir) = args.dir {
        settings.library.dir = dir;
    }
    if let Some(output) = args.output {
        settings.output.path = Some(output);
    }
    if args.compact {
        settings.output.pretty = false;
    }

    let probe = FfprobeProbe::new(&settings.analysis.ffprobe_binary);
    let analyzer = SignalAnalyzer::new(settings.analysis.clone());

    let pipeline = Pipeline::new(settings);
    let report = pipeline.run(&probe, &analyzer, &analyzer)?;
    log::debug!(
        "run finished: {} written, {} skipped, output {}",
        report.written,
        report.skipped,
        report.output.display()
    );
    Ok(())
}
