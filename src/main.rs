use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use batchnorm::config::{self, BatchConfig};
use batchnorm::format;
use batchnorm::models::{BatchEvent, BatchReport};
use batchnorm::pipeline::{self, BatchPipeline};
use batchnorm::report;

#[derive(Parser)]
#[command(
    name = "batchnorm",
    about = "Normalize a batch of audio files with one shared gain"
)]
struct Cli {
    /// Audio files and/or directories of audio files (flac, wav, mp3, aiff)
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Output directory (default: BatchNormalizeOutput on the desktop)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Number of parallel jobs (default: number of CPU cores)
    #[arg(short = 'j', long)]
    jobs: Option<usize>,

    /// Output the report as JSON instead of a table
    #[arg(long)]
    json: bool,

    /// Also write normalize_report.json and normalize_report.txt into the output directory
    #[arg(long)]
    save_report: bool,

    /// Suppress per-track progress lines
    #[arg(short, long)]
    quiet: bool,
}

fn print_event(event: BatchEvent) {
    match event {
        BatchEvent::TrackDecoded { index, total, title } => {
            eprintln!("[{}/{}] Decoded: {}", index + 1, total, title);
        }
        BatchEvent::DecodeFailed {
            index,
            total,
            path,
            message,
        } => {
            eprintln!("[{}/{}] Skipping {}: {}", index + 1, total, path.display(), message);
        }
        BatchEvent::TrackAnalyzed { .. } => {}
        BatchEvent::GainComputed { gain } => {
            eprintln!("Applying gain {:.4} to all tracks", gain);
        }
        BatchEvent::TrackWritten { index, total, path } => {
            eprintln!("[{}/{}] Wrote: {}", index + 1, total, path.display());
        }
        BatchEvent::EncodeFailed {
            index,
            total,
            path,
            message,
        } => {
            eprintln!("[{}/{}] Failed to write {}: {}", index + 1, total, path.display(), message);
        }
    }
}

fn print_timing(report: &BatchReport, elapsed: std::time::Duration) {
    let audio_secs: f64 = report.tracks.iter().map(|t| t.duration_secs).sum();
    eprintln!(
        "Processed {} tracks ({} of audio) in {:.2}s, {} failed",
        report.written(),
        format::format_duration(audio_secs),
        elapsed.as_secs_f64(),
        report.failures.len(),
    );
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let output_dir = cli.output.unwrap_or_else(config::default_output_dir);
    let jobs = cli.jobs.unwrap_or_else(config::default_jobs);
    let config = BatchConfig::new(output_dir).with_jobs(jobs);

    let inputs = pipeline::collect_inputs(&cli.paths);

    let mut runner = BatchPipeline::new(config);
    if !cli.quiet {
        runner = runner.with_events(print_event);
    }

    let start = Instant::now();
    let report = runner.run(&inputs)?;
    let elapsed = start.elapsed();

    if cli.save_report {
        std::fs::create_dir_all(&report.output_dir)
            .with_context(|| format!("Failed to create {}", report.output_dir.display()))?;
        report::save_report(&report.output_dir, &report).with_context(|| {
            format!("Failed to save JSON report in {}", report.output_dir.display())
        })?;
        report::save_text_report(&report.output_dir, &report).with_context(|| {
            format!("Failed to save text report in {}", report.output_dir.display())
        })?;
    }

    if cli.json {
        println!("{}", format::format_json(&report));
    } else {
        println!("{}", format::format_table(&report));
    }

    if !cli.quiet {
        print_timing(&report, elapsed);
    }

    Ok(())
}
