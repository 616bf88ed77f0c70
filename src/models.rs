use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::gain::gain_to_db;

/// Batch-wide figures, all in linear amplitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BatchResult {
    pub track_count: usize,
    pub min_peak: f32,
    pub max_peak: f32,
    pub applied_gain: f32,
}

impl BatchResult {
    pub fn min_peak_db(&self) -> f32 {
        gain_to_db(self.min_peak)
    }

    pub fn max_peak_db(&self) -> f32 {
        gain_to_db(self.max_peak)
    }

    pub fn applied_gain_db(&self) -> f32 {
        gain_to_db(self.applied_gain)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackReport {
    pub title: String,
    pub source: PathBuf,
    pub output: PathBuf,
    pub sample_rate: u32,
    pub channels: usize,
    pub duration_secs: f64,
    pub peak: f32,
    pub normalized_peak: f32,
    pub skipped_packets: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureStage {
    Decode,
    Encode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackFailure {
    pub path: PathBuf,
    pub stage: FailureStage,
    pub message: String,
}

/// Everything one run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub result: BatchResult,
    pub output_dir: PathBuf,
    /// Tracks written, in input order
    pub tracks: Vec<TrackReport>,
    pub failures: Vec<TrackFailure>,
}

impl BatchReport {
    pub fn written(&self) -> usize {
        self.tracks.len()
    }
}

/// Progress notifications emitted while a batch runs
#[derive(Debug, Clone)]
pub enum BatchEvent {
    TrackDecoded { index: usize, total: usize, title: String },
    DecodeFailed { index: usize, total: usize, path: PathBuf, message: String },
    TrackAnalyzed { index: usize, title: String, peak: f32 },
    GainComputed { gain: f32 },
    TrackWritten { index: usize, total: usize, path: PathBuf },
    EncodeFailed { index: usize, total: usize, path: PathBuf, message: String },
}
