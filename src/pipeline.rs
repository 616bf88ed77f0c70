use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, info, warn};

use crate::analyzer::{self, PeakStats};
use crate::audio::Track;
use crate::config::BatchConfig;
use crate::decoder;
use crate::encoder;
use crate::error::BatchError;
use crate::gain::{self, BatchGain, TARGET_CEILING_DB};
use crate::models::{BatchEvent, BatchReport, BatchResult, FailureStage, TrackFailure, TrackReport};

/// Receives progress events; may be called from worker threads.
pub type EventSink = Arc<dyn Fn(BatchEvent) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchStage {
    Idle,
    Decoding,
    Analyzing,
    GainComputed,
    Encoding,
    Reported,
    Aborted,
}

/// Expand directories into their files (sorted, non-recursive).
/// Other paths are passed through untouched.
pub fn collect_inputs(paths: &[PathBuf]) -> Vec<PathBuf> {
    paths
        .iter()
        .flat_map(|p| {
            if p.is_dir() {
                decoder::scan_files(p)
            } else {
                vec![p.clone()]
            }
        })
        .collect()
}

/// Reject the whole batch if any input lacks an audio extension.
pub fn validate_inputs(inputs: &[PathBuf]) -> Result<(), BatchError> {
    let rejected: Vec<PathBuf> = inputs
        .iter()
        .filter(|p| !decoder::is_audio_file(p))
        .cloned()
        .collect();
    if rejected.is_empty() {
        Ok(())
    } else {
        Err(BatchError::NonAudioInputRejected { paths: rejected })
    }
}

/// Decode, measure, derive one shared gain, then apply and write.
///
/// Every track is measured before any gain is applied: the batch maximum
/// is only known once the analysis pass has joined.
pub struct BatchPipeline {
    config: BatchConfig,
    stage: BatchStage,
    events: Option<EventSink>,
}

impl BatchPipeline {
    pub fn new(config: BatchConfig) -> Self {
        Self {
            config,
            stage: BatchStage::Idle,
            events: None,
        }
    }

    pub fn with_events(mut self, sink: impl Fn(BatchEvent) + Send + Sync + 'static) -> Self {
        self.events = Some(Arc::new(sink));
        self
    }

    pub fn stage(&self) -> BatchStage {
        self.stage
    }

    fn enter(&mut self, stage: BatchStage) {
        debug!(from = ?self.stage, to = ?stage, "batch stage");
        self.stage = stage;
    }

    pub fn run(&mut self, inputs: &[PathBuf]) -> Result<BatchReport, BatchError> {
        self.stage = BatchStage::Idle;

        if let Err(e) = validate_inputs(inputs) {
            self.enter(BatchStage::Aborted);
            return Err(e);
        }

        let events = self.events.clone();
        let emit = |event: BatchEvent| {
            if let Some(sink) = &events {
                sink(event);
            }
        };
        let jobs = self.config.jobs;
        let output_dir = self.config.output_dir.clone();
        let total = inputs.len();
        let mut failures: Vec<(usize, TrackFailure)> = Vec::new();

        // Pass 1a: decode
        self.enter(BatchStage::Decoding);
        let decoded = run_pool(inputs.to_vec(), jobs, |index, path| {
            let outcome = decoder::decode(&path);
            match &outcome {
                Ok(track) => emit(BatchEvent::TrackDecoded {
                    index,
                    total,
                    title: track.title.clone(),
                }),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping track");
                    emit(BatchEvent::DecodeFailed {
                        index,
                        total,
                        path: path.clone(),
                        message: e.to_string(),
                    });
                }
            }
            outcome
        });

        let mut tracks: Vec<(usize, Track)> = Vec::with_capacity(decoded.len());
        for (index, outcome) in decoded {
            match outcome {
                Ok(track) => tracks.push((index, track)),
                Err(e) => failures.push((
                    index,
                    TrackFailure {
                        path: e.path().to_path_buf(),
                        stage: FailureStage::Decode,
                        message: e.to_string(),
                    },
                )),
            }
        }

        if tracks.is_empty() {
            self.enter(BatchStage::Aborted);
            return Err(BatchError::AllTracksFailedDecode { attempted: total });
        }

        // Pass 1b: measure every track
        self.enter(BatchStage::Analyzing);
        let measured: Vec<&(usize, Track)> = tracks.iter().collect();
        let peaks: Vec<f32> = run_pool(measured, jobs, |_, (index, track)| {
            let peak = analyzer::peak(&track.buffer);
            debug!(title = %track.title, peak, "measured peak");
            emit(BatchEvent::TrackAnalyzed {
                index: *index,
                title: track.title.clone(),
                peak,
            });
            peak
        })
        .into_iter()
        .map(|(_, peak)| peak)
        .collect();
        let stats: PeakStats = peaks.iter().copied().collect();

        self.enter(BatchStage::GainComputed);
        let batch = BatchGain::from_stats(&stats, TARGET_CEILING_DB);
        info!(
            tracks = stats.count,
            min_peak = batch.min_peak,
            max_peak = batch.max_peak,
            gain = batch.gain,
            "computed batch gain"
        );
        emit(BatchEvent::GainComputed { gain: batch.gain });

        // Pass 2: apply and write, one group per output path
        self.enter(BatchStage::Encoding);
        let groups = group_by_output(tracks.into_iter().zip(peaks).collect());
        let written = run_pool(groups, jobs, |_, group| {
            group
                .into_iter()
                .map(|(index, mut track, peak)| {
                    gain::apply_gain(&mut track.buffer, batch.gain);
                    let outcome = match encoder::encode(
                        &track.buffer,
                        track.sample_rate,
                        &track.title,
                        &output_dir,
                    ) {
                        Ok(path) => {
                            emit(BatchEvent::TrackWritten {
                                index,
                                total,
                                path: path.clone(),
                            });
                            Ok(TrackReport {
                                normalized_peak: analyzer::peak(&track.buffer),
                                duration_secs: track.duration_secs(),
                                channels: track.buffer.channel_count(),
                                sample_rate: track.sample_rate,
                                skipped_packets: track.skipped_packets,
                                title: track.title,
                                source: track.source,
                                output: path,
                                peak,
                            })
                        }
                        Err(e) => {
                            warn!(title = %track.title, error = %e, "failed to write track");
                            emit(BatchEvent::EncodeFailed {
                                index,
                                total,
                                path: track.source.clone(),
                                message: e.to_string(),
                            });
                            Err(TrackFailure {
                                path: track.source,
                                stage: FailureStage::Encode,
                                message: e.to_string(),
                            })
                        }
                    };
                    (index, outcome)
                })
                .collect::<Vec<_>>()
        });

        let mut outcomes: Vec<_> = written.into_iter().flat_map(|(_, group)| group).collect();
        outcomes.sort_by_key(|(index, _)| *index);

        let mut reports = Vec::with_capacity(outcomes.len());
        for (index, outcome) in outcomes {
            match outcome {
                Ok(report) => reports.push(report),
                Err(failure) => failures.push((index, failure)),
            }
        }
        failures.sort_by_key(|(index, _)| *index);

        self.enter(BatchStage::Reported);
        info!(
            written = reports.len(),
            failed = failures.len(),
            output_dir = %output_dir.display(),
            "batch complete"
        );

        Ok(BatchReport {
            result: BatchResult {
                track_count: stats.count,
                min_peak: batch.min_peak,
                max_peak: batch.max_peak,
                applied_gain: batch.gain,
            },
            output_dir,
            tracks: reports,
            failures: failures.into_iter().map(|(_, f)| f).collect(),
        })
    }
}

type Pending = (usize, Track, f32);

/// Group tracks that would write the same output file, keeping input
/// order inside each group so the last input for a title wins.
fn group_by_output(tracks: Vec<((usize, Track), f32)>) -> Vec<Vec<Pending>> {
    let mut slots: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<Vec<Pending>> = Vec::new();
    for ((index, track), peak) in tracks {
        // Case-insensitive filesystems map differently cased titles to one file
        let key = track.title.to_lowercase();
        let slot = *slots.entry(key).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[slot].push((index, track, peak));
    }
    groups
}

/// Run `work` over `items` on up to `jobs` threads. Workers pull the next
/// item from a shared queue; results come back sorted by input index.
fn run_pool<T, R, F>(items: Vec<T>, jobs: usize, work: F) -> Vec<(usize, R)>
where
    T: Send,
    R: Send,
    F: Fn(usize, T) -> R + Sync,
{
    let total = items.len();
    let workers = jobs.max(1).min(total);
    let queue = Mutex::new(items.into_iter().enumerate());
    let mut results: Vec<(usize, R)> = Vec::with_capacity(total);

    std::thread::scope(|scope| {
        let mut handles = Vec::with_capacity(workers);
        for _ in 0..workers {
            handles.push(scope.spawn(|| {
                let mut done = Vec::new();
                loop {
                    let next = queue.lock().unwrap_or_else(PoisonError::into_inner).next();
                    let Some((index, item)) = next else {
                        break;
                    };
                    done.push((index, work(index, item)));
                }
                done
            }));
        }
        for handle in handles {
            match handle.join() {
                Ok(done) => results.extend(done),
                Err(panic) => std::panic::resume_unwind(panic),
            }
        }
    });

    results.sort_by_key(|(index, _)| *index);
    results
}
