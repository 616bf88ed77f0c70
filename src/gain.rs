use crate::analyzer::PeakStats;
use crate::audio::AudioBuffer;

/// Level the loudest track of a batch is brought to, in dBFS.
pub const TARGET_CEILING_DB: f32 = -1.0;

/// Convert decibels to a linear amplitude factor.
pub fn db_to_gain(db: f32) -> f32 {
    10f32.powf(db / 20.0)
}

/// Convert a linear amplitude to dBFS. Zero maps to negative infinity.
pub fn gain_to_db(linear: f32) -> f32 {
    if linear <= 0.0 {
        f32::NEG_INFINITY
    } else {
        20.0 * linear.log10()
    }
}

/// Gain shared by every track of a batch, with the extremes it was
/// derived from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatchGain {
    pub min_peak: f32,
    pub max_peak: f32,
    pub gain: f32,
}

impl BatchGain {
    /// Derive the batch gain from every track's peak, using the fixed
    /// target ceiling.
    pub fn from_peaks(peaks: &[f32]) -> Self {
        let stats: PeakStats = peaks.iter().copied().collect();
        Self::from_stats(&stats, TARGET_CEILING_DB)
    }

    /// Derive the gain from an already reduced set of peaks.
    ///
    /// An empty set or an all-silent batch yields unity gain.
    pub fn from_stats(stats: &PeakStats, target_ceiling_db: f32) -> Self {
        if stats.is_empty() {
            return Self {
                min_peak: 0.0,
                max_peak: 0.0,
                gain: 1.0,
            };
        }
        let gain = if stats.max > 0.0 {
            db_to_gain(target_ceiling_db) / stats.max
        } else {
            1.0
        };
        Self {
            min_peak: stats.min,
            max_peak: stats.max,
            gain,
        }
    }
}

/// Gain bringing the loudest of `peaks` to the target ceiling.
pub fn batch_gain(peaks: &[f32]) -> f32 {
    BatchGain::from_peaks(peaks).gain
}

/// Multiply every sample of every channel by `gain`. No clamping.
pub fn apply_gain(buffer: &mut AudioBuffer, gain: f32) {
    if gain == 1.0 {
        return;
    }
    for ch in buffer.channels_mut() {
        for s in ch.iter_mut() {
            *s *= gain;
        }
    }
}
