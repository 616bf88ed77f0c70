use crate::audio::AudioBuffer;

/// Maximum absolute sample of each channel.
pub fn channel_peaks(buffer: &AudioBuffer) -> Vec<f32> {
    buffer
        .channels()
        .map(|ch| ch.iter().fold(0.0f32, |peak, &s| peak.max(s.abs())))
        .collect()
}

/// Absolute peak across every sample of every channel.
/// An empty buffer has a peak of 0.
pub fn peak(buffer: &AudioBuffer) -> f32 {
    channel_peaks(buffer).into_iter().fold(0.0f32, f32::max)
}

/// Running min/max over per-track peaks.
///
/// `merge` is associative and commutative, so partial results from
/// independent workers can be combined in any order.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PeakStats {
    pub count: usize,
    pub min: f32,
    pub max: f32,
}

impl PeakStats {
    pub fn push(&mut self, peak: f32) {
        self.merge(&PeakStats {
            count: 1,
            min: peak,
            max: peak,
        });
    }

    pub fn merge(&mut self, other: &PeakStats) {
        if other.count == 0 {
            return;
        }
        if self.count == 0 {
            *self = *other;
            return;
        }
        self.count += other.count;
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

impl FromIterator<f32> for PeakStats {
    fn from_iter<I: IntoIterator<Item = f32>>(iter: I) -> Self {
        let mut stats = PeakStats::default();
        for peak in iter {
            stats.push(peak);
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peak_mono() {
        let buf = AudioBuffer::from_channels(vec![vec![0.1, -0.7, 0.3]]).unwrap();
        assert_eq!(peak(&buf), 0.7);
    }

    #[test]
    fn test_peak_takes_loudest_channel() {
        // The loudest sample lives in the second channel
        let buf = AudioBuffer::from_channels(vec![vec![0.2, -0.1], vec![0.05, -0.9]]).unwrap();
        assert_eq!(channel_peaks(&buf), vec![0.2, 0.9]);
        assert_eq!(peak(&buf), 0.9);
    }

    #[test]
    fn test_peak_above_full_scale() {
        let buf = AudioBuffer::from_channels(vec![vec![1.25, -0.5]]).unwrap();
        assert_eq!(peak(&buf), 1.25);
    }

    #[test]
    fn test_peak_empty_buffer() {
        assert_eq!(peak(&AudioBuffer::default()), 0.0);
        assert_eq!(peak(&AudioBuffer::new(2, 0)), 0.0);
        assert_eq!(peak(&AudioBuffer::new(0, 16)), 0.0);
    }

    #[test]
    fn test_peak_stats() {
        let stats: PeakStats = [0.5, 0.25, 0.75].into_iter().collect();
        assert_eq!(stats.count, 3);
        assert_eq!(stats.min, 0.25);
        assert_eq!(stats.max, 0.75);
        assert!(PeakStats::default().is_empty());
    }

    #[test]
    fn test_peak_stats_merge_order_independent() {
        let a: PeakStats = [0.5, 0.1].into_iter().collect();
        let b: PeakStats = [0.9].into_iter().collect();
        let empty = PeakStats::default();

        let mut ab = a;
        ab.merge(&b);
        let mut ba = b;
        ba.merge(&empty);
        ba.merge(&a);

        assert_eq!(ab, ba);
        assert_eq!(ab.count, 3);
        assert_eq!(ab.min, 0.1);
        assert_eq!(ab.max, 0.9);
    }
}
