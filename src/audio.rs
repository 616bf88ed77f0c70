use std::path::PathBuf;

/// Owned planar block of `f32` samples. Every channel holds the same
/// number of samples.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AudioBuffer {
    channels: Vec<Vec<f32>>,
    sample_count: usize,
}

impl AudioBuffer {
    /// Allocate a silent buffer of `channel_count` x `sample_count`.
    pub fn new(channel_count: usize, sample_count: usize) -> Self {
        Self {
            channels: vec![vec![0.0; sample_count]; channel_count],
            sample_count,
        }
    }

    /// Build a buffer from per-channel sample vectors.
    /// Returns `None` if the channels differ in length.
    pub fn from_channels(channels: Vec<Vec<f32>>) -> Option<Self> {
        let sample_count = channels.first().map(Vec::len).unwrap_or(0);
        if channels.iter().any(|ch| ch.len() != sample_count) {
            return None;
        }
        Some(Self {
            channels,
            sample_count,
        })
    }

    /// De-interleave `samples` into `channel_count` channels.
    /// A trailing partial frame is dropped.
    pub fn from_interleaved(samples: &[f32], channel_count: usize) -> Self {
        if channel_count == 0 {
            return Self::default();
        }
        let sample_count = samples.len() / channel_count;
        let mut channels = vec![Vec::with_capacity(sample_count); channel_count];
        for frame in samples.chunks_exact(channel_count) {
            for (ch, &s) in channels.iter_mut().zip(frame) {
                ch.push(s);
            }
        }
        Self {
            channels,
            sample_count,
        }
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Number of samples per channel.
    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty() || self.sample_count == 0
    }

    pub fn channel(&self, index: usize) -> &[f32] {
        &self.channels[index]
    }

    pub fn channels(&self) -> impl Iterator<Item = &[f32]> {
        self.channels.iter().map(Vec::as_slice)
    }

    pub fn channels_mut(&mut self) -> impl Iterator<Item = &mut [f32]> {
        self.channels.iter_mut().map(Vec::as_mut_slice)
    }

    /// Iterate samples frame by frame (L R L R ...).
    pub fn interleaved(&self) -> impl Iterator<Item = f32> + '_ {
        (0..self.sample_count)
            .flat_map(move |frame| self.channels.iter().map(move |ch| ch[frame]))
    }

    /// Append `frames` samples per channel from a planar slice laid out
    /// channel after channel. Used while decoding packet by packet.
    pub(crate) fn extend_planar(&mut self, planar: &[f32], frames: usize) {
        if frames == 0 {
            return;
        }
        for (ch, chunk) in self.channels.iter_mut().zip(planar.chunks_exact(frames)) {
            ch.extend_from_slice(chunk);
        }
        self.sample_count += frames;
    }

    /// Empty buffer with `channel_count` channels, ready for `extend_planar`.
    pub(crate) fn with_channels(channel_count: usize) -> Self {
        Self {
            channels: vec![Vec::new(); channel_count],
            sample_count: 0,
        }
    }
}

/// One successfully decoded input file.
#[derive(Debug, Clone)]
pub struct Track {
    pub title: String,
    pub source: PathBuf,
    pub sample_rate: u32,
    pub buffer: AudioBuffer,
    /// Malformed packets dropped while decoding.
    pub skipped_packets: usize,
}

impl Track {
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.buffer.sample_count() as f64 / self.sample_rate as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_channels_rejects_ragged() {
        assert!(AudioBuffer::from_channels(vec![vec![0.0; 3], vec![0.0; 2]]).is_none());
        let buf = AudioBuffer::from_channels(vec![vec![0.1; 4], vec![0.2; 4]]).unwrap();
        assert_eq!(buf.channel_count(), 2);
        assert_eq!(buf.sample_count(), 4);
    }

    #[test]
    fn test_interleave_roundtrip() {
        let interleaved = [0.1, -0.1, 0.2, -0.2, 0.3, -0.3];
        let buf = AudioBuffer::from_interleaved(&interleaved, 2);
        assert_eq!(buf.channel(0), &[0.1, 0.2, 0.3]);
        assert_eq!(buf.channel(1), &[-0.1, -0.2, -0.3]);
        let back: Vec<f32> = buf.interleaved().collect();
        assert_eq!(back, interleaved);
    }

    #[test]
    fn test_extend_planar() {
        let mut buf = AudioBuffer::with_channels(2);
        buf.extend_planar(&[1.0, 2.0, 3.0, 4.0], 2);
        buf.extend_planar(&[5.0, 6.0], 1);
        assert_eq!(buf.sample_count(), 3);
        assert_eq!(buf.channel(0), &[1.0, 2.0, 5.0]);
        assert_eq!(buf.channel(1), &[3.0, 4.0, 6.0]);
    }

    #[test]
    fn test_empty() {
        assert!(AudioBuffer::new(0, 100).is_empty());
        assert!(AudioBuffer::new(2, 0).is_empty());
        assert!(!AudioBuffer::new(1, 1).is_empty());
    }
}
