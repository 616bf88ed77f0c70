use std::fs::File;
use std::path::{Path, PathBuf};

use symphonia::core::audio::{SampleBuffer, SignalSpec};
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, warn};

use crate::audio::{AudioBuffer, Track};
use crate::error::DecodeError;

/// Extensions accepted into a batch.
pub const AUDIO_EXTENSIONS: &[&str] = &["flac", "wav", "mp3", "aiff"];

/// Check if a path has a recognized audio file extension.
pub fn is_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| AUDIO_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// List the regular files of a directory, sorted by filename.
/// Non-audio files are kept so the batch can reject them.
pub fn scan_files(path: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(path)
        .into_iter()
        .flatten()
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .collect();
    files.sort();
    files
}

/// Last path segment with its final extension removed.
pub fn derive_title(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "Unknown".to_string())
}

/// Decode an entire file into memory.
pub fn decode(path: &Path) -> Result<Track, DecodeError> {
    let file = File::open(path).map_err(|source| DecodeError::IoFailure {
        path: path.to_path_buf(),
        source,
    })?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(|e| DecodeError::from_symphonia(path, e))?;

    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| DecodeError::CorruptStream {
            path: path.to_path_buf(),
            reason: "no audio track found".to_string(),
        })?;

    let codec_params = track.codec_params.clone();
    let track_id = track.id;
    let mut sample_rate = codec_params.sample_rate;

    let mut decoder = symphonia::default::get_codecs()
        .make(&codec_params, &DecoderOptions::default())
        .map_err(|e| DecodeError::from_symphonia(path, e))?;

    let mut buffer = codec_params
        .channels
        .map(|c| AudioBuffer::with_channels(c.count()));
    let mut sample_buf: Option<(SampleBuffer<f32>, SignalSpec, u64)> = None;
    let mut skipped_packets = 0usize;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(ref e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => return Err(DecodeError::from_symphonia(path, e)),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            Err(SymphoniaError::DecodeError(reason)) => {
                skipped_packets += 1;
                warn!(path = %path.display(), reason, "skipping malformed packet");
                continue;
            }
            Err(e) => return Err(DecodeError::from_symphonia(path, e)),
        };

        let spec = *decoded.spec();
        let frames = decoded.frames();
        if frames == 0 {
            continue;
        }
        sample_rate.get_or_insert(spec.rate);

        let out = buffer.get_or_insert_with(|| AudioBuffer::with_channels(spec.channels.count()));
        if out.channel_count() != spec.channels.count() {
            return Err(DecodeError::CorruptStream {
                path: path.to_path_buf(),
                reason: format!(
                    "channel count changed mid-stream ({} -> {})",
                    out.channel_count(),
                    spec.channels.count()
                ),
            });
        }

        // Reuse the SampleBuffer across packets; reallocate only when the
        // spec changes or capacity is insufficient.
        let needs_alloc = match &sample_buf {
            Some((_, buf_spec, capacity)) => *buf_spec != spec || *capacity < frames as u64,
            None => true,
        };
        if needs_alloc {
            sample_buf = Some((SampleBuffer::new(frames as u64, spec), spec, frames as u64));
        }
        if let Some((buf, _, _)) = sample_buf.as_mut() {
            buf.copy_planar_ref(decoded);
            out.extend_planar(buf.samples(), frames);
        }
    }

    let buffer = buffer.unwrap_or_default();
    let sample_rate = sample_rate.filter(|&r| r > 0).ok_or_else(|| DecodeError::CorruptStream {
        path: path.to_path_buf(),
        reason: "unknown sample rate".to_string(),
    })?;

    let title = derive_title(path);
    debug!(
        title = %title,
        channels = buffer.channel_count(),
        samples = buffer.sample_count(),
        sample_rate,
        skipped_packets,
        "decoded track"
    );

    Ok(Track {
        title,
        source: path.to_path_buf(),
        sample_rate,
        buffer,
        skipped_packets,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_audio_file() {
        assert!(is_audio_file(Path::new("track.flac")));
        assert!(is_audio_file(Path::new("track.MP3")));
        assert!(is_audio_file(Path::new("track.wav")));
        assert!(is_audio_file(Path::new("track.aiff")));
        assert!(!is_audio_file(Path::new("track.ogg")));
        assert!(!is_audio_file(Path::new("readme.txt")));
        assert!(!is_audio_file(Path::new("noextension")));
    }

    #[test]
    fn test_derive_title() {
        assert_eq!(derive_title(Path::new("/music/01 - Intro.flac")), "01 - Intro");
        assert_eq!(derive_title(Path::new("mix.final.wav")), "mix.final");
        assert_eq!(derive_title(Path::new("bare")), "bare");
    }

    #[test]
    fn test_decode_missing_file() {
        let err = decode(Path::new("/definitely/not/here.wav")).unwrap_err();
        assert!(matches!(err, DecodeError::IoFailure { .. }));
    }

    #[test]
    fn test_decode_garbage_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("noise.mp3");
        std::fs::write(&path, b"this is not an audio stream at all").unwrap();
        let err = decode(&path).unwrap_err();
        assert_eq!(err.path(), path.as_path());
    }
}
