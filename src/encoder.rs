use std::path::{Path, PathBuf};

use hound::{SampleFormat, WavSpec, WavWriter};
use tracing::debug;

use crate::audio::AudioBuffer;
use crate::error::EncodeError;

/// Where the normalized copy of `title` is written.
pub fn output_path(output_dir: &Path, title: &str) -> PathBuf {
    output_dir.join(format!("{}.wav", title))
}

/// Write `buffer` as 32-bit float PCM WAV to `<output_dir>/<title>.wav`,
/// creating the directory if needed and replacing any existing file.
pub fn encode(
    buffer: &AudioBuffer,
    sample_rate: u32,
    title: &str,
    output_dir: &Path,
) -> Result<PathBuf, EncodeError> {
    std::fs::create_dir_all(output_dir).map_err(|source| EncodeError::DirectoryCreateFailure {
        path: output_dir.to_path_buf(),
        source,
    })?;

    let path = output_path(output_dir, title);
    let write_failure = |source: hound::Error| EncodeError::WriteFailure {
        path: path.clone(),
        source,
    };

    if path.exists() {
        std::fs::remove_file(&path).map_err(|e| write_failure(hound::Error::IoError(e)))?;
    }

    let channels = u16::try_from(buffer.channel_count())
        .ok()
        .filter(|&c| c > 0)
        .ok_or_else(|| write_failure(hound::Error::Unsupported))?;
    let spec = WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };

    let mut writer = WavWriter::create(&path, spec).map_err(write_failure)?;
    for sample in buffer.interleaved() {
        writer.write_sample(sample).map_err(write_failure)?;
    }
    writer.finalize().map_err(write_failure)?;

    debug!(
        path = %path.display(),
        channels,
        samples = buffer.sample_count(),
        sample_rate,
        "wrote track"
    );
    Ok(path)
}
