use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Per-track decode failures. The track is skipped, the batch continues.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Unsupported format: {}: {reason}", .path.display())]
    UnsupportedFormat { path: PathBuf, reason: String },

    #[error("Corrupt stream: {}: {reason}", .path.display())]
    CorruptStream { path: PathBuf, reason: String },

    #[error("Failed to read {}: {source}", .path.display())]
    IoFailure {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl DecodeError {
    /// Map a codec library error onto the decode taxonomy.
    pub(crate) fn from_symphonia(path: &std::path::Path, err: symphonia::core::errors::Error) -> Self {
        use symphonia::core::errors::Error;

        let path = path.to_path_buf();
        match err {
            Error::IoError(source) => DecodeError::IoFailure { path, source },
            Error::Unsupported(reason) => DecodeError::UnsupportedFormat {
                path,
                reason: reason.to_string(),
            },
            Error::DecodeError(reason) => DecodeError::CorruptStream {
                path,
                reason: reason.to_string(),
            },
            other => DecodeError::CorruptStream {
                path,
                reason: other.to_string(),
            },
        }
    }

    pub fn path(&self) -> &std::path::Path {
        match self {
            DecodeError::UnsupportedFormat { path, .. }
            | DecodeError::CorruptStream { path, .. }
            | DecodeError::IoFailure { path, .. } => path,
        }
    }
}

/// Per-track encode failures. Reported, never fatal to the batch.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("Failed to create output directory {}: {source}", .path.display())]
    DirectoryCreateFailure {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write {}: {source}", .path.display())]
    WriteFailure {
        path: PathBuf,
        #[source]
        source: hound::Error,
    },
}

/// Failures that abort the whole batch.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("Rejected batch: {} non-audio input(s): {}", .paths.len(), display_paths(.paths))]
    NonAudioInputRejected { paths: Vec<PathBuf> },

    #[error("No tracks could be decoded ({attempted} attempted)")]
    AllTracksFailedDecode { attempted: usize },
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symphonia_mapping() {
        use symphonia::core::errors::Error;
        let path = std::path::Path::new("a.flac");

        let err = DecodeError::from_symphonia(path, Error::Unsupported("no reader"));
        assert!(matches!(err, DecodeError::UnsupportedFormat { .. }));

        let err = DecodeError::from_symphonia(path, Error::DecodeError("bad frame"));
        assert!(matches!(err, DecodeError::CorruptStream { .. }));

        let io = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        let err = DecodeError::from_symphonia(path, Error::IoError(io));
        assert!(matches!(err, DecodeError::IoFailure { .. }));
        assert_eq!(err.path(), path);
    }

    #[test]
    fn test_batch_error_messages() {
        let err = BatchError::NonAudioInputRejected {
            paths: vec![PathBuf::from("notes.txt")],
        };
        assert!(err.to_string().contains("notes.txt"));

        let err = BatchError::AllTracksFailedDecode { attempted: 0 };
        assert_eq!(err.to_string(), "No tracks could be decoded (0 attempted)");
    }
}
