use std::path::PathBuf;

use directories::{BaseDirs, UserDirs};

/// Folder the normalized files land in, under the user's desktop.
pub const OUTPUT_FOLDER_NAME: &str = "BatchNormalizeOutput";

/// Runtime settings for one batch run.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub output_dir: PathBuf,
    /// Worker threads for the decode, analyze and encode passes.
    pub jobs: usize,
}

impl BatchConfig {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            jobs: default_jobs(),
        }
    }

    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self::new(default_output_dir())
    }
}

/// `<desktop>/BatchNormalizeOutput`, falling back to the home directory
/// and then the working directory when no desktop is known.
pub fn default_output_dir() -> PathBuf {
    let base = UserDirs::new()
        .and_then(|dirs| dirs.desktop_dir().map(PathBuf::from))
        .or_else(|| BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."));
    base.join(OUTPUT_FOLDER_NAME)
}

/// Return the default number of parallel jobs (number of CPU cores).
pub fn default_jobs() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}
