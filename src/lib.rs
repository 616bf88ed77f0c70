pub mod analyzer;
pub mod audio;
pub mod config;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod format;
pub mod gain;
pub mod models;
pub mod pipeline;
pub mod report;
