//! Pipeline error types.

use std::path::PathBuf;

/// Fatal failures. These abort the current build or dev session.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Failed to clean output directory {path}: {source}")]
    Clean {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid glob pattern {pattern}: {source}")]
    Pattern {
        pattern: String,
        source: globset::Error,
    },
}

/// Per-file transform failures. Reported and counted, never fatal: the
/// remaining files of the task keep processing.
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    #[error("failed to read {path}: {message}")]
    Read { path: String, message: String },

    #[error("include resolution failed: {0}")]
    Include(String),

    #[error("SCSS compilation failed: {0}")]
    Scss(String),

    #[error("CSS processing failed: {0}")]
    Css(String),

    #[error("JS minification failed: {0}")]
    Js(String),

    #[error("image processing failed: {0}")]
    Image(String),

    #[error("failed to write {path}: {message}")]
    Write { path: String, message: String },
}
