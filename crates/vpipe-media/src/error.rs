//! Error types for media operations.

use std::path::PathBuf;
use thiserror::Error;
use vpipe_models::ParseError;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur while downloading media.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("yt-dlp not found in PATH")]
    YtDlpNotFound,

    #[error("Download failed: {message}")]
    DownloadFailed { message: String },

    #[error("Invalid download request: {0}")]
    InvalidRequest(#[from] ParseError),

    #[error("Security violation: {0}")]
    SecurityViolation(String),

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl MediaError {
    /// Create a download failure error.
    pub fn download_failed(message: impl Into<String>) -> Self {
        Self::DownloadFailed {
            message: message.into(),
        }
    }

    /// Whether the caller sent something unusable, as opposed to the download itself failing.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            MediaError::InvalidRequest(_) | MediaError::SecurityViolation(_)
        )
    }
}
