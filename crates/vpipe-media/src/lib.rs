//! yt-dlp wrapper for video downloads.
//!
//! This crate provides:
//! - The `VideoDownloader` seam used by the API server
//! - A yt-dlp backed implementation with format selection and container remuxing
//! - Media error types

pub mod download;
pub mod error;

pub use download::{format_selector, validate_rename, VideoDownloader, YtDlpDownloader};
pub use error::{MediaError, MediaResult};
