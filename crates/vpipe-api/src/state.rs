//! Application state.

use std::sync::Arc;

use vpipe_media::{VideoDownloader, YtDlpDownloader};

use crate::config::ApiConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub downloader: Arc<dyn VideoDownloader>,
}

impl AppState {
    /// Create application state with the yt-dlp downloader.
    pub fn new(config: ApiConfig) -> Self {
        let downloader = YtDlpDownloader::new(config.downloads_dir.clone(), config.proxy.clone())
            .with_binary(config.ytdlp_binary.clone());
        Self::with_downloader(config, Arc::new(downloader))
    }

    /// Create application state around any downloader.
    pub fn with_downloader(config: ApiConfig, downloader: Arc<dyn VideoDownloader>) -> Self {
        Self { config, downloader }
    }
}
