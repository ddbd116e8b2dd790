//! Video download using yt-dlp.
//!
//! Downloads the best combined video+audio stream no taller than the requested
//! resolution and remuxes it into the requested container. The final file path
//! is read back from yt-dlp's `after_move:filepath` print.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

use vpipe_models::{DownloadRequest, OutputFormat, ProxySettings, Resolution};

use crate::error::{MediaError, MediaResult};

/// Output template used when the caller does not pick a file name.
const TITLE_TEMPLATE: &str = "%(title)s [%(id)s].%(ext)s";

/// Something that can turn a download request into a local media file.
#[async_trait]
pub trait VideoDownloader: Send + Sync {
    /// Download the requested video and return the path of the written file.
    async fn download(&self, request: &DownloadRequest) -> MediaResult<PathBuf>;
}

/// yt-dlp backed downloader writing into a fixed downloads directory.
#[derive(Debug, Clone)]
pub struct YtDlpDownloader {
    downloads_dir: PathBuf,
    proxy: ProxySettings,
    binary: String,
}

impl YtDlpDownloader {
    /// Create a downloader writing into `downloads_dir`.
    pub fn new(downloads_dir: impl Into<PathBuf>, proxy: ProxySettings) -> Self {
        Self {
            downloads_dir: downloads_dir.into(),
            proxy,
            binary: "yt-dlp".to_string(),
        }
    }

    /// Use a different yt-dlp executable (name on PATH or absolute path).
    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    pub fn downloads_dir(&self) -> &Path {
        &self.downloads_dir
    }

    /// Build the yt-dlp argument list for a request.
    fn build_args(
        &self,
        url: &str,
        resolution: Resolution,
        format: OutputFormat,
        rename: Option<&str>,
    ) -> Vec<String> {
        let template = match rename {
            Some(name) => format!("{}.%(ext)s", name),
            None => TITLE_TEMPLATE.to_string(),
        };
        let output = self.downloads_dir.join(template);

        let mut args = vec![
            "--no-playlist".to_string(),
            "--no-progress".to_string(),
            "-f".to_string(),
            format_selector(resolution),
            "--merge-output-format".to_string(),
            format.as_str().to_string(),
            "--remux-video".to_string(),
            format.as_str().to_string(),
            "-o".to_string(),
            output.to_string_lossy().into_owned(),
            "--print".to_string(),
            "after_move:filepath".to_string(),
            "--no-simulate".to_string(),
        ];

        if let Some(proxy) = self.proxy.preferred() {
            args.push("--proxy".to_string());
            args.push(proxy.to_string());
        }

        args.push(url.to_string());
        args
    }
}

#[async_trait]
impl VideoDownloader for YtDlpDownloader {
    async fn download(&self, request: &DownloadRequest) -> MediaResult<PathBuf> {
        let resolution = request.parsed_resolution()?;
        let format = request.parsed_output_format()?;
        let rename = request.rename.as_deref().map(validate_rename).transpose()?;

        which::which(&self.binary).map_err(|_| MediaError::YtDlpNotFound)?;

        tokio::fs::create_dir_all(&self.downloads_dir).await?;

        info!(
            url = %request.url,
            resolution = %resolution,
            format = %format,
            dir = %self.downloads_dir.display(),
            "Downloading video"
        );

        let args = self.build_args(&request.url, resolution, format, rename);
        let output = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            debug!("yt-dlp stderr: {}", stderr);
            let error_msg = stderr
                .lines()
                .rev()
                .find(|l| !l.trim().is_empty())
                .unwrap_or("Unknown error");
            return Err(MediaError::download_failed(format!(
                "yt-dlp failed: {}",
                error_msg
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let path = match (parse_printed_path(&stdout), rename) {
            (Some(path), _) => path,
            (None, Some(name)) => self
                .downloads_dir
                .join(format!("{}.{}", name, format.as_str())),
            (None, None) => return Err(MediaError::download_failed("Output file not created")),
        };

        if !path.exists() {
            return Err(MediaError::FileNotFound(path));
        }

        let file_size = path.metadata()?.len();
        info!(
            output = %path.display(),
            size_mb = file_size as f64 / (1024.0 * 1024.0),
            "Downloaded video successfully"
        );

        Ok(path)
    }
}

/// yt-dlp format selector for a target resolution.
pub fn format_selector(resolution: Resolution) -> String {
    match resolution.max_height() {
        Some(h) => format!("bestvideo[height<={h}]+bestaudio/best[height<={h}]"),
        None => "bestvideo+bestaudio/best".to_string(),
    }
}

/// Check that a rename hint is a bare file stem.
pub fn validate_rename(name: &str) -> MediaResult<&str> {
    let trimmed = name.trim();
    if trimmed.is_empty()
        || trimmed == "."
        || trimmed.contains("..")
        || trimmed.contains('/')
        || trimmed.contains('\\')
        || trimmed.contains('\0')
    {
        return Err(MediaError::SecurityViolation(format!(
            "rename must be a plain file name, got '{}'",
            name
        )));
    }
    Ok(trimmed)
}

/// Last non-empty stdout line, which is what `--print after_move:filepath` emits.
fn parse_printed_path(stdout: &str) -> Option<PathBuf> {
    stdout
        .lines()
        .rev()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .map(PathBuf::from)
}
