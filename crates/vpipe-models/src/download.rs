//! Download endpoint request and response types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use validator::Validate;

/// Error returned when a resolution or container name cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("invalid resolution '{0}', expected 'best', '<height>p', '2k', '4k' or '8k'")]
    InvalidResolution(String),

    #[error("unsupported output format '{0}'")]
    UnsupportedFormat(String),
}

/// Download request accepted by `/api/v2/youtube/download`.
///
/// Sent as query parameters on `GET` or as a JSON body on `POST`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct DownloadRequest {
    /// Source URL (YouTube or any site yt-dlp supports)
    #[validate(url(message = "url must be a valid URL"))]
    pub url: String,
    /// Target resolution, e.g. "1080p". Best available when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
    /// Output container, e.g. "mp4". Defaults to mp4.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_format: Option<String>,
    /// File stem for the downloaded file. Title-based when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rename: Option<String>,
}

impl DownloadRequest {
    /// Create a request for a URL with all options left to defaults.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            resolution: None,
            output_format: None,
            rename: None,
        }
    }

    pub fn with_resolution(mut self, resolution: impl Into<String>) -> Self {
        self.resolution = Some(resolution.into());
        self
    }

    pub fn with_output_format(mut self, format: impl Into<String>) -> Self {
        self.output_format = Some(format.into());
        self
    }

    pub fn with_rename(mut self, rename: impl Into<String>) -> Self {
        self.rename = Some(rename.into());
        self
    }

    /// Parsed target resolution.
    pub fn parsed_resolution(&self) -> Result<Resolution, ParseError> {
        match self.resolution.as_deref() {
            Some(s) => s.parse(),
            None => Ok(Resolution::Best),
        }
    }

    /// Parsed output container.
    pub fn parsed_output_format(&self) -> Result<OutputFormat, ParseError> {
        match self.output_format.as_deref() {
            Some(s) => s.parse(),
            None => Ok(OutputFormat::default()),
        }
    }
}

/// Response envelope of the download endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DownloadEnvelope {
    Success { output_path: String },
    Error { message: String },
}

impl DownloadEnvelope {
    pub fn success(output_path: impl Into<String>) -> Self {
        Self::Success {
            output_path: output_path.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Output path on success, error message otherwise.
    pub fn into_result(self) -> Result<String, String> {
        match self {
            Self::Success { output_path } => Ok(output_path),
            Self::Error { message } => Err(message),
        }
    }
}

/// Target video resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Resolution {
    /// Best stream available
    #[default]
    Best,
    /// Best stream no taller than the given height
    MaxHeight(u32),
}

impl Resolution {
    pub fn max_height(&self) -> Option<u32> {
        match self {
            Resolution::Best => None,
            Resolution::MaxHeight(h) => Some(*h),
        }
    }
}

impl FromStr for Resolution {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        let height = match lower.as_str() {
            "" | "best" => return Ok(Resolution::Best),
            "2k" => 1440,
            "4k" => 2160,
            "8k" => 4320,
            other => other
                .strip_suffix('p')
                .and_then(|n| n.parse::<u32>().ok())
                .filter(|h| *h > 0)
                .ok_or_else(|| ParseError::InvalidResolution(s.to_string()))?,
        };
        Ok(Resolution::MaxHeight(height))
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolution::Best => write!(f, "best"),
            Resolution::MaxHeight(h) => write!(f, "{}p", h),
        }
    }
}

/// Containers yt-dlp can merge into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Mp4,
    Mkv,
    Webm,
    Mov,
    Flv,
    Avi,
}

impl OutputFormat {
    pub const ALL: &'static [OutputFormat] = &[
        OutputFormat::Mp4,
        OutputFormat::Mkv,
        OutputFormat::Webm,
        OutputFormat::Mov,
        OutputFormat::Flv,
        OutputFormat::Avi,
    ];

    /// Container name, also used as the file extension.
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Mp4 => "mp4",
            OutputFormat::Mkv => "mkv",
            OutputFormat::Webm => "webm",
            OutputFormat::Mov => "mov",
            OutputFormat::Flv => "flv",
            OutputFormat::Avi => "avi",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().trim_start_matches('.').to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|f| f.as_str() == lower)
            .ok_or_else(|| ParseError::UnsupportedFormat(s.to_string()))
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
