//! API configuration.

use std::path::PathBuf;

use vpipe_models::ProxySettings;

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// CORS origins
    pub cors_origins: Vec<String>,
    /// Max request body size
    pub max_body_size: usize,
    /// Environment (development/production)
    pub environment: String,
    /// Version reported by the service
    pub project_version: String,
    /// Where yt-dlp writes downloaded videos
    pub downloads_dir: PathBuf,
    /// yt-dlp executable (name on PATH or absolute path)
    pub ytdlp_binary: String,
    /// Serve Prometheus metrics at /metrics
    pub metrics_enabled: bool,
    /// Outbound proxies handed to yt-dlp
    pub proxy: ProxySettings,
    /// Changelog generation at startup
    pub changelog: ChangelogConfig,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            cors_origins: vec!["*".to_string()],
            max_body_size: 1024 * 1024, // 1MB
            environment: "development".to_string(),
            project_version: "1.0.0".to_string(),
            downloads_dir: PathBuf::from("downloads"),
            ytdlp_binary: "yt-dlp".to_string(),
            metrics_enabled: true,
            proxy: ProxySettings::default(),
            changelog: ChangelogConfig::default(),
        }
    }
}

impl ApiConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("API_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(8000),
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|s| s.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or_else(|_| vec!["*".to_string()]),
            max_body_size: std::env::var("MAX_BODY_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1024 * 1024),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            project_version: std::env::var("PROJECT_VERSION").unwrap_or_else(|_| "1.0.0".to_string()),
            downloads_dir: std::env::var("DOWNLOADS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("downloads")),
            ytdlp_binary: std::env::var("YTDLP_BINARY").unwrap_or_else(|_| "yt-dlp".to_string()),
            metrics_enabled: std::env::var("METRICS_ENABLED")
                .map(|v| parse_flag(&v))
                .unwrap_or(true),
            proxy: ProxySettings::from_env(),
            changelog: ChangelogConfig::from_env(),
        }
    }

    /// Check if running in production mode.
    pub fn is_production(&self) -> bool {
        self.environment.to_lowercase() == "production"
    }
}

/// Changelog generation settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangelogConfig {
    pub enabled: bool,
    /// Git repository to read history from
    pub repository: PathBuf,
    /// Output file
    pub output: PathBuf,
    /// Version assigned to commits newer than the latest tag
    pub bump_version: String,
}

impl Default for ChangelogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            repository: PathBuf::from("."),
            output: PathBuf::from("changelog/CHANGELOG.md"),
            bump_version: "1.1.2".to_string(),
        }
    }
}

impl ChangelogConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            enabled: std::env::var("CHANGELOG_ENABLED")
                .map(|v| parse_flag(&v))
                .unwrap_or(defaults.enabled),
            repository: std::env::var("CHANGELOG_REPOSITORY")
                .map(PathBuf::from)
                .unwrap_or(defaults.repository),
            output: std::env::var("CHANGELOG_OUTPUT")
                .map(PathBuf::from)
                .unwrap_or(defaults.output),
            bump_version: std::env::var("CHANGELOG_VERSION").unwrap_or(defaults.bump_version),
        }
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "true" | "1" | "yes" | "on")
}
