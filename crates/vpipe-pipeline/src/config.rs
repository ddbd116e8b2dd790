//! Pipeline configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use vpipe_client::ServiceClientConfig;
use vpipe_models::{FinalVideoSettings, ProxySettings};

/// Pipeline configuration, built once and handed to `VideoPipeline::new`.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Remote service endpoints, timeout and proxies
    pub client: ServiceClientConfig,
    /// Root of `videos/` and `scripts/`
    pub resource_root: PathBuf,
    /// Root of `tasks/`
    pub storage_root: PathBuf,
    /// Fixed styling sent with every final-assembly call
    pub assembly: FinalVideoSettings,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            client: ServiceClientConfig::default(),
            resource_root: PathBuf::from("resource"),
            storage_root: PathBuf::from("storage"),
            assembly: FinalVideoSettings::default(),
        }
    }
}

impl PipelineConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            client: ServiceClientConfig {
                base_url: std::env::var("PIPELINE_SERVICE_URL")
                    .unwrap_or_else(|_| "http://127.0.0.1:8080".to_string()),
                download_base_url: std::env::var("PIPELINE_DOWNLOAD_URL")
                    .ok()
                    .filter(|s| !s.trim().is_empty()),
                timeout: std::env::var("PIPELINE_REQUEST_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .map(Duration::from_secs),
                proxy: ProxySettings::from_env(),
            },
            resource_root: absolute(
                std::env::var("PIPELINE_RESOURCE_DIR").unwrap_or_else(|_| "resource".to_string()),
            ),
            storage_root: absolute(
                std::env::var("PIPELINE_STORAGE_DIR").unwrap_or_else(|_| "storage".to_string()),
            ),
            assembly: FinalVideoSettings::default(),
        }
    }
}

/// Paths are handed to remote services, so relative roots are anchored at the
/// current directory.
fn absolute(path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.client.base_url, "http://127.0.0.1:8080");
        assert_eq!(config.resource_root, PathBuf::from("resource"));
        assert_eq!(config.storage_root, PathBuf::from("storage"));
        assert_eq!(config.assembly.n_threads, 8);
    }

    #[test]
    fn test_absolute_anchors_relative_paths() {
        assert_eq!(absolute("/srv/resource"), PathBuf::from("/srv/resource"));
        assert!(absolute("resource").is_absolute());
        assert!(absolute("resource").ends_with("resource"));
    }
}
