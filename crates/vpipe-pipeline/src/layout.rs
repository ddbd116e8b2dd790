//! Conventional resource paths.
//!
//! Paths double as existence-based cache keys: a file at the conventional
//! location is reused without any freshness check.

use std::path::{Path, PathBuf};

/// Resolves entity names to their conventional file locations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceLayout {
    resource_root: PathBuf,
    storage_root: PathBuf,
}

impl ResourceLayout {
    pub fn new(resource_root: impl Into<PathBuf>, storage_root: impl Into<PathBuf>) -> Self {
        Self {
            resource_root: resource_root.into(),
            storage_root: storage_root.into(),
        }
    }

    pub fn resource_root(&self) -> &Path {
        &self.resource_root
    }

    pub fn storage_root(&self) -> &Path {
        &self.storage_root
    }

    /// `<resource_root>/videos/<name>.mp4`
    pub fn video_path(&self, video_name: &str) -> PathBuf {
        self.resource_root
            .join("videos")
            .join(format!("{}.mp4", video_name))
    }

    /// `<resource_root>/scripts/<name>`
    pub fn script_path(&self, script_name: &str) -> PathBuf {
        self.resource_root.join("scripts").join(script_name)
    }

    /// `<storage_root>/tasks/<task_id>`
    pub fn task_output_path(&self, task_id: &str) -> PathBuf {
        self.storage_root.join("tasks").join(task_id)
    }
}
