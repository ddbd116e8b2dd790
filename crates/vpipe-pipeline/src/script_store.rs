//! Edit script persistence.

use std::path::{Path, PathBuf};

use tracing::info;
use vpipe_models::EditScript;

use crate::error::{PipelineError, PipelineResult};

/// Write a script as pretty-printed UTF-8 JSON, creating parent directories.
///
/// Non-ASCII text is written verbatim and object keys come out in sorted
/// order, so saving the same script twice produces identical bytes.
pub async fn save_script_to_json(script: &EditScript, script_path: &Path) -> PipelineResult<PathBuf> {
    if let Some(parent) = script_path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| PipelineError::storage(parent, e))?;
    }

    let json = serde_json::to_string_pretty(script).map_err(|source| PipelineError::InvalidScript {
        path: script_path.to_path_buf(),
        source,
    })?;

    tokio::fs::write(script_path, json)
        .await
        .map_err(|e| PipelineError::storage(script_path, e))?;

    info!(path = %script_path.display(), segments = script.len(), "Saved edit script");
    Ok(script_path.to_path_buf())
}

/// Read a script previously written by [`save_script_to_json`] (or by hand).
pub async fn load_script(script_path: &Path) -> PipelineResult<EditScript> {
    let contents = tokio::fs::read_to_string(script_path)
        .await
        .map_err(|e| PipelineError::storage(script_path, e))?;

    serde_json::from_str(&contents).map_err(|source| PipelineError::InvalidScript {
        path: script_path.to_path_buf(),
        source,
    })
}
