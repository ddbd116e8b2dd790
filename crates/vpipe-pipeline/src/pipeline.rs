//! Pipeline orchestration.
//!
//! A run is a straight sequence of steps, each awaited before the next:
//! 1. Reuse the video at its conventional path, or download it
//! 2. Reuse the script at its conventional path, or generate it
//! 3. Save the script back to its conventional path
//! 4. Crop sub-clips
//! 5. Start final assembly
//!
//! Nothing is retried and nothing is rolled back: a downloaded video or a
//! saved script survives a later failure.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::Instrument;

use vpipe_client::{ServiceClient, ServiceClientConfig};
use vpipe_models::{
    CropRequest, DownloadRequest, EditScript, FinalVideoPayload, FinalVideoRequest,
    FinalVideoSettings, GenerateScriptRequest, ScriptGenerationParams,
};

use crate::config::PipelineConfig;
use crate::error::{ErrorKind, PipelineError, PipelineResult};
use crate::layout::ResourceLayout;
use crate::logging::RunLogger;
use crate::script_store::{load_script, save_script_to_json};

/// Video name used when the caller does not pick one.
pub const DEFAULT_VIDEO_NAME: &str = "null";

/// Resolution requested from the download endpoint.
const DOWNLOAD_RESOLUTION: &str = "1080p";

/// Container requested from the download endpoint; matches the `.mp4` conventional path.
const DOWNLOAD_FORMAT: &str = "mp4";

/// Inputs of one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineRun {
    pub task_id: String,
    /// File name under `<resource_root>/scripts/`
    pub script_name: String,
    /// Where to download the video from when it is not on disk yet
    pub source_url: Option<String>,
    /// Stem of the file under `<resource_root>/videos/`
    pub video_name: String,
    pub generation: ScriptGenerationParams,
    pub voice_name: String,
}

impl PipelineRun {
    pub fn new(task_id: impl Into<String>, script_name: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            script_name: script_name.into(),
            source_url: None,
            video_name: DEFAULT_VIDEO_NAME.to_string(),
            generation: ScriptGenerationParams::default(),
            voice_name: vpipe_models::assembly::DEFAULT_VOICE_NAME.to_string(),
        }
    }

    pub fn with_source_url(mut self, url: impl Into<String>) -> Self {
        self.source_url = Some(url.into());
        self
    }

    pub fn with_video_name(mut self, name: impl Into<String>) -> Self {
        self.video_name = name.into();
        self
    }

    pub fn with_generation(mut self, generation: ScriptGenerationParams) -> Self {
        self.generation = generation;
        self
    }

    pub fn with_voice(mut self, voice_name: impl Into<String>) -> Self {
        self.voice_name = voice_name.into();
        self
    }

    /// Video stem used for both the conventional path and the download
    /// rename; today's date when no name was given.
    pub fn effective_video_name(&self) -> String {
        if self.video_name.trim().is_empty() {
            chrono::Local::now().format("%Y-%m-%d").to_string()
        } else {
            self.video_name.clone()
        }
    }
}

/// Result of a pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PipelineOutcome {
    /// Assembly was accepted; the video will appear at `path` once the
    /// remote service finishes.
    Pending { path: PathBuf },
    Error { error: String, kind: ErrorKind },
}

impl PipelineOutcome {
    pub fn is_pending(&self) -> bool {
        matches!(self, PipelineOutcome::Pending { .. })
    }

    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            PipelineOutcome::Error { kind, .. } => Some(*kind),
            PipelineOutcome::Pending { .. } => None,
        }
    }
}

/// Orchestrates the remote services for a run.
#[derive(Debug, Clone)]
pub struct VideoPipeline {
    client: ServiceClient,
    layout: ResourceLayout,
    assembly: FinalVideoSettings,
}

impl VideoPipeline {
    /// Create a pipeline from configuration.
    pub fn new(config: PipelineConfig) -> PipelineResult<Self> {
        let client = ServiceClient::new(config.client)?;
        Ok(Self::from_parts(
            client,
            ResourceLayout::new(config.resource_root, config.storage_root),
            config.assembly,
        ))
    }

    pub fn from_parts(
        client: ServiceClient,
        layout: ResourceLayout,
        assembly: FinalVideoSettings,
    ) -> Self {
        Self {
            client,
            layout,
            assembly,
        }
    }

    pub fn layout(&self) -> &ResourceLayout {
        &self.layout
    }

    pub fn client_config(&self) -> &ServiceClientConfig {
        self.client.config()
    }

    /// Run the whole sequence. Never fails: errors become an error outcome.
    pub async fn run_pipeline(&self, run: &PipelineRun) -> PipelineOutcome {
        let logger = RunLogger::new(&run.task_id, "pipeline");
        let span = logger.create_span();

        match self.execute(run, &logger).instrument(span).await {
            Ok(path) => {
                logger.log_completion(&format!(
                    "final video pending at {}",
                    path.display()
                ));
                PipelineOutcome::Pending { path }
            }
            Err(e) => {
                logger.log_error(&e.to_string());
                PipelineOutcome::Error {
                    error: e.to_string(),
                    kind: e.kind(),
                }
            }
        }
    }

    /// Run the whole sequence, returning the expected output location.
    pub async fn try_run(&self, run: &PipelineRun) -> PipelineResult<PathBuf> {
        let logger = RunLogger::new(&run.task_id, "pipeline");
        let span = logger.create_span();
        self.execute(run, &logger).instrument(span).await
    }

    async fn execute(&self, run: &PipelineRun, logger: &RunLogger) -> PipelineResult<PathBuf> {
        logger.log_start(&format!(
            "video={} script={}",
            run.video_name, run.script_name
        ));

        let video_path = self.resolve_video(run, logger).await?;

        let script_path = self.layout.script_path(&run.script_name);
        let script = self
            .resolve_script(run, &video_path, &script_path, logger)
            .await?;

        save_script_to_json(&script, &script_path).await?;

        logger.log_progress("cropping sub-clips");
        let subclip_videos = self
            .client
            .crop_video(&CropRequest {
                video_origin_path: video_path.clone(),
                video_script: script.clone(),
            })
            .await?;

        logger.log_progress(&format!(
            "starting final assembly with {} sub-clips",
            subclip_videos.len()
        ));
        let payload = FinalVideoPayload {
            request: FinalVideoRequest {
                video_clip_json: script,
                video_clip_json_path: path_string(&script_path),
                video_origin_path: video_path,
                settings: self.assembly.clone().with_voice(&run.voice_name),
            },
            subclip_videos,
        };
        self.client
            .generate_final_video(&run.task_id, &payload)
            .await?;

        Ok(self.layout.task_output_path(&run.task_id))
    }

    /// Conventional video path if the file exists, otherwise the downloaded path.
    async fn resolve_video(&self, run: &PipelineRun, logger: &RunLogger) -> PipelineResult<String> {
        let video_name = run.effective_video_name();
        let video_path = self.layout.video_path(&video_name);

        if video_path.exists() {
            logger.log_progress(&format!("video exists: {}", video_path.display()));
            return Ok(path_string(&video_path));
        }

        let url = run
            .source_url
            .as_deref()
            .ok_or_else(|| PipelineError::MissingPrecondition {
                path: video_path.clone(),
            })?;

        logger.log_progress(&format!("video missing, downloading {}", video_name));
        let request = DownloadRequest::new(url)
            .with_resolution(DOWNLOAD_RESOLUTION)
            .with_output_format(DOWNLOAD_FORMAT)
            .with_rename(video_name);
        let downloaded = self.client.download_video(&request).await?;

        if Path::new(&downloaded) != video_path {
            logger.log_warning(&format!(
                "downloaded to {} rather than {}; later runs will download again",
                downloaded,
                video_path.display()
            ));
        }

        Ok(downloaded)
    }

    /// Script from disk if present, otherwise freshly generated.
    async fn resolve_script(
        &self,
        run: &PipelineRun,
        video_path: &str,
        script_path: &Path,
        logger: &RunLogger,
    ) -> PipelineResult<EditScript> {
        if script_path.exists() {
            logger.log_progress(&format!("loading script {}", script_path.display()));
            return load_script(script_path).await;
        }

        logger.log_progress(&format!("generating script for {}", run.video_name));
        let script = self
            .client
            .generate_script(&GenerateScriptRequest {
                video_path: video_path.to_string(),
                params: run.generation.clone(),
            })
            .await?;
        logger.log_progress(&format!("script generated with {} segments", script.len()));

        Ok(script)
    }
}

fn path_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_run_defaults() {
        let run = PipelineRun::new("task-1", "test.json");
        assert_eq!(run.video_name, "null");
        assert_eq!(run.voice_name, "zh-CN-YunjianNeural");
        assert_eq!(run.generation.threshold, 30);
        assert!(run.source_url.is_none());
        assert_eq!(run.effective_video_name(), "null");
    }

    #[test]
    fn test_blank_video_name_resolves_to_todays_date() {
        let run = PipelineRun::new("task-1", "test.json").with_video_name("");
        let name = run.effective_video_name();
        assert_eq!(name.len(), "2024-11-19".len());
        assert_eq!(name, chrono::Local::now().format("%Y-%m-%d").to_string());
    }

    #[test]
    fn test_outcome_wire_format() {
        let pending = PipelineOutcome::Pending {
            path: PathBuf::from("/storage/tasks/task-1"),
        };
        assert_eq!(
            serde_json::to_value(&pending).unwrap(),
            json!({"status": "pending", "path": "/storage/tasks/task-1"})
        );

        let failed = PipelineOutcome::Error {
            error: "crop rejected: HTTP 500".to_string(),
            kind: ErrorKind::RemoteRejected,
        };
        assert_eq!(
            serde_json::to_value(&failed).unwrap(),
            json!({"status": "error", "error": "crop rejected: HTTP 500", "kind": "remote_rejected"})
        );
        assert_eq!(failed.kind(), Some(ErrorKind::RemoteRejected));
        assert!(!failed.is_pending());
    }
}
