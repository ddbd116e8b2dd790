//! Edit scripts and the script service payloads.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Ordered list of segment descriptors.
///
/// Descriptor fields belong to the generation and crop services; this layer
/// passes them through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EditScript(pub Vec<Value>);

impl EditScript {
    pub fn new(segments: Vec<Value>) -> Self {
        Self(segments)
    }

    pub fn segments(&self) -> &[Value] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<Value>> for EditScript {
    fn from(segments: Vec<Value>) -> Self {
        Self(segments)
    }
}

/// Segment id -> cropped clip path.
pub type SubclipMapping = BTreeMap<String, String>;

/// Vision/LLM tuning knobs for script generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptGenerationParams {
    /// Seconds skipped at the start of the video
    #[serde(default)]
    pub skip_seconds: u32,
    /// Scene change threshold
    #[serde(default = "default_threshold")]
    pub threshold: u32,
    /// Frames per vision request
    #[serde(default = "default_vision_batch_size")]
    pub vision_batch_size: u32,
    /// Vision LLM provider name
    #[serde(default = "default_vision_llm_provider")]
    pub vision_llm_provider: String,
}

fn default_threshold() -> u32 {
    30
}
fn default_vision_batch_size() -> u32 {
    10
}
fn default_vision_llm_provider() -> String {
    "gemini".to_string()
}

impl Default for ScriptGenerationParams {
    fn default() -> Self {
        Self {
            skip_seconds: 0,
            threshold: default_threshold(),
            vision_batch_size: default_vision_batch_size(),
            vision_llm_provider: default_vision_llm_provider(),
        }
    }
}

/// Body of `POST /api/v2/scripts/generate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateScriptRequest {
    pub video_path: String,
    #[serde(flatten)]
    pub params: ScriptGenerationParams,
}

/// Response of `POST /api/v2/scripts/generate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateScriptResponse {
    pub script: EditScript,
}

/// Body of `POST /api/v2/scripts/crop`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropRequest {
    pub video_origin_path: String,
    pub video_script: EditScript,
}

/// Response of `POST /api/v2/scripts/crop`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropResponse {
    pub subclip_videos: SubclipMapping,
}
