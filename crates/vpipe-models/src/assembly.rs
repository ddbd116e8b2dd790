//! Final-assembly payload.

use serde::{Deserialize, Serialize};

use crate::script::{EditScript, SubclipMapping};

/// Default narration voice.
pub const DEFAULT_VOICE_NAME: &str = "zh-CN-YunjianNeural";

/// Fixed media, voice and subtitle styling sent to the assembly service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalVideoSettings {
    pub video_aspect: String,
    pub video_language: String,
    pub voice_name: String,
    pub voice_volume: f64,
    pub voice_rate: f64,
    pub voice_pitch: f64,
    pub bgm_name: String,
    pub bgm_type: String,
    pub bgm_file: String,
    pub bgm_volume: f64,
    pub subtitle_enabled: bool,
    pub subtitle_position: String,
    pub font_name: String,
    pub text_fore_color: String,
    pub text_background_color: String,
    pub font_size: u32,
    pub stroke_color: String,
    pub stroke_width: f64,
    /// Subtitle offset used when `subtitle_position` is "custom"
    pub custom_position: f64,
    /// Thread-count hint for the renderer
    pub n_threads: u32,
}

impl Default for FinalVideoSettings {
    fn default() -> Self {
        Self {
            video_aspect: "16:9".to_string(),
            video_language: "zh-CN".to_string(),
            voice_name: DEFAULT_VOICE_NAME.to_string(),
            voice_volume: 1.0,
            voice_rate: 1.2,
            voice_pitch: 1.0,
            bgm_name: "random".to_string(),
            bgm_type: "random".to_string(),
            bgm_file: String::new(),
            bgm_volume: 0.3,
            subtitle_enabled: true,
            subtitle_position: "bottom".to_string(),
            font_name: "STHeitiMedium.ttc".to_string(),
            text_fore_color: "#FFFFFF".to_string(),
            text_background_color: "transparent".to_string(),
            font_size: 75,
            stroke_color: "#000000".to_string(),
            stroke_width: 1.5,
            custom_position: 70.0,
            n_threads: 8,
        }
    }
}

impl FinalVideoSettings {
    pub fn with_voice(mut self, voice_name: impl Into<String>) -> Self {
        self.voice_name = voice_name.into();
        self
    }
}

/// The `request` object of the assembly call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalVideoRequest {
    pub video_clip_json: EditScript,
    pub video_clip_json_path: String,
    pub video_origin_path: String,
    #[serde(flatten)]
    pub settings: FinalVideoSettings,
}

/// Body of `POST /api/v2/scripts/start-subclip`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalVideoPayload {
    pub request: FinalVideoRequest,
    pub subclip_videos: SubclipMapping,
}
