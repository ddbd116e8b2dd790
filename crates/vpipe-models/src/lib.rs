//! Shared data models for the video pipeline.
//!
//! This crate provides Serde-serializable types for:
//! - The download endpoint request and response envelope
//! - Edit scripts and sub-clip mappings exchanged with the script services
//! - The final-assembly payload and its fixed styling settings
//! - Outbound proxy settings

pub mod assembly;
pub mod download;
pub mod proxy;
pub mod script;

// Re-export common types
pub use assembly::{FinalVideoPayload, FinalVideoRequest, FinalVideoSettings};
pub use download::{DownloadEnvelope, DownloadRequest, OutputFormat, ParseError, Resolution};
pub use proxy::ProxySettings;
pub use script::{
    CropRequest, CropResponse, EditScript, GenerateScriptRequest, GenerateScriptResponse,
    ScriptGenerationParams, SubclipMapping,
};
