//! Video pipeline orchestrator.
//!
//! This crate provides:
//! - `VideoPipeline::run_pipeline`, the download -> script -> crop -> assembly sequence
//! - Conventional resource paths (videos, scripts, task outputs)
//! - Edit script persistence
//! - Structured run logging

pub mod config;
pub mod error;
pub mod layout;
pub mod logging;
pub mod pipeline;
pub mod script_store;

pub use config::PipelineConfig;
pub use error::{ErrorKind, PipelineError, PipelineResult};
pub use layout::ResourceLayout;
pub use logging::RunLogger;
pub use pipeline::{PipelineOutcome, PipelineRun, VideoPipeline};
pub use script_store::{load_script, save_script_to_json};
