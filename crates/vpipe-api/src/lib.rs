//! Axum HTTP API server.
//!
//! This crate provides:
//! - The yt-dlp backed download endpoint (`/api/v2/youtube/download`)
//! - Root, health and Prometheus metrics endpoints
//! - Security headers, request ids and request logging
//! - Changelog generation from git history at startup

pub mod changelog;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::{ApiConfig, ChangelogConfig};
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
