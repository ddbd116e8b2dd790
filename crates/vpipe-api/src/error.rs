//! API error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use vpipe_media::MediaError;
use vpipe_models::DownloadEnvelope;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("{0}")]
    Internal(String),
}

/// Message served in place of internal error details in production.
pub const REDACTED_INTERNAL: &str = "An internal error occurred";

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn download_failed(msg: impl Into<String>) -> Self {
        Self::DownloadFailed(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Replace internal details with a generic message when `production` is set.
    pub fn redacted(self, production: bool) -> Self {
        match self {
            ApiError::Internal(_) if production => ApiError::Internal(REDACTED_INTERNAL.to_string()),
            other => other,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::DownloadFailed(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<MediaError> for ApiError {
    fn from(e: MediaError) -> Self {
        if e.is_invalid_input() {
            return ApiError::BadRequest(e.to_string());
        }
        match e {
            MediaError::DownloadFailed { message } => ApiError::DownloadFailed(message),
            MediaError::FileNotFound(_) => ApiError::DownloadFailed(e.to_string()),
            _ => ApiError::Internal(format!("Internal error: {}", e)),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(e: validator::ValidationErrors) -> Self {
        ApiError::BadRequest(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(DownloadEnvelope::error(self.to_string()))).into_response()
    }
}
