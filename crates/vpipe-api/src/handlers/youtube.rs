//! YouTube download handlers.

use std::time::Instant;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::Json;
use tracing::{info, warn};
use validator::Validate;

use vpipe_models::{DownloadEnvelope, DownloadRequest};

use crate::error::{ApiError, ApiResult};
use crate::metrics;
use crate::state::AppState;

/// `GET /api/v2/youtube/download?url=...`
pub async fn download_get(
    State(state): State<AppState>,
    query: Result<Query<DownloadRequest>, QueryRejection>,
) -> ApiResult<Json<DownloadEnvelope>> {
    let Query(request) = query.map_err(|e| ApiError::bad_request(e.body_text()))?;
    download(&state, request).await
}

/// `POST /api/v2/youtube/download` with a JSON body.
pub async fn download_post(
    State(state): State<AppState>,
    body: Result<Json<DownloadRequest>, JsonRejection>,
) -> ApiResult<Json<DownloadEnvelope>> {
    let Json(request) = body.map_err(|e| ApiError::bad_request(e.body_text()))?;
    download(&state, request).await
}

async fn download(state: &AppState, request: DownloadRequest) -> ApiResult<Json<DownloadEnvelope>> {
    let start = Instant::now();

    if let Err(e) = check_request(&request) {
        metrics::record_download("invalid", start.elapsed().as_secs_f64());
        return Err(e);
    }

    info!(
        url = %request.url,
        resolution = ?request.resolution,
        output_format = ?request.output_format,
        "Download requested"
    );

    match state.downloader.download(&request).await {
        Ok(path) => {
            metrics::record_download("success", start.elapsed().as_secs_f64());
            Ok(Json(DownloadEnvelope::success(
                path.to_string_lossy().into_owned(),
            )))
        }
        Err(e) => {
            let err = ApiError::from(e);
            let outcome = match err {
                ApiError::BadRequest(_) => "invalid",
                _ => "failed",
            };
            warn!(url = %request.url, error = %err, "Download failed");
            metrics::record_download(outcome, start.elapsed().as_secs_f64());
            Err(err.redacted(state.config.is_production()))
        }
    }
}

/// Field validation plus an http(s)-only scheme check.
fn check_request(request: &DownloadRequest) -> ApiResult<()> {
    request.validate()?;

    let url = url::Url::parse(&request.url)
        .map_err(|e| ApiError::bad_request(format!("invalid url: {}", e)))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ApiError::bad_request(format!(
            "unsupported url scheme '{}'",
            url.scheme()
        )));
    }

    request
        .parsed_resolution()
        .map_err(|e| ApiError::bad_request(e.to_string()))?;
    request
        .parsed_output_format()
        .map_err(|e| ApiError::bad_request(e.to_string()))?;
    if let Some(rename) = request.rename.as_deref() {
        vpipe_media::validate_rename(rename)?;
    }

    Ok(())
}
