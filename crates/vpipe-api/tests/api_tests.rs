//! API integration tests.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use vpipe_api::{create_router, ApiConfig, AppState};
use vpipe_media::{MediaError, MediaResult, VideoDownloader};
use vpipe_models::DownloadRequest;

enum FakeOutcome {
    Saved(PathBuf),
    Failed(String),
    MissingBinary,
}

/// Downloader that never touches yt-dlp.
struct FakeDownloader {
    outcome: FakeOutcome,
    calls: AtomicUsize,
}

impl FakeDownloader {
    fn with_outcome(outcome: FakeOutcome) -> Arc<Self> {
        Arc::new(Self {
            outcome,
            calls: AtomicUsize::new(0),
        })
    }

    fn succeeding(path: &str) -> Arc<Self> {
        Self::with_outcome(FakeOutcome::Saved(PathBuf::from(path)))
    }

    fn failing(message: &str) -> Arc<Self> {
        Self::with_outcome(FakeOutcome::Failed(message.to_string()))
    }

    fn missing_binary() -> Arc<Self> {
        Self::with_outcome(FakeOutcome::MissingBinary)
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VideoDownloader for FakeDownloader {
    async fn download(&self, _request: &DownloadRequest) -> MediaResult<PathBuf> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.outcome {
            FakeOutcome::Saved(path) => Ok(path.clone()),
            FakeOutcome::Failed(message) => Err(MediaError::download_failed(message.clone())),
            FakeOutcome::MissingBinary => Err(MediaError::YtDlpNotFound),
        }
    }
}

fn create_test_router(downloader: Arc<FakeDownloader>) -> Router {
    create_router_with_config(ApiConfig::default(), downloader)
}

fn create_router_with_config(config: ApiConfig, downloader: Arc<FakeDownloader>) -> Router {
    let state = AppState::with_downloader(config, downloader);
    create_router(state, None)
}

fn download_request() -> Request<Body> {
    post_json(
        "/api/v2/youtube/download",
        json!({"url": "https://www.youtube.com/watch?v=abc"}),
    )
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, axum::http::HeaderMap, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, headers, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_root_endpoint() {
    let app = create_test_router(FakeDownloader::succeeding("/downloads/a.mp4"));

    let (status, _, body) = send(app, get("/")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "Welcome to the Video Pipeline API!"}));
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_router(FakeDownloader::succeeding("/downloads/a.mp4"));

    for uri in ["/health", "/healthz"] {
        let (status, _, body) = send(app.clone(), get(uri)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["version"], "1.0.0");
    }
}

#[tokio::test]
async fn test_metrics_endpoint_absent_when_disabled() {
    let app = create_test_router(FakeDownloader::succeeding("/downloads/a.mp4"));

    let (status, _, _) = send(app, get("/metrics")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_download_get_success() {
    let downloader = FakeDownloader::succeeding("/downloads/2024-11-19-01.mp4");
    let app = create_test_router(downloader.clone());

    let (status, _, body) = send(
        app,
        get("/api/v2/youtube/download?url=https%3A%2F%2Fwww.youtube.com%2Fwatch%3Fv%3Dabc&resolution=1080p&rename=2024-11-19-01"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"status": "success", "output_path": "/downloads/2024-11-19-01.mp4"})
    );
    assert_eq!(downloader.calls(), 1);
}

#[tokio::test]
async fn test_download_post_success() {
    let downloader = FakeDownloader::succeeding("/downloads/demo.mp4");
    let app = create_test_router(downloader.clone());

    let (status, _, body) = send(
        app,
        post_json(
            "/api/v2/youtube/download",
            json!({
                "url": "https://www.youtube.com/watch?v=abc",
                "resolution": "1080p",
                "output_format": "mp4",
                "rename": "demo"
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["output_path"], "/downloads/demo.mp4");
}

#[tokio::test]
async fn test_download_missing_url() {
    let downloader = FakeDownloader::succeeding("/downloads/a.mp4");
    let app = create_test_router(downloader.clone());

    let (status, _, body) = send(app, get("/api/v2/youtube/download")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
    assert!(body["message"].is_string());
    assert_eq!(downloader.calls(), 0);
}

#[tokio::test]
async fn test_download_rejects_bad_input() {
    let downloader = FakeDownloader::succeeding("/downloads/a.mp4");

    let cases = [
        json!({"url": "ftp://example.com/video.mp4"}),
        json!({"url": "not a url"}),
        json!({"url": "https://youtu.be/abc", "output_format": "gif"}),
        json!({"url": "https://youtu.be/abc", "rename": "../../etc/passwd"}),
    ];
    for case in cases {
        let app = create_test_router(downloader.clone());
        let (status, _, body) = send(app, post_json("/api/v2/youtube/download", case.clone())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "case: {case}");
        assert_eq!(body["status"], "error", "case: {case}");
    }

    assert_eq!(downloader.calls(), 0);
}

#[tokio::test]
async fn test_download_failure_is_bad_gateway() {
    let downloader = FakeDownloader::failing("yt-dlp failed: ERROR: Video unavailable");
    let app = create_test_router(downloader.clone());

    let (status, _, body) = send(
        app,
        post_json(
            "/api/v2/youtube/download",
            json!({"url": "https://www.youtube.com/watch?v=gone"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["status"], "error");
    assert_eq!(
        body["message"],
        "Download failed: yt-dlp failed: ERROR: Video unavailable"
    );
    assert_eq!(downloader.calls(), 1);
}

#[tokio::test]
async fn test_internal_error_details_shown_outside_production() {
    let app = create_test_router(FakeDownloader::missing_binary());

    let (status, _, body) = send(app, download_request()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["status"], "error");
    assert_eq!(body["message"], "Internal error: yt-dlp not found in PATH");
}

#[tokio::test]
async fn test_internal_error_details_hidden_in_production() {
    let config = ApiConfig {
        environment: "production".to_string(),
        ..ApiConfig::default()
    };
    let downloader = FakeDownloader::missing_binary();
    let app = create_router_with_config(config.clone(), downloader.clone());

    let (status, _, body) = send(app, download_request()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"status": "error", "message": "An internal error occurred"}));
    assert_eq!(downloader.calls(), 1);

    // Download failures still carry the yt-dlp message.
    let app = create_router_with_config(config, FakeDownloader::failing("yt-dlp failed: 403"));
    let (status, _, body) = send(app, download_request()).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["message"], "Download failed: yt-dlp failed: 403");
}

#[tokio::test]
async fn test_security_and_request_id_headers() {
    let app = create_test_router(FakeDownloader::succeeding("/downloads/a.mp4"));

    let (_, headers, _) = send(app.clone(), get("/health")).await;
    assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff");
    assert_eq!(headers.get("x-frame-options").unwrap(), "DENY");
    assert!(headers.get("x-request-id").is_some());

    let request = Request::builder()
        .uri("/health")
        .header("X-Request-ID", "req-123")
        .body(Body::empty())
        .unwrap();
    let (_, headers, _) = send(app, request).await;
    assert_eq!(headers.get("x-request-id").unwrap(), "req-123");
}
