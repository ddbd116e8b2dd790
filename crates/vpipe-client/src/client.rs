//! Service HTTP client.

use std::fmt;
use std::time::Duration;

use reqwest::{Client, Proxy};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use vpipe_models::{
    CropRequest, CropResponse, DownloadEnvelope, DownloadRequest, EditScript, FinalVideoPayload,
    GenerateScriptRequest, GenerateScriptResponse, ProxySettings, SubclipMapping,
};

use crate::error::{ClientError, ClientResult};

/// Remote steps the pipeline calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceStep {
    Download,
    GenerateScript,
    Crop,
    FinalAssembly,
}

impl ServiceStep {
    /// Endpoint path relative to the service base URL.
    pub fn path(&self) -> &'static str {
        match self {
            ServiceStep::Download => "/api/v2/youtube/download",
            ServiceStep::GenerateScript => "/api/v2/scripts/generate",
            ServiceStep::Crop => "/api/v2/scripts/crop",
            ServiceStep::FinalAssembly => "/api/v2/scripts/start-subclip",
        }
    }
}

impl fmt::Display for ServiceStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ServiceStep::Download => "download",
            ServiceStep::GenerateScript => "script generation",
            ServiceStep::Crop => "crop",
            ServiceStep::FinalAssembly => "final assembly",
        })
    }
}

/// Configuration for the service client.
#[derive(Debug, Clone)]
pub struct ServiceClientConfig {
    /// Base URL of the script/crop/assembly services
    pub base_url: String,
    /// Base URL of the download endpoint, when it is not served by `base_url`
    pub download_base_url: Option<String>,
    /// Request timeout; reqwest's default (none) when unset
    pub timeout: Option<Duration>,
    /// Outbound proxies
    pub proxy: ProxySettings,
}

impl Default for ServiceClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".to_string(),
            download_base_url: None,
            timeout: None,
            proxy: ProxySettings::default(),
        }
    }
}

impl ServiceClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }
}

/// Client for the remote pipeline services.
#[derive(Debug, Clone)]
pub struct ServiceClient {
    http: Client,
    config: ServiceClientConfig,
}

impl ServiceClient {
    /// Create a new service client.
    pub fn new(config: ServiceClientConfig) -> ClientResult<Self> {
        // Only the configured proxies apply; reqwest's own env lookup is off.
        let mut builder = Client::builder().no_proxy();

        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(proxy) = &config.proxy.http {
            let proxy = Proxy::http(proxy)
                .map_err(|e| ClientError::Config(format!("invalid HTTP_PROXY: {}", e)))?;
            builder = builder.proxy(proxy);
        }
        if let Some(proxy) = &config.proxy.https {
            let proxy = Proxy::https(proxy)
                .map_err(|e| ClientError::Config(format!("invalid HTTPS_PROXY: {}", e)))?;
            builder = builder.proxy(proxy);
        }

        let http = builder
            .build()
            .map_err(|e| ClientError::Config(e.to_string()))?;

        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ServiceClientConfig {
        &self.config
    }

    /// Full URL of a step's endpoint.
    pub fn endpoint(&self, step: ServiceStep) -> String {
        let base = match step {
            ServiceStep::Download => self
                .config
                .download_base_url
                .as_deref()
                .unwrap_or(&self.config.base_url),
            _ => &self.config.base_url,
        };
        format!("{}{}", base.trim_end_matches('/'), step.path())
    }

    /// Ask the download endpoint for a video; returns the downloaded file path.
    pub async fn download_video(&self, request: &DownloadRequest) -> ClientResult<String> {
        let step = ServiceStep::Download;
        let body = self.post(step, request, &[]).await?;
        let envelope: DownloadEnvelope = decode(step, &body)?;

        match envelope.into_result() {
            Ok(path) if path.trim().is_empty() => Err(ClientError::Malformed {
                step,
                detail: "empty output_path".to_string(),
            }),
            Ok(path) => Ok(path),
            Err(message) => Err(ClientError::Rejected {
                step,
                status: None,
                message,
            }),
        }
    }

    /// Generate an edit script for a video.
    pub async fn generate_script(&self, request: &GenerateScriptRequest) -> ClientResult<EditScript> {
        let step = ServiceStep::GenerateScript;
        let body = self.post(step, request, &[]).await?;
        let response: GenerateScriptResponse = decode(step, &body)?;
        Ok(response.script)
    }

    /// Crop the sub-clips described by a script.
    pub async fn crop_video(&self, request: &CropRequest) -> ClientResult<SubclipMapping> {
        let step = ServiceStep::Crop;
        let body = self.post(step, request, &[]).await?;
        let response: CropResponse = decode(step, &body)?;
        Ok(response.subclip_videos)
    }

    /// Start final assembly for a task. The service renders asynchronously;
    /// its response body is not inspected.
    pub async fn generate_final_video(
        &self,
        task_id: &str,
        payload: &FinalVideoPayload,
    ) -> ClientResult<()> {
        self.post(ServiceStep::FinalAssembly, payload, &[("task_id", task_id)])
            .await?;
        Ok(())
    }

    /// POST a JSON body and return the response text of a 2xx answer.
    async fn post<B: Serialize + ?Sized>(
        &self,
        step: ServiceStep,
        body: &B,
        query: &[(&str, &str)],
    ) -> ClientResult<String> {
        let url = self.endpoint(step);

        debug!(step = %step, url = %url, "Sending service request");

        let mut request = self.http.post(&url).json(body);
        if !query.is_empty() {
            request = request.query(query);
        }

        let response = request
            .send()
            .await
            .map_err(|source| ClientError::Network { step, source })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|source| ClientError::Network { step, source })?;

        if !status.is_success() {
            warn!(step = %step, status = %status, "Service request rejected");
            return Err(ClientError::Rejected {
                step,
                status: Some(status.as_u16()),
                message: rejection_message(status.as_u16(), &text),
            });
        }

        Ok(text)
    }
}

fn decode<T: DeserializeOwned>(step: ServiceStep, body: &str) -> ClientResult<T> {
    serde_json::from_str(body).map_err(|e| ClientError::Malformed {
        step,
        detail: e.to_string(),
    })
}

/// Human-readable message for a non-2xx answer, preferring the service's own
/// `message`/`detail`/`error` field over the raw body.
fn rejection_message(status: u16, body: &str) -> String {
    let from_json = serde_json::from_str::<Value>(body).ok().and_then(|v| {
        ["message", "detail", "error"]
            .iter()
            .find_map(|key| v.get(*key).and_then(Value::as_str).map(str::to_string))
    });

    match from_json {
        Some(message) => format!("HTTP {}: {}", status, message),
        None if body.trim().is_empty() => format!("HTTP {}", status),
        None => format!("HTTP {}: {}", status, body.trim()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> ServiceClient {
        ServiceClient::new(ServiceClientConfig::new(server.uri())).unwrap()
    }

    #[test]
    fn test_config_defaults() {
        let config = ServiceClientConfig::default();
        assert_eq!(config.base_url, "http://127.0.0.1:8080");
        assert!(config.download_base_url.is_none());
        assert!(config.timeout.is_none());
    }

    #[test]
    fn test_endpoints() {
        let client = ServiceClient::new(ServiceClientConfig {
            base_url: "http://scripts:8080/".to_string(),
            download_base_url: Some("http://downloader:8000".to_string()),
            ..ServiceClientConfig::default()
        })
        .unwrap();

        assert_eq!(
            client.endpoint(ServiceStep::GenerateScript),
            "http://scripts:8080/api/v2/scripts/generate"
        );
        assert_eq!(
            client.endpoint(ServiceStep::Download),
            "http://downloader:8000/api/v2/youtube/download"
        );
    }

    #[test]
    fn test_rejection_message() {
        assert_eq!(
            rejection_message(502, r#"{"status":"error","message":"yt-dlp failed"}"#),
            "HTTP 502: yt-dlp failed"
        );
        assert_eq!(rejection_message(422, r#"{"detail":"bad"}"#), "HTTP 422: bad");
        assert_eq!(rejection_message(500, "oops\n"), "HTTP 500: oops");
        assert_eq!(rejection_message(404, ""), "HTTP 404");
    }

    #[tokio::test]
    async fn test_download_error_envelope_is_rejection() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v2/youtube/download"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"status": "error", "message": "private video"})),
            )
            .mount(&server)
            .await;

        let err = client_for(&server)
            .download_video(&DownloadRequest::new("https://youtu.be/abc"))
            .await
            .unwrap_err();

        match err {
            ClientError::Rejected { step, status, message } => {
                assert_eq!(step, ServiceStep::Download);
                assert_eq!(status, None);
                assert_eq!(message, "private video");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_download_empty_path_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v2/youtube/download"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"status": "success", "output_path": ""})),
            )
            .mount(&server)
            .await;

        let err = client_for(&server)
            .download_video(&DownloadRequest::new("https://youtu.be/abc"))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Malformed { .. }));
    }

    #[tokio::test]
    async fn test_generate_script_missing_key_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v2/scripts/generate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"scripts": []})))
            .mount(&server)
            .await;

        let request = GenerateScriptRequest {
            video_path: "/videos/a.mp4".to_string(),
            params: Default::default(),
        };
        let err = client_for(&server).generate_script(&request).await.unwrap_err();
        assert!(matches!(
            err,
            ClientError::Malformed { step: ServiceStep::GenerateScript, .. }
        ));
    }

    #[tokio::test]
    async fn test_server_error_is_rejection_with_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v2/scripts/crop"))
            .respond_with(ResponseTemplate::new(500).set_body_string("crop worker died"))
            .mount(&server)
            .await;

        let request = CropRequest {
            video_origin_path: "/videos/a.mp4".to_string(),
            video_script: EditScript::default(),
        };
        let err = client_for(&server).crop_video(&request).await.unwrap_err();
        assert_eq!(err.status(), Some(500));
        assert_eq!(err.step(), Some(ServiceStep::Crop));
        assert!(err.to_string().contains("crop worker died"));
    }

    #[tokio::test]
    async fn test_final_assembly_sends_task_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v2/scripts/start-subclip"))
            .and(query_param("task_id", "task-42"))
            .respond_with(ResponseTemplate::new(200).set_body_string("accepted"))
            .expect(1)
            .mount(&server)
            .await;

        let payload = FinalVideoPayload {
            request: vpipe_models::FinalVideoRequest {
                video_clip_json: EditScript::default(),
                video_clip_json_path: "/scripts/a.json".to_string(),
                video_origin_path: "/videos/a.mp4".to_string(),
                settings: Default::default(),
            },
            subclip_videos: SubclipMapping::new(),
        };

        client_for(&server)
            .generate_final_video("task-42", &payload)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_unreachable_service_is_network_error() {
        let client = ServiceClient::new(ServiceClientConfig::new("http://127.0.0.1:1")).unwrap();
        let request = CropRequest {
            video_origin_path: "/videos/a.mp4".to_string(),
            video_script: EditScript::default(),
        };
        let err = client.crop_video(&request).await.unwrap_err();
        assert!(matches!(err, ClientError::Network { step: ServiceStep::Crop, .. }));
    }
}
