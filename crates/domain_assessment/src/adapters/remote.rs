//! Remote object-detection adapter
//!
//! Posts the image, re-encoded as PNG, to `{endpoint}/detect` and expects a
//! JSON body of the form:
//!
//! ```json
//! { "detections": [ { "label": "car", "confidence": 0.87 } ] }
//! ```
//!
//! HTTP failures are mapped to `PortError` variants:
//! - 429 -> `PortError::RateLimited`
//! - 5xx -> `PortError::ServiceUnavailable`
//! - Timeouts -> `PortError::Timeout`
//! - Connection failures -> `PortError::Connection`
//! - Other statuses or undecodable bodies -> `PortError::Transformation`

use async_trait::async_trait;
use image::{DynamicImage, ImageFormat};
use reqwest::{header, Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use std::time::{Duration, Instant};
use tracing::{debug, instrument};

use core_kernel::{AdapterHealth, DomainPort, HealthCheckResult, HealthCheckable, PortError};

use crate::detection::{Detection, ObjectDetector};

const DEFAULT_RETRY_AFTER_SECS: u64 = 30;

/// Configuration for the remote detector
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteDetectorConfig {
    /// Base URL of the inference service (e.g., "http://detector:8500")
    pub endpoint: String,
    /// Model identifier recorded on assessments
    pub model_name: String,
    /// Detections below this confidence are discarded
    pub min_confidence: f64,
    /// Request timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for RemoteDetectorConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            model_name: "yolov8m".to_string(),
            min_confidence: 0.0,
            timeout_ms: 30_000,
        }
    }
}

#[derive(Debug, Deserialize)]
struct DetectResponse {
    #[serde(default)]
    detections: Vec<Detection>,
}

/// Object detector backed by an HTTP inference service
#[derive(Debug, Clone)]
pub struct RemoteDetector {
    config: RemoteDetectorConfig,
    client: Client,
}

impl RemoteDetector {
    pub fn new(config: RemoteDetectorConfig) -> Result<Self, PortError> {
        if config.endpoint.trim().is_empty() {
            return Err(PortError::validation_field(
                "detector endpoint must be set",
                "endpoint",
            ));
        }
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|err| PortError::Internal {
                message: "failed to build HTTP client".to_string(),
                source: Some(Box::new(err)),
            })?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &RemoteDetectorConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.endpoint.trim_end_matches('/'), path)
    }

    fn map_send_error(&self, operation: &str, err: reqwest::Error) -> PortError {
        if err.is_timeout() {
            PortError::timeout(operation, self.config.timeout_ms)
        } else {
            PortError::Connection {
                message: format!("{operation} request failed"),
                source: Some(Box::new(err)),
            }
        }
    }
}

fn map_status(status: StatusCode, retry_after: Option<u64>) -> PortError {
    if status == StatusCode::TOO_MANY_REQUESTS {
        PortError::RateLimited {
            retry_after_secs: retry_after.unwrap_or(DEFAULT_RETRY_AFTER_SECS),
        }
    } else if status.is_server_error() {
        PortError::ServiceUnavailable {
            service: format!("object detector returned {status}"),
        }
    } else {
        PortError::Transformation {
            message: format!("object detector rejected the request with {status}"),
        }
    }
}

fn encode_png(image: &DynamicImage) -> Result<Vec<u8>, PortError> {
    let mut buffer = Cursor::new(Vec::new());
    image
        .write_to(&mut buffer, ImageFormat::Png)
        .map_err(|err| PortError::Transformation {
            message: format!("failed to encode image: {err}"),
        })?;
    Ok(buffer.into_inner())
}

impl DomainPort for RemoteDetector {}

#[async_trait]
impl ObjectDetector for RemoteDetector {
    fn model_name(&self) -> &str {
        &self.config.model_name
    }

    #[instrument(skip_all, fields(model = %self.config.model_name))]
    async fn detect(&self, image: &DynamicImage) -> Result<Vec<Detection>, PortError> {
        let body = encode_png(image)?;

        let response = self
            .client
            .post(self.url("detect"))
            .header(header::CONTENT_TYPE, "image/png")
            .query(&[("model", self.config.model_name.as_str())])
            .body(body)
            .send()
            .await
            .map_err(|err| self.map_send_error("detect", err))?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(header::RETRY_AFTER)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.parse().ok());
            return Err(map_status(status, retry_after));
        }

        let parsed: DetectResponse = response.json().await.map_err(|err| PortError::Transformation {
            message: format!("invalid detector response: {err}"),
        })?;

        let detections: Vec<Detection> = parsed
            .detections
            .into_iter()
            .filter(|d| d.confidence >= self.config.min_confidence)
            .collect();
        debug!(count = detections.len(), "Remote detector responded");
        Ok(detections)
    }
}

#[async_trait]
impl HealthCheckable for RemoteDetector {
    async fn health_check(&self) -> HealthCheckResult {
        let started = Instant::now();
        let outcome = self.client.get(self.url("health")).send().await;

        let (status, message) = match outcome {
            Ok(response) if response.status().is_success() => (AdapterHealth::Healthy, None),
            Ok(response) => (
                AdapterHealth::Degraded,
                Some(format!("health endpoint returned {}", response.status())),
            ),
            Err(err) => (AdapterHealth::Unhealthy, Some(err.to_string())),
        };

        HealthCheckResult::measured(
            format!("remote-detector:{}", self.config.model_name),
            started,
            status,
            message,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_is_required() {
        let result = RemoteDetector::new(RemoteDetectorConfig::default());
        assert!(matches!(result, Err(PortError::Validation { .. })));
    }

    #[test]
    fn test_url_joins_without_double_slash() {
        let detector = RemoteDetector::new(RemoteDetectorConfig {
            endpoint: "http://detector:8500/".to_string(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(detector.url("detect"), "http://detector:8500/detect");
        assert_eq!(detector.model_name(), "yolov8m");
    }

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            map_status(StatusCode::TOO_MANY_REQUESTS, Some(5)),
            PortError::RateLimited { retry_after_secs: 5 }
        ));
        assert!(map_status(StatusCode::BAD_GATEWAY, None).is_transient());
        assert!(!map_status(StatusCode::UNPROCESSABLE_ENTITY, None).is_transient());
    }
}
