//! Object detection
//!
//! The detector itself is an external capability behind [`ObjectDetector`].
//! [`DetectionAdapter`] decodes the image on the blocking pool, bounds decode
//! and inference with one timeout, and collapses raw detections into one
//! confidence per label.

use async_trait::async_trait;
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use core_kernel::{DomainPort, PortError};

use crate::error::{AssessmentError, Capability, ImageRole};

/// A single raw detection reported by a model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub label: String,
    pub confidence: f64,
}

impl Detection {
    pub fn new(label: impl Into<String>, confidence: f64) -> Self {
        Self {
            label: label.into(),
            confidence,
        }
    }
}

/// Detected object classes with the highest confidence seen for each
///
/// Empty means nothing was detected, or that the image could not be decoded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DetectionResult {
    objects: BTreeMap<String, f64>,
}

impl DetectionResult {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Records a detection, keeping the maximum confidence per label
    ///
    /// NaN confidences are dropped; the rest are clamped to [0, 1].
    pub fn record(&mut self, label: impl Into<String>, confidence: f64) {
        if confidence.is_nan() {
            return;
        }
        let confidence = confidence.clamp(0.0, 1.0);
        let entry = self.objects.entry(label.into()).or_insert(confidence);
        if confidence > *entry {
            *entry = confidence;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn contains(&self, label: &str) -> bool {
        self.objects.contains_key(label)
    }

    pub fn confidence(&self, label: &str) -> Option<f64> {
        self.objects.get(label).copied()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.objects.keys().map(String::as_str)
    }
}

impl FromIterator<Detection> for DetectionResult {
    fn from_iter<T: IntoIterator<Item = Detection>>(iter: T) -> Self {
        let mut result = Self::empty();
        for detection in iter {
            result.record(detection.label, detection.confidence);
        }
        result
    }
}

impl<L: Into<String>> FromIterator<(L, f64)> for DetectionResult {
    fn from_iter<T: IntoIterator<Item = (L, f64)>>(iter: T) -> Self {
        let mut result = Self::empty();
        for (label, confidence) in iter {
            result.record(label, confidence);
        }
        result
    }
}

/// Port for an object detection model
#[async_trait]
pub trait ObjectDetector: DomainPort {
    /// Identifier recorded as the model used on assessments
    fn model_name(&self) -> &str;

    /// Runs the model on a decoded image
    async fn detect(&self, image: &DynamicImage) -> Result<Vec<Detection>, PortError>;
}

/// Detector that never finds anything
///
/// With it every assessment takes the pixel-similarity path.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullDetector;

impl DomainPort for NullDetector {}

#[async_trait]
impl ObjectDetector for NullDetector {
    fn model_name(&self) -> &str {
        "none"
    }

    async fn detect(&self, _image: &DynamicImage) -> Result<Vec<Detection>, PortError> {
        Ok(Vec::new())
    }
}

/// Runs an [`ObjectDetector`] against raw image bytes
#[derive(Clone)]
pub struct DetectionAdapter {
    detector: Arc<dyn ObjectDetector>,
    timeout: Duration,
}

impl DetectionAdapter {
    pub fn new(detector: Arc<dyn ObjectDetector>, timeout: Duration) -> Self {
        Self { detector, timeout }
    }

    pub fn model_name(&self) -> &str {
        self.detector.model_name()
    }

    /// Detects objects in an encoded image
    ///
    /// Bytes that do not decode yield an empty result, which routes the pair
    /// to the similarity fallback. A detector failure or timeout is an
    /// `InferenceUnavailable` error.
    pub async fn detect(&self, role: ImageRole, bytes: Arc<[u8]>) -> Result<DetectionResult, AssessmentError> {
        match tokio::time::timeout(self.timeout, self.decode_and_detect(role, bytes)).await {
            Ok(result) => result,
            Err(_) => Err(AssessmentError::inference(
                Capability::Detection,
                PortError::timeout("object detection", self.timeout.as_millis() as u64),
            )),
        }
    }

    async fn decode_and_detect(&self, role: ImageRole, bytes: Arc<[u8]>) -> Result<DetectionResult, AssessmentError> {
        let decoded = tokio::task::spawn_blocking(move || image::load_from_memory(&bytes))
            .await
            .map_err(|join_err| {
                AssessmentError::inference(
                    Capability::Detection,
                    PortError::internal(format!("image decode worker failed: {join_err}")),
                )
            })?;
        let image = match decoded {
            Ok(image) => image,
            Err(err) => {
                warn!(image = %role, error = %err, "Image could not be decoded for detection");
                return Ok(DetectionResult::empty());
            }
        };

        let detections = self
            .detector
            .detect(&image)
            .await
            .map_err(|source| AssessmentError::inference(Capability::Detection, source))?;

        let result: DetectionResult = detections.into_iter().collect();
        debug!(image = %role, objects = result.len(), "Object detection complete");
        Ok(result)
    }
}

/// Scripted doubles for the inference ports
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use image::GrayImage;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use crate::similarity::SimilarityScorer;

    /// Detector that replays prepared responses in call order
    ///
    /// Once the script runs out every call returns no detections.
    pub struct ScriptedDetector {
        responses: Mutex<VecDeque<Vec<Detection>>>,
        unavailable: bool,
        delay: Option<Duration>,
        calls: Mutex<usize>,
    }

    impl ScriptedDetector {
        pub fn new(responses: Vec<Vec<Detection>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                unavailable: false,
                delay: None,
                calls: Mutex::new(0),
            }
        }

        /// Pre and post responses built from label lists at full confidence
        pub fn with_labels(pre: &[&str], post: &[&str]) -> Self {
            let to_detections = |labels: &[&str]| {
                labels
                    .iter()
                    .map(|label| Detection::new(*label, 0.9))
                    .collect::<Vec<_>>()
            };
            Self::new(vec![to_detections(pre), to_detections(post)])
        }

        /// Detector whose every call fails as an unreachable service
        pub fn unavailable() -> Self {
            Self {
                unavailable: true,
                ..Self::new(Vec::new())
            }
        }

        /// Delays every response, for exercising timeouts
        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        pub fn calls(&self) -> usize {
            *self.calls.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
        }
    }

    impl DomainPort for ScriptedDetector {}

    #[async_trait]
    impl ObjectDetector for ScriptedDetector {
        fn model_name(&self) -> &str {
            "scripted"
        }

        async fn detect(&self, _image: &DynamicImage) -> Result<Vec<Detection>, PortError> {
            *self.calls.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) += 1;
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if self.unavailable {
                return Err(PortError::ServiceUnavailable {
                    service: "scripted detector".to_string(),
                });
            }
            let next = self
                .responses
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .pop_front();
            Ok(next.unwrap_or_default())
        }
    }

    /// Similarity scorer that always reports the same value
    pub struct FixedSimilarityScorer {
        similarity: f64,
    }

    impl FixedSimilarityScorer {
        pub fn new(similarity: f64) -> Self {
            Self { similarity }
        }
    }

    impl DomainPort for FixedSimilarityScorer {}

    impl SimilarityScorer for FixedSimilarityScorer {
        fn name(&self) -> &str {
            "fixed"
        }

        fn similarity(&self, _pre: &GrayImage, _post: &GrayImage) -> Result<f64, PortError> {
            Ok(self.similarity)
        }
    }
}
