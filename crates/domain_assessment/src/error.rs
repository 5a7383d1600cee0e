//! Assessment domain errors

use std::fmt;
use thiserror::Error;

use core_kernel::PortError;

/// Which image of the pair an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageRole {
    Pre,
    Post,
}

impl fmt::Display for ImageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageRole::Pre => write!(f, "pre"),
            ImageRole::Post => write!(f, "post"),
        }
    }
}

/// External inference capability consumed by the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Detection,
    Similarity,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::Detection => write!(f, "object detection"),
            Capability::Similarity => write!(f, "similarity"),
        }
    }
}

/// Errors that can occur while assessing damage
#[derive(Debug, Error)]
pub enum AssessmentError {
    /// Required input missing or out of range; raised before any inference runs
    #[error("Validation error: {0}")]
    Validation(String),

    /// The similarity fallback could not decode an image as grayscale
    #[error("Failed to decode {image} image: {reason}")]
    ImageDecode { image: ImageRole, reason: String },

    /// An inference capability could not be reached, failed, or timed out
    #[error("{capability} capability unavailable: {source}")]
    InferenceUnavailable {
        capability: Capability,
        #[source]
        source: PortError,
    },

    /// The scoring policy failed validation
    #[error("Invalid scoring policy: {0}")]
    InvalidPolicy(String),
}

impl AssessmentError {
    pub fn validation(message: impl Into<String>) -> Self {
        AssessmentError::Validation(message.into())
    }

    pub fn inference(capability: Capability, source: PortError) -> Self {
        AssessmentError::InferenceUnavailable { capability, source }
    }

    /// True when the caller may retry the same request unchanged
    pub fn is_retryable(&self) -> bool {
        matches!(self, AssessmentError::InferenceUnavailable { .. })
    }
}
