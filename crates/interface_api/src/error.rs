//! API error handling
//!
//! Domain errors convert into [`ApiError`], which renders as
//! `{ "error": <kind>, "message": <text>, "details": [...] }`.

use axum::{
    extract::multipart::MultipartError,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use core_kernel::PortError;
use domain_assessment::AssessmentError;
use domain_claims::ClaimError;
use domain_parametric::TriggerError;

const RETRY_AFTER_SECS: u64 = 30;

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        details: Option<Vec<String>>,
    },

    /// A dependency is down; the same request may succeed later
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation {
            message: message.into(),
            details: None,
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message, details) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg, None),
            ApiError::Validation { message, details } => {
                (StatusCode::UNPROCESSABLE_ENTITY, "validation_error", message, details)
            }
            ApiError::ServiceUnavailable(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, "service_unavailable", msg, None)
            }
            ApiError::Internal(msg) => {
                error!(error = %msg, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg, None)
            }
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message,
            details,
        };

        let mut response = (status, Json(body)).into_response();
        if status == StatusCode::SERVICE_UNAVAILABLE {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(RETRY_AFTER_SECS));
        }
        response
    }
}

impl From<PortError> for ApiError {
    fn from(err: PortError) -> Self {
        match err {
            PortError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            PortError::Conflict { message } => ApiError::Conflict(message),
            PortError::Validation { message, field } => ApiError::Validation {
                message,
                details: field.map(|f| vec![f]),
            },
            ref e if e.is_transient() => ApiError::ServiceUnavailable(e.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<AssessmentError> for ApiError {
    fn from(err: AssessmentError) -> Self {
        match err {
            AssessmentError::Validation(message) => ApiError::validation(message),
            AssessmentError::ImageDecode { .. } => ApiError::BadRequest(err.to_string()),
            AssessmentError::InferenceUnavailable { .. } => ApiError::ServiceUnavailable(err.to_string()),
            AssessmentError::InvalidPolicy(message) => ApiError::Internal(message),
        }
    }
}

impl From<ClaimError> for ApiError {
    fn from(err: ClaimError) -> Self {
        match err {
            ClaimError::ClaimNotFound(id) => ApiError::NotFound(format!("Claim {id} not found")),
            ClaimError::InvalidStatusTransition { .. } => ApiError::Conflict(err.to_string()),
            ClaimError::Assessment(inner) => inner.into(),
            ClaimError::InvalidAmount(message) | ClaimError::Validation(message) => ApiError::validation(message),
            ClaimError::InvalidPolicy(message) => ApiError::Internal(message),
            ClaimError::Storage(inner) => inner.into(),
        }
    }
}

impl From<TriggerError> for ApiError {
    fn from(err: TriggerError) -> Self {
        match err {
            TriggerError::Validation(message) => ApiError::validation(message),
            TriggerError::NonFinite { .. } => ApiError::validation(err.to_string()),
            TriggerError::TriggerNotFound(id) => ApiError::NotFound(format!("Trigger {id} not found")),
            TriggerError::DuplicateCode(_) => ApiError::Conflict(err.to_string()),
            TriggerError::Storage(inner) => inner.into(),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let details = errors
            .field_errors()
            .into_iter()
            .map(|(field, errs)| {
                let reasons: Vec<String> = errs.iter().map(|e| e.code.to_string()).collect();
                format!("{field}: {}", reasons.join(", "))
            })
            .collect();
        ApiError::Validation {
            message: "request failed validation".to_string(),
            details: Some(details),
        }
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        ApiError::BadRequest(err.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_assessment::{Capability, ImageRole};

    #[test]
    fn test_assessment_error_statuses() {
        let cases = [
            (AssessmentError::validation("pre_image is required"), StatusCode::UNPROCESSABLE_ENTITY),
            (
                AssessmentError::ImageDecode {
                    image: ImageRole::Post,
                    reason: "truncated".to_string(),
                },
                StatusCode::BAD_REQUEST,
            ),
            (
                AssessmentError::inference(Capability::Detection, PortError::timeout("detect", 30_000)),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
        ];
        for (err, status) in cases {
            let response = ApiError::from(err).into_response();
            assert_eq!(response.status(), status);
        }
    }

    #[test]
    fn test_unavailable_sets_retry_after() {
        let response = ApiError::ServiceUnavailable("detector".to_string()).into_response();
        assert_eq!(response.headers().get(header::RETRY_AFTER).unwrap(), "30");
    }

    #[test]
    fn test_claim_errors_map_to_conflict_and_not_found() {
        let transition = ClaimError::InvalidStatusTransition {
            from: "Approved".to_string(),
            to: "Approved".to_string(),
        };
        assert_eq!(ApiError::from(transition).into_response().status(), StatusCode::CONFLICT);

        let missing = ClaimError::ClaimNotFound("C9999".to_string());
        assert_eq!(ApiError::from(missing).into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_storage_errors() {
        let conflict = ClaimError::Storage(PortError::conflict("claim number taken"));
        assert_eq!(ApiError::from(conflict).into_response().status(), StatusCode::CONFLICT);

        let down = ClaimError::Storage(PortError::connection("refused"));
        assert_eq!(ApiError::from(down).into_response().status(), StatusCode::SERVICE_UNAVAILABLE);

        let broken = ClaimError::Storage(PortError::internal("bad row"));
        assert_eq!(ApiError::from(broken).into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_duplicate_trigger_code_is_conflict() {
        let err = TriggerError::DuplicateCode("RAIN-HOU-01".to_string());
        assert_eq!(ApiError::from(err).into_response().status(), StatusCode::CONFLICT);
    }
}
