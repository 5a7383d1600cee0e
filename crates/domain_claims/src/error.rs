//! Claims domain errors

use thiserror::Error;

use core_kernel::{MoneyError, PortError};
use domain_assessment::AssessmentError;

/// Errors that can occur in the claims domain
#[derive(Debug, Error)]
pub enum ClaimError {
    #[error("Claim not found: {0}")]
    ClaimNotFound(String),

    #[error("Invalid status transition from {from} to {to}")]
    InvalidStatusTransition { from: String, to: String },

    #[error(transparent)]
    Assessment(#[from] AssessmentError),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid adjudication policy: {0}")]
    InvalidPolicy(String),

    #[error("Storage error: {0}")]
    Storage(#[from] PortError),
}

impl From<MoneyError> for ClaimError {
    fn from(err: MoneyError) -> Self {
        ClaimError::InvalidAmount(err.to_string())
    }
}

impl ClaimError {
    /// True when the same request may succeed if retried
    pub fn is_retryable(&self) -> bool {
        match self {
            ClaimError::Assessment(err) => err.is_retryable(),
            ClaimError::Storage(err) => err.is_transient(),
            _ => false,
        }
    }
}
