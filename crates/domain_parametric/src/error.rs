//! Parametric domain errors

use thiserror::Error;

use core_kernel::PortError;

#[derive(Debug, Error)]
pub enum TriggerError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{field} must be a finite number, got {value}")]
    NonFinite { field: &'static str, value: f64 },

    #[error("Trigger not found: {0}")]
    TriggerNotFound(String),

    #[error("Trigger code already in use: {0}")]
    DuplicateCode(String),

    #[error("Storage error: {0}")]
    Storage(#[from] PortError),
}
