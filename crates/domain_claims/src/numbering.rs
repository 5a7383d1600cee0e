//! Claim and policy numbers
//!
//! Numbers come from a monotonically increasing sequence `n = 1, 2, ...`
//! rendered as `C{1000 + n}` and `P{5000 + n}`. The sequence is a port so
//! that every adapter hands out each value exactly once, even under
//! concurrent filings.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

use core_kernel::{DomainPort, PortError};

/// Claim and policy number pair for one new claim
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimNumbers {
    pub claim_number: String,
    pub policy_number: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClaimNumberFormat {
    pub claim_prefix: String,
    pub claim_base: u64,
    pub policy_prefix: String,
    pub policy_base: u64,
}

impl Default for ClaimNumberFormat {
    fn default() -> Self {
        Self {
            claim_prefix: "C".to_string(),
            claim_base: 1000,
            policy_prefix: "P".to_string(),
            policy_base: 5000,
        }
    }
}

impl ClaimNumberFormat {
    pub fn render(&self, sequence: u64) -> ClaimNumbers {
        ClaimNumbers {
            claim_number: format!("{}{}", self.claim_prefix, self.claim_base + sequence),
            policy_number: format!("{}{}", self.policy_prefix, self.policy_base + sequence),
        }
    }
}

/// Port issuing unique sequence values
#[async_trait]
pub trait ClaimNumberIssuer: DomainPort {
    /// Returns the next value; no two calls ever return the same value
    async fn next_sequence(&self) -> Result<u64, PortError>;
}

/// In-process sequence backed by an atomic counter
#[derive(Debug)]
pub struct AtomicClaimSequence {
    next: AtomicU64,
}

impl AtomicClaimSequence {
    pub fn new() -> Self {
        Self::starting_after(0)
    }

    /// Continues numbering after `issued` claims already exist
    pub fn starting_after(issued: u64) -> Self {
        Self {
            next: AtomicU64::new(issued + 1),
        }
    }
}

impl Default for AtomicClaimSequence {
    fn default() -> Self {
        Self::new()
    }
}

impl DomainPort for AtomicClaimSequence {}

#[async_trait]
impl ClaimNumberIssuer for AtomicClaimSequence {
    async fn next_sequence(&self) -> Result<u64, PortError> {
        Ok(self.next.fetch_add(1, Ordering::Relaxed))
    }
}
