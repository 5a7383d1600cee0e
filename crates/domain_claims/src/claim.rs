//! Claim aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::{ClaimId, Money};
use domain_assessment::{DamageAssessment, DisasterType};

use crate::error::ClaimError;

/// Claim status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClaimStatus {
    /// Filed, not yet looked at
    Pending,
    /// Scored below the auto-approval threshold; awaiting a human decision
    #[serde(rename = "Under Review")]
    UnderReview,
    Approved,
    Rejected,
}

impl ClaimStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimStatus::Pending => "Pending",
            ClaimStatus::UnderReview => "Under Review",
            ClaimStatus::Approved => "Approved",
            ClaimStatus::Rejected => "Rejected",
        }
    }

    /// Pending and Under Review both count as awaiting a decision
    pub fn is_open(&self) -> bool {
        matches!(self, ClaimStatus::Pending | ClaimStatus::UnderReview)
    }
}

impl fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClaimStatus {
    type Err = ClaimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "pending" => Ok(ClaimStatus::Pending),
            "underreview" => Ok(ClaimStatus::UnderReview),
            "approved" => Ok(ClaimStatus::Approved),
            "rejected" => Ok(ClaimStatus::Rejected),
            _ => Err(ClaimError::Validation(format!("unknown claim status: {s}"))),
        }
    }
}

/// A disaster damage claim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    /// Unique identifier
    pub id: ClaimId,
    /// Human-facing claim number (`C1001`, ...)
    pub claim_number: String,
    /// Policy number the claim was filed under (`P5001`, ...)
    pub policy_number: String,
    pub location_name: String,
    pub disaster_type: DisasterType,
    /// Composite damage score in [0, 1]
    pub damage_score: f64,
    pub claim_amount: Money,
    pub status: ClaimStatus,
    /// Set once, when the claim was approved by score at filing
    pub auto_approved: bool,
    pub date_filed: DateTime<Utc>,
    /// Assessments attached to this claim, oldest first
    pub assessments: Vec<DamageAssessment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Claim {
    pub fn approve(&mut self) -> Result<(), ClaimError> {
        self.override_status(ClaimStatus::Approved)
    }

    pub fn reject(&mut self) -> Result<(), ClaimError> {
        self.override_status(ClaimStatus::Rejected)
    }

    // Manual decisions may reverse earlier ones; `auto_approved` stays as filed.
    fn override_status(&mut self, target: ClaimStatus) -> Result<(), ClaimError> {
        if self.status == target {
            return Err(ClaimError::InvalidStatusTransition {
                from: self.status.to_string(),
                to: target.to_string(),
            });
        }
        self.status = target;
        self.updated_at = Utc::now();
        Ok(())
    }
}
