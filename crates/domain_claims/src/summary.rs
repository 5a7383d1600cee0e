//! Claims summary

use serde::{Deserialize, Serialize};

use core_kernel::{Currency, Money, MoneyError};

use crate::claim::{Claim, ClaimStatus};

/// Claim totals by status
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimsSummary {
    pub total_claims: u64,
    pub approved_claims: u64,
    /// Pending and Under Review
    pub pending_claims: u64,
    pub rejected_claims: u64,
    pub auto_approved_claims: u64,
    pub total_claim_amount: Money,
}

impl ClaimsSummary {
    pub fn empty(currency: Currency) -> Self {
        Self {
            total_claims: 0,
            approved_claims: 0,
            pending_claims: 0,
            rejected_claims: 0,
            auto_approved_claims: 0,
            total_claim_amount: Money::zero(currency),
        }
    }

    pub fn from_claims<'a, I>(claims: I, currency: Currency) -> Result<Self, MoneyError>
    where
        I: IntoIterator<Item = &'a Claim>,
    {
        claims.into_iter().try_fold(Self::empty(currency), |mut summary, claim| {
            summary.total_claims += 1;
            match claim.status {
                ClaimStatus::Approved => summary.approved_claims += 1,
                ClaimStatus::Rejected => summary.rejected_claims += 1,
                ClaimStatus::Pending | ClaimStatus::UnderReview => summary.pending_claims += 1,
            }
            if claim.auto_approved {
                summary.auto_approved_claims += 1;
            }
            summary.total_claim_amount = summary.total_claim_amount.checked_add(&claim.claim_amount)?;
            Ok(summary)
        })
    }
}
