//! Claim decision rules
//!
//! A single threshold decides auto-approval on both filing paths: claims
//! opened from imagery and claims filed directly with a known score.

use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use core_kernel::{ClaimId, Currency, Money};
use domain_assessment::{DamageAssessment, DisasterType, ImagePair};

use crate::claim::{Claim, ClaimStatus};
use crate::error::ClaimError;
use crate::numbering::ClaimNumbers;

/// Adjudication settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdjudicationPolicy {
    /// Scores at or above this are approved automatically
    pub auto_approve_threshold: f64,
    /// Claim amount per square metre of affected area
    pub amount_per_sqm: Decimal,
    pub currency: Currency,
    /// Decimal places of the claim amount, at most [`Money::STORAGE_DP`]
    pub amount_precision: u32,
}

impl Default for AdjudicationPolicy {
    fn default() -> Self {
        Self {
            auto_approve_threshold: 0.7,
            amount_per_sqm: dec!(100),
            currency: Currency::USD,
            amount_precision: 2,
        }
    }
}

impl AdjudicationPolicy {
    pub fn validate(&self) -> Result<(), ClaimError> {
        if !self.auto_approve_threshold.is_finite() || !(0.0..=1.0).contains(&self.auto_approve_threshold) {
            return Err(ClaimError::InvalidPolicy(format!(
                "auto_approve_threshold must be within [0, 1], got {}",
                self.auto_approve_threshold
            )));
        }
        if self.amount_per_sqm.is_sign_negative() {
            return Err(ClaimError::InvalidPolicy(
                "amount_per_sqm must not be negative".to_string(),
            ));
        }
        if self.amount_precision > Money::STORAGE_DP {
            return Err(ClaimError::InvalidPolicy(format!(
                "amount_precision must be at most {}, got {}",
                Money::STORAGE_DP,
                self.amount_precision
            )));
        }
        Ok(())
    }
}

/// Status and auto-approval flag for a new claim
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub status: ClaimStatus,
    pub auto_approved: bool,
}

/// A claim filed with a known damage score, without imagery
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectClaimRequest {
    /// Issued from the sequence when absent
    pub policy_number: Option<String>,
    pub location_name: String,
    pub disaster_type: DisasterType,
    pub damage_score: f64,
    pub claim_amount: Decimal,
    /// Kept when the score is below the threshold; defaults to Pending
    pub status: Option<ClaimStatus>,
}

#[derive(Debug, Clone)]
pub struct ClaimsDecisionEngine {
    policy: AdjudicationPolicy,
}

impl ClaimsDecisionEngine {
    pub fn new(policy: AdjudicationPolicy) -> Result<Self, ClaimError> {
        policy.validate()?;
        Ok(Self { policy })
    }

    pub fn policy(&self) -> &AdjudicationPolicy {
        &self.policy
    }

    fn meets_threshold(&self, damage_score: f64) -> bool {
        damage_score >= self.policy.auto_approve_threshold
    }

    /// Decision for a claim opened from an assessment
    pub fn decide(&self, damage_score: f64) -> Decision {
        if self.meets_threshold(damage_score) {
            Decision {
                status: ClaimStatus::Approved,
                auto_approved: true,
            }
        } else {
            Decision {
                status: ClaimStatus::UnderReview,
                auto_approved: false,
            }
        }
    }

    /// `affected_area * amount_per_sqm`, rounded half away from zero
    pub fn claim_amount(&self, affected_area_sqm: f64) -> Result<Money, ClaimError> {
        if !affected_area_sqm.is_finite() || affected_area_sqm < 0.0 {
            return Err(ClaimError::InvalidAmount(format!(
                "affected area must be a non-negative number, got {affected_area_sqm}"
            )));
        }
        let area = Money::from_f64(affected_area_sqm, self.policy.currency)?;
        Ok(area
            .multiply(self.policy.amount_per_sqm)
            .round_to(self.policy.amount_precision))
    }

    /// Builds the claim for a freshly assessed image pair
    pub fn open_claim(
        &self,
        numbers: ClaimNumbers,
        pair: &ImagePair,
        assessment: DamageAssessment,
    ) -> Result<Claim, ClaimError> {
        let decision = self.decide(assessment.damage_score);
        let claim_amount = self.claim_amount(assessment.affected_area_sqm)?;
        let now = Utc::now();

        Ok(Claim {
            id: ClaimId::new_v7(),
            claim_number: numbers.claim_number,
            policy_number: numbers.policy_number,
            location_name: pair.location_name().to_string(),
            disaster_type: pair.disaster_type().clone(),
            damage_score: assessment.damage_score,
            claim_amount,
            status: decision.status,
            auto_approved: decision.auto_approved,
            date_filed: now,
            assessments: vec![assessment],
            created_at: now,
            updated_at: now,
        })
    }

    /// Builds a directly filed claim
    pub fn file_direct(&self, numbers: ClaimNumbers, request: DirectClaimRequest) -> Result<Claim, ClaimError> {
        let location_name = request.location_name.trim().to_string();
        if location_name.is_empty() {
            return Err(ClaimError::Validation("location_name is required".to_string()));
        }
        if request.disaster_type.is_blank() {
            return Err(ClaimError::Validation("disaster_type is required".to_string()));
        }
        if !request.damage_score.is_finite() || !(0.0..=1.0).contains(&request.damage_score) {
            return Err(ClaimError::Validation(format!(
                "damage_score must be within [0, 1], got {}",
                request.damage_score
            )));
        }
        if request.claim_amount.is_sign_negative() && !request.claim_amount.is_zero() {
            return Err(ClaimError::InvalidAmount(format!(
                "claim amount must not be negative, got {}",
                request.claim_amount
            )));
        }

        let (status, auto_approved) = if self.meets_threshold(request.damage_score) {
            (ClaimStatus::Approved, true)
        } else {
            (request.status.unwrap_or(ClaimStatus::Pending), false)
        };
        let claim_amount = Money::new(request.claim_amount, self.policy.currency)
            .round_to(self.policy.amount_precision);
        let now = Utc::now();

        Ok(Claim {
            id: ClaimId::new_v7(),
            claim_number: numbers.claim_number,
            policy_number: request.policy_number.unwrap_or(numbers.policy_number),
            location_name,
            disaster_type: request.disaster_type,
            damage_score: request.damage_score,
            claim_amount,
            status,
            auto_approved,
            date_filed: now,
            assessments: Vec::new(),
            created_at: now,
            updated_at: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> ClaimsDecisionEngine {
        ClaimsDecisionEngine::new(AdjudicationPolicy::default()).unwrap()
    }

    fn numbers() -> ClaimNumbers {
        ClaimNumbers {
            claim_number: "C1001".to_string(),
            policy_number: "P5001".to_string(),
        }
    }

    fn direct(score: f64, status: Option<ClaimStatus>) -> DirectClaimRequest {
        DirectClaimRequest {
            policy_number: None,
            location_name: "Lisbon".to_string(),
            disaster_type: DisasterType::Earthquake,
            damage_score: score,
            claim_amount: dec!(12500.505),
            status,
        }
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let decision = engine().decide(0.7);
        assert_eq!(decision.status, ClaimStatus::Approved);
        assert!(decision.auto_approved);

        let decision = engine().decide(0.6999);
        assert_eq!(decision.status, ClaimStatus::UnderReview);
        assert!(!decision.auto_approved);
    }

    #[test]
    fn test_claim_amount_rounds_to_cents() {
        let amount = engine().claim_amount(0.7333333333333333 * 5000.0).unwrap();
        assert_eq!(amount.amount(), dec!(366666.67));
        assert_eq!(amount.currency(), Currency::USD);
    }

    #[test]
    fn test_claim_amount_honours_configured_precision() {
        let engine = ClaimsDecisionEngine::new(AdjudicationPolicy {
            amount_precision: 4,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(engine.claim_amount(0.1234567).unwrap().amount(), dec!(12.3457));

        let engine = ClaimsDecisionEngine::new(AdjudicationPolicy {
            amount_precision: 0,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(engine.claim_amount(0.125).unwrap().amount(), dec!(13));
    }

    #[test]
    fn test_precision_beyond_storage_rejected() {
        let policy = AdjudicationPolicy {
            amount_precision: Money::STORAGE_DP + 1,
            ..Default::default()
        };
        assert!(matches!(
            ClaimsDecisionEngine::new(policy),
            Err(ClaimError::InvalidPolicy(_))
        ));
    }

    #[test]
    fn test_claim_amount_rejects_bad_area() {
        assert!(engine().claim_amount(-1.0).is_err());
        assert!(engine().claim_amount(f64::NAN).is_err());
    }

    #[test]
    fn test_direct_filing_auto_approves_at_threshold() {
        let claim = engine().file_direct(numbers(), direct(0.9, Some(ClaimStatus::Rejected))).unwrap();
        assert_eq!(claim.status, ClaimStatus::Approved);
        assert!(claim.auto_approved);
        assert_eq!(claim.claim_amount.amount(), dec!(12500.51));
        assert_eq!(claim.policy_number, "P5001");
    }

    #[test]
    fn test_direct_filing_rounds_amount_once() {
        let mut request = direct(0.3, None);
        request.claim_amount = dec!(12.00495);
        let claim = engine().file_direct(numbers(), request).unwrap();
        assert_eq!(claim.claim_amount.amount(), dec!(12.00));

        let mut request = direct(0.3, None);
        request.claim_amount = dec!(12.005);
        let claim = engine().file_direct(numbers(), request).unwrap();
        assert_eq!(claim.claim_amount.amount(), dec!(12.01));
    }

    #[test]
    fn test_direct_filing_below_threshold_keeps_status() {
        let claim = engine().file_direct(numbers(), direct(0.3, Some(ClaimStatus::UnderReview))).unwrap();
        assert_eq!(claim.status, ClaimStatus::UnderReview);
        assert!(!claim.auto_approved);

        let claim = engine().file_direct(numbers(), direct(0.3, None)).unwrap();
        assert_eq!(claim.status, ClaimStatus::Pending);
    }

    #[test]
    fn test_direct_filing_validates_input() {
        let mut request = direct(1.2, None);
        assert!(matches!(engine().file_direct(numbers(), request.clone()), Err(ClaimError::Validation(_))));

        request.damage_score = 0.5;
        request.claim_amount = dec!(-1);
        assert!(matches!(engine().file_direct(numbers(), request), Err(ClaimError::InvalidAmount(_))));
    }

    #[test]
    fn test_invalid_policy_rejected() {
        let policy = AdjudicationPolicy {
            auto_approve_threshold: 1.5,
            ..Default::default()
        };
        assert!(ClaimsDecisionEngine::new(policy).is_err());
    }
}
