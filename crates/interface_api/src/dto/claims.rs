//! Claims DTOs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use domain_assessment::DisasterType;
use domain_claims::{Claim, ClaimQuery, ClaimStatus, ClaimsSummary, DirectClaimRequest};

use super::analysis::AnalysisResponse;
use crate::error::ApiError;

/// Direct filing with a known damage score
#[derive(Debug, Deserialize, Validate)]
pub struct CreateClaimRequest {
    #[validate(length(min = 1, max = 50))]
    pub policy_number: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub location_name: String,
    #[validate(length(min = 1, max = 50))]
    pub disaster_type: String,
    #[validate(range(min = 0.0, max = 1.0))]
    pub damage_score: f64,
    pub claim_amount: Decimal,
    /// Status to keep when the score is below the auto-approval threshold
    pub status: Option<String>,
}

impl TryFrom<CreateClaimRequest> for DirectClaimRequest {
    type Error = ApiError;

    fn try_from(request: CreateClaimRequest) -> Result<Self, Self::Error> {
        let status = request
            .status
            .as_deref()
            .map(str::parse::<ClaimStatus>)
            .transpose()?;
        Ok(DirectClaimRequest {
            policy_number: request.policy_number,
            location_name: request.location_name,
            disaster_type: DisasterType::parse(&request.disaster_type),
            damage_score: request.damage_score,
            claim_amount: request.claim_amount,
            status,
        })
    }
}

/// Query string of `GET /api/v1/claims`
#[derive(Debug, Default, Deserialize)]
pub struct ListClaimsParams {
    /// Comma-separated statuses, e.g. `Pending,Under Review`
    pub status: Option<String>,
    pub disaster_type: Option<String>,
    pub auto_approved: Option<bool>,
    pub location: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl TryFrom<ListClaimsParams> for ClaimQuery {
    type Error = ApiError;

    fn try_from(params: ListClaimsParams) -> Result<Self, Self::Error> {
        let statuses = match params.status.as_deref() {
            Some(list) => list
                .split(',')
                .filter(|s| !s.trim().is_empty())
                .map(str::parse::<ClaimStatus>)
                .collect::<Result<Vec<_>, _>>()?,
            None => Vec::new(),
        };
        Ok(ClaimQuery {
            statuses,
            disaster_type: params
                .disaster_type
                .as_deref()
                .filter(|d| !d.trim().is_empty())
                .map(DisasterType::parse),
            auto_approved: params.auto_approved,
            location: params.location.filter(|l| !l.trim().is_empty()),
            limit: params.limit,
            offset: params.offset,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct ClaimResponse {
    pub id: String,
    pub claim_number: String,
    pub policy_number: String,
    pub location_name: String,
    pub disaster_type: DisasterType,
    pub damage_score: f64,
    pub claim_amount: Decimal,
    pub currency: String,
    pub status: ClaimStatus,
    pub auto_approved: bool,
    pub date_filed: DateTime<Utc>,
    pub analyses: Vec<AnalysisResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Claim> for ClaimResponse {
    fn from(claim: &Claim) -> Self {
        let amount = claim.claim_amount;
        Self {
            id: claim.id.to_string(),
            claim_number: claim.claim_number.clone(),
            policy_number: claim.policy_number.clone(),
            location_name: claim.location_name.clone(),
            disaster_type: claim.disaster_type.clone(),
            damage_score: claim.damage_score,
            claim_amount: amount.amount(),
            currency: amount.currency().code().to_string(),
            status: claim.status,
            auto_approved: claim.auto_approved,
            date_filed: claim.date_filed,
            analyses: claim.assessments.iter().map(AnalysisResponse::from).collect(),
            created_at: claim.created_at,
            updated_at: claim.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub total_claims: u64,
    pub approved_claims: u64,
    pub pending_claims: u64,
    pub rejected_claims: u64,
    pub auto_approved_claims: u64,
    pub total_claim_amount: Decimal,
    pub currency: String,
}

impl From<ClaimsSummary> for SummaryResponse {
    fn from(summary: ClaimsSummary) -> Self {
        let total = summary.total_claim_amount;
        Self {
            total_claims: summary.total_claims,
            approved_claims: summary.approved_claims,
            pending_claims: summary.pending_claims,
            rejected_claims: summary.rejected_claims,
            auto_approved_claims: summary.auto_approved_claims,
            total_claim_amount: total.amount(),
            currency: total.currency().code().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_params_parse_status_list() {
        let params = ListClaimsParams {
            status: Some("Pending,Under Review".to_string()),
            disaster_type: Some("flood".to_string()),
            ..ListClaimsParams::default()
        };
        let query = ClaimQuery::try_from(params).unwrap();
        assert_eq!(query.statuses, vec![ClaimStatus::Pending, ClaimStatus::UnderReview]);
        assert_eq!(query.disaster_type, Some(DisasterType::Flood));
    }

    #[test]
    fn test_response_shows_stored_amount() {
        use domain_claims::{AdjudicationPolicy, ClaimNumbers, ClaimsDecisionEngine};
        use rust_decimal_macros::dec;

        let engine = ClaimsDecisionEngine::new(AdjudicationPolicy {
            amount_precision: 4,
            ..AdjudicationPolicy::default()
        })
        .unwrap();
        let numbers = ClaimNumbers {
            claim_number: "C1001".to_string(),
            policy_number: "P5001".to_string(),
        };
        let claim = engine
            .file_direct(
                numbers,
                DirectClaimRequest {
                    policy_number: None,
                    location_name: "Porto".to_string(),
                    disaster_type: DisasterType::Flood,
                    damage_score: 0.2,
                    claim_amount: dec!(12.34567),
                    status: None,
                },
            )
            .unwrap();

        let response = ClaimResponse::from(&claim);
        assert_eq!(response.claim_amount, dec!(12.3457));
        assert_eq!(response.currency, "USD");
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        let params = ListClaimsParams {
            status: Some("Closed".to_string()),
            ..ListClaimsParams::default()
        };
        assert!(ClaimQuery::try_from(params).is_err());
    }
}
