//! PostgreSQL claim repository

use async_trait::async_trait;
use std::collections::HashMap;
use std::str::FromStr;
use tracing::instrument;
use uuid::Uuid;

use core_kernel::{ClaimId, Currency, DomainPort, HealthCheckResult, HealthCheckable, Money, PortError};
use domain_assessment::{ComparisonMethod, DamageAssessment, DisasterType, ScoreBreakdown};
use domain_claims::{Claim, ClaimQuery, ClaimRepository, ClaimStatus, ClaimsSummary};
use sqlx::PgPool;

use crate::error::DatabaseError;
use crate::repositories::{AnalysisRow, ClaimRow, ClaimsRepository, SummaryRow};

/// [`ClaimRepository`] backed by `insurance_claims` and `damage_analyses`
#[derive(Debug, Clone)]
pub struct PgClaimRepository {
    repository: ClaimsRepository,
    pool: PgPool,
    currency: Currency,
}

impl PgClaimRepository {
    /// `currency` is the currency of the summary total
    pub fn new(pool: PgPool, currency: Currency) -> Self {
        Self {
            repository: ClaimsRepository::new(pool.clone()),
            pool,
            currency,
        }
    }

    async fn with_analyses(&self, rows: Vec<ClaimRow>) -> Result<Vec<Claim>, DatabaseError> {
        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let mut by_claim: HashMap<Uuid, Vec<AnalysisRow>> = HashMap::new();
        for analysis in self.repository.analyses_for(&ids).await? {
            by_claim.entry(analysis.claim_id).or_default().push(analysis);
        }
        rows.into_iter()
            .map(|row| {
                let analyses = by_claim.remove(&row.id).unwrap_or_default();
                claim_from_rows(row, analyses)
            })
            .collect()
    }
}

impl DomainPort for PgClaimRepository {}

#[async_trait]
impl HealthCheckable for PgClaimRepository {
    async fn health_check(&self) -> HealthCheckResult {
        super::probe(&self.pool, "postgres-claim-repository").await
    }
}

#[async_trait]
impl ClaimRepository for PgClaimRepository {
    #[instrument(skip(self, claim), fields(claim_number = %claim.claim_number))]
    async fn save(&self, claim: &Claim) -> Result<(), PortError> {
        let (row, analyses) = claim_to_rows(claim);
        self.repository.upsert(&row, &analyses).await.map_err(PortError::from)
    }

    async fn get(&self, id: ClaimId) -> Result<Claim, PortError> {
        let row = self.repository.get(*id.as_uuid()).await?;
        let mut claims = self.with_analyses(vec![row]).await?;
        claims.pop().ok_or_else(|| PortError::not_found("Claim", id))
    }

    async fn get_by_number(&self, claim_number: &str) -> Result<Claim, PortError> {
        let row = self.repository.get_by_number(claim_number).await?;
        let mut claims = self.with_analyses(vec![row]).await?;
        claims.pop().ok_or_else(|| PortError::not_found("Claim", claim_number))
    }

    async fn find(&self, query: &ClaimQuery) -> Result<Vec<Claim>, PortError> {
        let rows = self.repository.find(query).await?;
        Ok(self.with_analyses(rows).await?)
    }

    async fn count(&self) -> Result<u64, PortError> {
        let count = self.repository.count().await?;
        Ok(u64::try_from(count).unwrap_or(0))
    }

    async fn summary(&self) -> Result<ClaimsSummary, PortError> {
        let row = self.repository.summary(self.currency.code()).await?;
        Ok(summary_from_row(row, self.currency)?)
    }
}

pub(crate) fn claim_to_rows(claim: &Claim) -> (ClaimRow, Vec<AnalysisRow>) {
    let claim_id = *claim.id.as_uuid();
    let row = ClaimRow {
        id: claim_id,
        claim_number: claim.claim_number.clone(),
        policy_number: claim.policy_number.clone(),
        location_name: claim.location_name.clone(),
        disaster_type: claim.disaster_type.as_str().to_string(),
        damage_score: claim.damage_score,
        claim_amount: claim.claim_amount.amount(),
        currency: claim.claim_amount.currency().code().to_string(),
        status: claim.status.as_str().to_string(),
        auto_approved: claim.auto_approved,
        date_filed: claim.date_filed,
        created_at: claim.created_at,
        updated_at: claim.updated_at,
    };
    let analyses = claim
        .assessments
        .iter()
        .map(|a| AnalysisRow {
            id: *a.id.as_uuid(),
            claim_id,
            damage_score: a.damage_score,
            damage_percentage: a.damage_percentage,
            affected_area_sqm: a.affected_area_sqm,
            confidence: a.confidence,
            method: a.method.as_str().to_string(),
            model_used: a.model_used.clone(),
            notes: a.notes.clone(),
            image_damage_ratio: a.breakdown.image_damage_ratio,
            disaster_severity: a.breakdown.disaster_severity,
            location_score: a.breakdown.location_score,
            analyzed_at: a.analyzed_at,
        })
        .collect();
    (row, analyses)
}

pub(crate) fn claim_from_rows(row: ClaimRow, analyses: Vec<AnalysisRow>) -> Result<Claim, DatabaseError> {
    let status = ClaimStatus::from_str(&row.status)
        .map_err(|e| DatabaseError::SerializationError(e.to_string()))?;
    let currency = Currency::from_str(&row.currency)
        .map_err(|e| DatabaseError::SerializationError(e.to_string()))?;
    let assessments = analyses
        .into_iter()
        .map(assessment_from_row)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Claim {
        id: ClaimId::from(row.id),
        claim_number: row.claim_number,
        policy_number: row.policy_number,
        location_name: row.location_name,
        disaster_type: DisasterType::parse(&row.disaster_type),
        damage_score: row.damage_score,
        claim_amount: Money::new(row.claim_amount, currency),
        status,
        auto_approved: row.auto_approved,
        date_filed: row.date_filed,
        assessments,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

fn assessment_from_row(row: AnalysisRow) -> Result<DamageAssessment, DatabaseError> {
    let method = ComparisonMethod::from_str(&row.method).map_err(DatabaseError::SerializationError)?;
    Ok(DamageAssessment {
        id: row.id.into(),
        damage_score: row.damage_score,
        damage_percentage: row.damage_percentage,
        affected_area_sqm: row.affected_area_sqm,
        confidence: row.confidence,
        method,
        model_used: row.model_used,
        notes: row.notes,
        breakdown: ScoreBreakdown {
            image_damage_ratio: row.image_damage_ratio,
            disaster_severity: row.disaster_severity,
            location_score: row.location_score,
        },
        analyzed_at: row.analyzed_at,
    })
}

fn summary_from_row(row: SummaryRow, currency: Currency) -> Result<ClaimsSummary, DatabaseError> {
    if row.foreign_currency_claims > 0 {
        return Err(DatabaseError::SerializationError(format!(
            "{} claims are not in {currency}; cannot total claim amounts",
            row.foreign_currency_claims
        )));
    }
    let count = |n: i64| u64::try_from(n).unwrap_or(0);
    Ok(ClaimsSummary {
        total_claims: count(row.total_claims),
        approved_claims: count(row.approved_claims),
        pending_claims: count(row.pending_claims),
        rejected_claims: count(row.rejected_claims),
        auto_approved_claims: count(row.auto_approved_claims),
        total_claim_amount: Money::new(row.total_claim_amount, currency),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use core_kernel::AssessmentId;
    use rust_decimal_macros::dec;

    fn sample_claim() -> Claim {
        let now = Utc::now();
        Claim {
            id: ClaimId::new_v7(),
            claim_number: "C1001".to_string(),
            policy_number: "P5001".to_string(),
            location_name: "Houston".to_string(),
            disaster_type: DisasterType::Flood,
            damage_score: 0.7433,
            claim_amount: Money::new(dec!(371666.67), Currency::USD),
            status: ClaimStatus::Approved,
            auto_approved: true,
            date_filed: now,
            assessments: vec![DamageAssessment {
                id: AssessmentId::new_v7(),
                damage_score: 0.7433,
                damage_percentage: dec!(74.33),
                affected_area_sqm: 3716.6667,
                confidence: 0.9,
                method: ComparisonMethod::ObjectDiff,
                model_used: "yolov8m object comparator".to_string(),
                notes: "Automated analysis using yolov8m object comparator. Confidence: 90.00%".to_string(),
                breakdown: ScoreBreakdown {
                    image_damage_ratio: 1.0,
                    disaster_severity: 0.7,
                    location_score: 0.0,
                },
                analyzed_at: now,
            }],
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_claim_rows_round_trip() {
        let claim = sample_claim();
        let (row, analyses) = claim_to_rows(&claim);

        assert_eq!(row.status, "Approved");
        assert_eq!(row.currency, "USD");
        assert_eq!(analyses.len(), 1);
        assert_eq!(analyses[0].claim_id, row.id);
        assert_eq!(analyses[0].method, "object_diff");

        let restored = claim_from_rows(row, analyses).unwrap();
        assert_eq!(restored, claim);
    }

    #[test]
    fn test_unknown_status_is_serialization_error() {
        let (mut row, _) = claim_to_rows(&sample_claim());
        row.status = "Closed".to_string();

        let err = claim_from_rows(row, Vec::new()).unwrap_err();
        assert!(matches!(err, DatabaseError::SerializationError(_)));
    }

    #[test]
    fn test_summary_rejects_mixed_currencies() {
        let row = SummaryRow {
            total_claims: 3,
            approved_claims: 1,
            pending_claims: 2,
            rejected_claims: 0,
            auto_approved_claims: 1,
            total_claim_amount: dec!(1200.50),
            foreign_currency_claims: 0,
        };
        let summary = summary_from_row(row.clone(), Currency::USD).unwrap();
        assert_eq!(summary.total_claims, 3);
        assert_eq!(summary.total_claim_amount.amount(), dec!(1200.50));

        let mixed = SummaryRow {
            foreign_currency_claims: 1,
            ..row
        };
        assert!(summary_from_row(mixed, Currency::USD).is_err());
    }
}
