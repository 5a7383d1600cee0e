//! Claims repository
//!
//! Claims and their damage analyses. A claim is written together with its
//! analyses in one transaction; analyses are append-only.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use tracing::{debug, instrument};
use uuid::Uuid;

use domain_claims::ClaimQuery;

use super::like_pattern;
use crate::error::DatabaseError;

const CLAIM_COLUMNS: &str = "id, claim_number, policy_number, location_name, disaster_type, \
     damage_score, claim_amount, currency, status, auto_approved, date_filed, created_at, updated_at";

const ANALYSIS_COLUMNS: &str = "id, claim_id, damage_score, damage_percentage, affected_area_sqm, \
     confidence, method, model_used, notes, image_damage_ratio, disaster_severity, location_score, analyzed_at";

/// Row in `insurance_claims`
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct ClaimRow {
    pub id: Uuid,
    pub claim_number: String,
    pub policy_number: String,
    pub location_name: String,
    pub disaster_type: String,
    pub damage_score: f64,
    pub claim_amount: Decimal,
    pub currency: String,
    pub status: String,
    pub auto_approved: bool,
    pub date_filed: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row in `damage_analyses`
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct AnalysisRow {
    pub id: Uuid,
    pub claim_id: Uuid,
    pub damage_score: f64,
    pub damage_percentage: Decimal,
    pub affected_area_sqm: f64,
    pub confidence: f64,
    pub method: String,
    pub model_used: String,
    pub notes: String,
    pub image_damage_ratio: f64,
    pub disaster_severity: f64,
    pub location_score: f64,
    pub analyzed_at: DateTime<Utc>,
}

/// Aggregate counts over all claims
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct SummaryRow {
    pub total_claims: i64,
    pub approved_claims: i64,
    pub pending_claims: i64,
    pub rejected_claims: i64,
    pub auto_approved_claims: i64,
    pub total_claim_amount: Decimal,
    /// Claims whose currency differs from the requested one
    pub foreign_currency_claims: i64,
}

#[derive(Debug, Clone)]
pub struct ClaimsRepository {
    pool: PgPool,
}

impl ClaimsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts or updates a claim and appends any analyses not yet stored
    ///
    /// A claim number already used by a different claim fails with
    /// `DuplicateEntry`.
    #[instrument(skip(self, claim, analyses), fields(claim_number = %claim.claim_number))]
    pub async fn upsert(&self, claim: &ClaimRow, analyses: &[AnalysisRow]) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO insurance_claims (
                id, claim_number, policy_number, location_name, disaster_type,
                damage_score, claim_amount, currency, status, auto_approved,
                date_filed, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            ON CONFLICT (id) DO UPDATE SET
                policy_number = EXCLUDED.policy_number,
                location_name = EXCLUDED.location_name,
                disaster_type = EXCLUDED.disaster_type,
                damage_score = EXCLUDED.damage_score,
                claim_amount = EXCLUDED.claim_amount,
                currency = EXCLUDED.currency,
                status = EXCLUDED.status,
                auto_approved = EXCLUDED.auto_approved,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(claim.id)
        .bind(&claim.claim_number)
        .bind(&claim.policy_number)
        .bind(&claim.location_name)
        .bind(&claim.disaster_type)
        .bind(claim.damage_score)
        .bind(claim.claim_amount)
        .bind(&claim.currency)
        .bind(&claim.status)
        .bind(claim.auto_approved)
        .bind(claim.date_filed)
        .bind(claim.created_at)
        .bind(claim.updated_at)
        .execute(&mut *tx)
        .await?;

        for analysis in analyses {
            sqlx::query(
                r#"
                INSERT INTO damage_analyses (
                    id, claim_id, damage_score, damage_percentage, affected_area_sqm,
                    confidence, method, model_used, notes, image_damage_ratio,
                    disaster_severity, location_score, analyzed_at
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
                ON CONFLICT (id) DO NOTHING
                "#,
            )
            .bind(analysis.id)
            .bind(analysis.claim_id)
            .bind(analysis.damage_score)
            .bind(analysis.damage_percentage)
            .bind(analysis.affected_area_sqm)
            .bind(analysis.confidence)
            .bind(&analysis.method)
            .bind(&analysis.model_used)
            .bind(&analysis.notes)
            .bind(analysis.image_damage_ratio)
            .bind(analysis.disaster_severity)
            .bind(analysis.location_score)
            .bind(analysis.analyzed_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        debug!(analyses = analyses.len(), "claim stored");
        Ok(())
    }

    pub async fn get(&self, id: Uuid) -> Result<ClaimRow, DatabaseError> {
        let sql = format!("SELECT {CLAIM_COLUMNS} FROM insurance_claims WHERE id = $1");
        sqlx::query_as::<_, ClaimRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found("Claim", id))
    }

    pub async fn get_by_number(&self, claim_number: &str) -> Result<ClaimRow, DatabaseError> {
        let sql = format!("SELECT {CLAIM_COLUMNS} FROM insurance_claims WHERE claim_number = $1");
        sqlx::query_as::<_, ClaimRow>(&sql)
            .bind(claim_number)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found("Claim", claim_number))
    }

    /// Claims matching `query`, most recently filed first
    pub async fn find(&self, query: &ClaimQuery) -> Result<Vec<ClaimRow>, DatabaseError> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {CLAIM_COLUMNS} FROM insurance_claims WHERE TRUE"));

        if !query.statuses.is_empty() {
            let statuses: Vec<String> = query.statuses.iter().map(|s| s.as_str().to_string()).collect();
            builder.push(" AND status = ANY(").push_bind(statuses).push(")");
        }
        if let Some(ref disaster) = query.disaster_type {
            builder
                .push(" AND LOWER(disaster_type) = LOWER(")
                .push_bind(disaster.as_str().to_string())
                .push(")");
        }
        if let Some(auto_approved) = query.auto_approved {
            builder.push(" AND auto_approved = ").push_bind(auto_approved);
        }
        if let Some(ref location) = query.location {
            builder.push(" AND location_name ILIKE ").push_bind(like_pattern(location));
        }

        builder.push(" ORDER BY date_filed DESC, claim_number DESC");
        if let Some(limit) = query.limit {
            builder.push(" LIMIT ").push_bind(i64::from(limit));
        }
        if let Some(offset) = query.offset {
            builder.push(" OFFSET ").push_bind(i64::from(offset));
        }

        let rows = builder.build_query_as::<ClaimRow>().fetch_all(&self.pool).await?;
        Ok(rows)
    }

    /// Analyses for the given claims, oldest first within each claim
    pub async fn analyses_for(&self, claim_ids: &[Uuid]) -> Result<Vec<AnalysisRow>, DatabaseError> {
        if claim_ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT {ANALYSIS_COLUMNS} FROM damage_analyses WHERE claim_id = ANY($1) \
             ORDER BY claim_id, analyzed_at, id"
        );
        let rows = sqlx::query_as::<_, AnalysisRow>(&sql)
            .bind(claim_ids.to_vec())
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn count(&self) -> Result<i64, DatabaseError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM insurance_claims")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Counts by status and the total amount in `currency`
    pub async fn summary(&self, currency: &str) -> Result<SummaryRow, DatabaseError> {
        let row = sqlx::query_as::<_, SummaryRow>(
            r#"
            SELECT
                COUNT(*) AS total_claims,
                COUNT(*) FILTER (WHERE status = 'Approved') AS approved_claims,
                COUNT(*) FILTER (WHERE status IN ('Pending', 'Under Review')) AS pending_claims,
                COUNT(*) FILTER (WHERE status = 'Rejected') AS rejected_claims,
                COUNT(*) FILTER (WHERE auto_approved) AS auto_approved_claims,
                COALESCE(SUM(claim_amount) FILTER (WHERE currency = $1), 0) AS total_claim_amount,
                COUNT(*) FILTER (WHERE currency <> $1) AS foreign_currency_claims
            FROM insurance_claims
            "#,
        )
        .bind(currency)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }
}
