//! Claim numbers from a PostgreSQL sequence
//!
//! `nextval` never hands out the same value twice, across connections and
//! server instances, so concurrent filings get distinct claim numbers.

use async_trait::async_trait;
use sqlx::PgPool;

use core_kernel::{DomainPort, HealthCheckResult, HealthCheckable, PortError};
use domain_claims::ClaimNumberIssuer;

use crate::error::DatabaseError;

#[derive(Debug, Clone)]
pub struct PgClaimSequence {
    pool: PgPool,
}

impl PgClaimSequence {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl DomainPort for PgClaimSequence {}

#[async_trait]
impl HealthCheckable for PgClaimSequence {
    async fn health_check(&self) -> HealthCheckResult {
        super::probe(&self.pool, "postgres-claim-sequence").await
    }
}

#[async_trait]
impl ClaimNumberIssuer for PgClaimSequence {
    async fn next_sequence(&self) -> Result<u64, PortError> {
        let value = sqlx::query_scalar::<_, i64>("SELECT nextval('claim_number_seq')")
            .fetch_one(&self.pool)
            .await
            .map_err(DatabaseError::from)?;
        u64::try_from(value).map_err(|_| PortError::Transformation {
            message: format!("claim sequence returned negative value {value}"),
        })
    }
}
