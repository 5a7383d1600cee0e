//! In-memory claim repository

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use core_kernel::{ClaimId, Currency, DomainPort, HealthCheckResult, HealthCheckable, PortError};

use crate::claim::Claim;
use crate::ports::{ClaimQuery, ClaimRepository};
use crate::summary::ClaimsSummary;

#[derive(Debug, Clone)]
pub struct InMemoryClaimRepository {
    claims: Arc<RwLock<HashMap<ClaimId, Claim>>>,
    currency: Currency,
}

impl InMemoryClaimRepository {
    /// `currency` is the currency of the summary total
    pub fn new(currency: Currency) -> Self {
        Self {
            claims: Arc::new(RwLock::new(HashMap::new())),
            currency,
        }
    }

    pub async fn with_claims(claims: Vec<Claim>, currency: Currency) -> Self {
        let repository = Self::new(currency);
        {
            let mut stored = repository.claims.write().await;
            for claim in claims {
                stored.insert(claim.id, claim);
            }
        }
        repository
    }
}

impl Default for InMemoryClaimRepository {
    fn default() -> Self {
        Self::new(Currency::USD)
    }
}

impl DomainPort for InMemoryClaimRepository {}

#[async_trait]
impl HealthCheckable for InMemoryClaimRepository {
    async fn health_check(&self) -> HealthCheckResult {
        HealthCheckResult::always_healthy("memory-claim-repository")
    }
}

#[async_trait]
impl ClaimRepository for InMemoryClaimRepository {
    async fn save(&self, claim: &Claim) -> Result<(), PortError> {
        let mut claims = self.claims.write().await;
        let duplicate_number = claims
            .values()
            .any(|c| c.claim_number == claim.claim_number && c.id != claim.id);
        if duplicate_number {
            return Err(PortError::conflict(format!(
                "claim number {} already exists",
                claim.claim_number
            )));
        }
        claims.insert(claim.id, claim.clone());
        Ok(())
    }

    async fn get(&self, id: ClaimId) -> Result<Claim, PortError> {
        self.claims
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| PortError::not_found("Claim", id))
    }

    async fn get_by_number(&self, claim_number: &str) -> Result<Claim, PortError> {
        self.claims
            .read()
            .await
            .values()
            .find(|c| c.claim_number == claim_number)
            .cloned()
            .ok_or_else(|| PortError::not_found("Claim", claim_number))
    }

    async fn find(&self, query: &ClaimQuery) -> Result<Vec<Claim>, PortError> {
        let claims = self.claims.read().await;
        let mut results: Vec<Claim> = claims.values().filter(|c| query.matches(c)).cloned().collect();
        results.sort_by(|a, b| b.date_filed.cmp(&a.date_filed).then_with(|| b.claim_number.cmp(&a.claim_number)));

        let offset = query.offset.unwrap_or(0) as usize;
        let limit = query.limit.map(|l| l as usize).unwrap_or(usize::MAX);
        Ok(results.into_iter().skip(offset).take(limit).collect())
    }

    async fn count(&self) -> Result<u64, PortError> {
        Ok(self.claims.read().await.len() as u64)
    }

    async fn summary(&self) -> Result<ClaimsSummary, PortError> {
        let claims = self.claims.read().await;
        ClaimsSummary::from_claims(claims.values(), self.currency).map_err(|err| PortError::Transformation {
            message: err.to_string(),
        })
    }
}
