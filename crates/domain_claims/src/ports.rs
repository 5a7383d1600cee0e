//! Claims Domain Ports
//!
//! Claim storage sits behind [`ClaimRepository`]. Adapters:
//!
//! - **In-memory**: [`crate::InMemoryClaimRepository`], for tests and single-node runs
//! - **PostgreSQL**: `infra_db::PgClaimRepository`

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use core_kernel::{ClaimId, DomainPort, HealthCheckable, PortError};
use domain_assessment::DisasterType;

use crate::claim::{Claim, ClaimStatus};
use crate::summary::ClaimsSummary;

/// Query parameters for finding claims
///
/// Results are ordered newest filing first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClaimQuery {
    /// Any of these statuses; empty matches every status
    pub statuses: Vec<ClaimStatus>,
    pub disaster_type: Option<DisasterType>,
    pub auto_approved: Option<bool>,
    /// Case-insensitive substring of the location name
    pub location: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl ClaimQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn approved() -> Self {
        Self {
            statuses: vec![ClaimStatus::Approved],
            ..Self::default()
        }
    }

    /// Pending and Under Review claims
    pub fn pending() -> Self {
        Self {
            statuses: vec![ClaimStatus::Pending, ClaimStatus::UnderReview],
            ..Self::default()
        }
    }

    pub fn matches(&self, claim: &Claim) -> bool {
        if !self.statuses.is_empty() && !self.statuses.contains(&claim.status) {
            return false;
        }
        if let Some(ref disaster) = self.disaster_type {
            if &claim.disaster_type != disaster {
                return false;
            }
        }
        if let Some(auto_approved) = self.auto_approved {
            if claim.auto_approved != auto_approved {
                return false;
            }
        }
        if let Some(ref location) = self.location {
            if !claim
                .location_name
                .to_lowercase()
                .contains(&location.to_lowercase())
            {
                return false;
            }
        }
        true
    }
}

#[async_trait]
pub trait ClaimRepository: DomainPort + HealthCheckable {
    /// Inserts the claim, or replaces the stored claim with the same id
    async fn save(&self, claim: &Claim) -> Result<(), PortError>;

    async fn get(&self, id: ClaimId) -> Result<Claim, PortError>;

    async fn get_by_number(&self, claim_number: &str) -> Result<Claim, PortError>;

    async fn find(&self, query: &ClaimQuery) -> Result<Vec<Claim>, PortError>;

    async fn count(&self) -> Result<u64, PortError>;

    async fn summary(&self) -> Result<ClaimsSummary, PortError>;
}
