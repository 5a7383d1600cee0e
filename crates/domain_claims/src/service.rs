//! Damage claim service
//!
//! Application service wiring the assessment pipeline, the decision engine,
//! the number sequence and the claim repository.

use std::sync::Arc;
use tracing::{info, instrument};

use core_kernel::{ClaimId, PortError};
use domain_assessment::{DamageAssessment, DamageAssessor, ImagePair};

use crate::adjudication::{ClaimsDecisionEngine, DirectClaimRequest};
use crate::claim::Claim;
use crate::error::ClaimError;
use crate::numbering::{ClaimNumberFormat, ClaimNumberIssuer, ClaimNumbers};
use crate::ports::{ClaimQuery, ClaimRepository};
use crate::summary::ClaimsSummary;

pub struct DamageClaimService {
    assessor: Arc<DamageAssessor>,
    engine: ClaimsDecisionEngine,
    sequence: Arc<dyn ClaimNumberIssuer>,
    format: ClaimNumberFormat,
    claims: Arc<dyn ClaimRepository>,
}

impl DamageClaimService {
    pub fn new(
        assessor: Arc<DamageAssessor>,
        engine: ClaimsDecisionEngine,
        sequence: Arc<dyn ClaimNumberIssuer>,
        format: ClaimNumberFormat,
        claims: Arc<dyn ClaimRepository>,
    ) -> Self {
        Self {
            assessor,
            engine,
            sequence,
            format,
            claims,
        }
    }

    pub fn engine(&self) -> &ClaimsDecisionEngine {
        &self.engine
    }

    pub fn repository(&self) -> &Arc<dyn ClaimRepository> {
        &self.claims
    }

    async fn next_numbers(&self) -> Result<ClaimNumbers, ClaimError> {
        let sequence = self.sequence.next_sequence().await?;
        Ok(self.format.render(sequence))
    }

    /// Assesses an image pair and opens a claim from the result
    ///
    /// Nothing is stored when the assessment fails.
    #[instrument(skip_all, fields(location = %pair.location_name(), disaster = %pair.disaster_type()))]
    pub async fn assess_damage(&self, pair: &ImagePair) -> Result<(Claim, DamageAssessment), ClaimError> {
        let assessment = self.assessor.assess(pair).await?;
        let numbers = self.next_numbers().await?;
        let claim = self.engine.open_claim(numbers, pair, assessment.clone())?;
        self.claims.save(&claim).await?;

        info!(
            claim_number = %claim.claim_number,
            status = %claim.status,
            auto_approved = claim.auto_approved,
            amount = %claim.claim_amount,
            "Claim opened from assessment"
        );
        Ok((claim, assessment))
    }

    #[instrument(skip_all, fields(location = %request.location_name, score = request.damage_score))]
    pub async fn file_claim(&self, request: DirectClaimRequest) -> Result<Claim, ClaimError> {
        let numbers = self.next_numbers().await?;
        let claim = self.engine.file_direct(numbers, request)?;
        self.claims.save(&claim).await?;

        info!(claim_number = %claim.claim_number, status = %claim.status, "Claim filed");
        Ok(claim)
    }

    pub async fn get_claim(&self, id: ClaimId) -> Result<Claim, ClaimError> {
        self.claims.get(id).await.map_err(|err| not_found_as_claim(err, id))
    }

    pub async fn find_claims(&self, query: &ClaimQuery) -> Result<Vec<Claim>, ClaimError> {
        Ok(self.claims.find(query).await?)
    }

    pub async fn summary(&self) -> Result<ClaimsSummary, ClaimError> {
        Ok(self.claims.summary().await?)
    }

    #[instrument(skip(self))]
    pub async fn approve(&self, id: ClaimId) -> Result<Claim, ClaimError> {
        let mut claim = self.get_claim(id).await?;
        claim.approve()?;
        self.claims.save(&claim).await?;
        info!(claim_number = %claim.claim_number, "Claim approved manually");
        Ok(claim)
    }

    #[instrument(skip(self))]
    pub async fn reject(&self, id: ClaimId) -> Result<Claim, ClaimError> {
        let mut claim = self.get_claim(id).await?;
        claim.reject()?;
        self.claims.save(&claim).await?;
        info!(claim_number = %claim.claim_number, "Claim rejected");
        Ok(claim)
    }
}

fn not_found_as_claim(err: PortError, id: ClaimId) -> ClaimError {
    if err.is_not_found() {
        ClaimError::ClaimNotFound(id.to_string())
    } else {
        ClaimError::Storage(err)
    }
}
