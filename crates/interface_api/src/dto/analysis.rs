//! Damage analysis DTOs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use domain_assessment::{ComparisonMethod, DamageAssessment, ScoreBreakdown};

use super::claims::ClaimResponse;

pub const ANALYSIS_COMPLETED: &str = "Damage analysis completed successfully";

#[derive(Debug, Serialize)]
pub struct AnalysisResponse {
    pub id: String,
    pub damage_score: f64,
    pub damage_percentage: Decimal,
    pub affected_area_sqm: f64,
    pub confidence: f64,
    pub method: ComparisonMethod,
    pub model_used: String,
    pub notes: String,
    pub breakdown: ScoreBreakdown,
    pub analyzed_at: DateTime<Utc>,
}

impl From<&DamageAssessment> for AnalysisResponse {
    fn from(assessment: &DamageAssessment) -> Self {
        Self {
            id: assessment.id.to_string(),
            damage_score: assessment.damage_score,
            damage_percentage: assessment.damage_percentage,
            affected_area_sqm: assessment.affected_area_sqm,
            confidence: assessment.confidence,
            method: assessment.method,
            model_used: assessment.model_used.clone(),
            notes: assessment.notes.clone(),
            breakdown: assessment.breakdown,
            analyzed_at: assessment.analyzed_at,
        }
    }
}

/// Body of a successful `POST /api/v1/damage-analysis`
#[derive(Debug, Serialize)]
pub struct DamageAnalysisResponse {
    pub claim: ClaimResponse,
    pub analysis: AnalysisResponse,
    pub message: String,
}
