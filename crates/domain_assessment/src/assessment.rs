//! Assessment pipeline
//!
//! [`DamageAssessor`] orchestrates one assessment:
//! detect objects in both images, pick a comparison strategy, derive the
//! image-damage ratio, then aggregate it with severity and location.

use chrono::{DateTime, Utc};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};

use core_kernel::AssessmentId;

use crate::aggregator::{DamageScoreAggregator, ScoreBreakdown};
use crate::comparator::{ComparisonMethod, ComparisonStrategy, ObjectChangeComparator};
use crate::context::ImagePair;
use crate::detection::DetectionAdapter;
use crate::error::{AssessmentError, ImageRole};
use crate::policy::ScoringPolicy;
use crate::similarity::SimilarityFallback;

/// Outcome of assessing one image pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DamageAssessment {
    pub id: AssessmentId,
    /// Composite damage score in [0, 1]
    pub damage_score: f64,
    /// `damage_score * 100`, rounded for storage
    pub damage_percentage: Decimal,
    pub affected_area_sqm: f64,
    pub confidence: f64,
    pub method: ComparisonMethod,
    pub model_used: String,
    pub notes: String,
    pub breakdown: ScoreBreakdown,
    pub analyzed_at: DateTime<Utc>,
}

/// Image-damage ratio and how it was measured
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageEvidence {
    pub ratio: f64,
    pub method: ComparisonMethod,
}

pub struct DamageAssessor {
    detection: DetectionAdapter,
    similarity: SimilarityFallback,
    comparator: ObjectChangeComparator,
    aggregator: DamageScoreAggregator,
}

impl DamageAssessor {
    pub fn new(
        detection: DetectionAdapter,
        similarity: SimilarityFallback,
        aggregator: DamageScoreAggregator,
    ) -> Self {
        Self {
            detection,
            similarity,
            comparator: ObjectChangeComparator,
            aggregator,
        }
    }

    pub fn policy(&self) -> &ScoringPolicy {
        self.aggregator.policy()
    }

    /// Measures how much the post image differs from the pre image
    pub async fn image_evidence(&self, pair: &ImagePair) -> Result<ImageEvidence, AssessmentError> {
        let pre = self.detection.detect(ImageRole::Pre, Arc::clone(pair.pre_image())).await?;
        let post = self.detection.detect(ImageRole::Post, Arc::clone(pair.post_image())).await?;

        let strategy = ComparisonStrategy::select(pre, post);
        let ratio = match &strategy {
            ComparisonStrategy::ObjectDiff { pre, post } => self.comparator.change_ratio(pre, post),
            ComparisonStrategy::PixelSimilarity => {
                self.similarity
                    .damage_ratio(Arc::clone(pair.pre_image()), Arc::clone(pair.post_image()))
                    .await?
            }
        };

        Ok(ImageEvidence {
            ratio,
            method: strategy.method(),
        })
    }

    /// Runs the full assessment for a validated image pair
    #[instrument(skip_all, fields(location = %pair.location_name(), disaster = %pair.disaster_type()))]
    pub async fn assess(&self, pair: &ImagePair) -> Result<DamageAssessment, AssessmentError> {
        let evidence = self.image_evidence(pair).await?;
        let score = self
            .aggregator
            .aggregate(evidence.ratio, pair.disaster_type(), pair.context())?;

        let policy = self.policy();
        let damage_percentage = Decimal::from_f64(score.composite * 100.0)
            .ok_or_else(|| AssessmentError::validation("damage score is not representable"))?
            .round_dp_with_strategy(policy.percentage_precision, RoundingStrategy::MidpointAwayFromZero);

        let model_used = match evidence.method {
            ComparisonMethod::ObjectDiff => format!("{} object comparator", self.detection.model_name()),
            ComparisonMethod::PixelSimilarity => format!("{} pixel comparator", self.similarity.scorer_name()),
        };
        let notes = format!(
            "Automated analysis using {}. Confidence: {:.2}%",
            model_used,
            policy.confidence * 100.0
        );

        info!(
            method = %evidence.method,
            image_ratio = evidence.ratio,
            damage_score = score.composite,
            "Damage assessed"
        );

        Ok(DamageAssessment {
            id: AssessmentId::new_v7(),
            damage_score: score.composite,
            damage_percentage,
            affected_area_sqm: score.affected_area_sqm,
            confidence: policy.confidence,
            method: evidence.method,
            model_used,
            notes,
            breakdown: score.breakdown,
            analyzed_at: Utc::now(),
        })
    }
}
