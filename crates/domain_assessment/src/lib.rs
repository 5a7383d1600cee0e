//! Damage Assessment Domain
//!
//! Turns a before/after image pair for a disaster-affected location into a
//! bounded composite damage score.
//!
//! # Pipeline
//!
//! ```text
//!  pre image ──► DetectionAdapter ──┐
//!                                   ├─► ComparisonStrategy ─┬─ ObjectDiff ───────► change ratio
//!  post image ─► DetectionAdapter ──┘   (both empty?)       └─ PixelSimilarity ──► 1 - SSIM
//!
//!  image ratio + disaster severity + location score ──► DamageScoreAggregator ──► DamageAssessment
//! ```
//!
//! The detector and the similarity scorer are ports: this crate consumes
//! inference results and never trains or tunes a model.

pub mod error;
pub mod disaster;
pub mod context;
pub mod detection;
pub mod comparator;
pub mod similarity;
pub mod policy;
pub mod aggregator;
pub mod assessment;
pub mod risk;
pub mod adapters;

pub use error::{AssessmentError, Capability, ImageRole};
pub use disaster::DisasterType;
pub use context::{ImagePair, LocationContext};
pub use detection::{Detection, DetectionAdapter, DetectionResult, NullDetector, ObjectDetector};
pub use comparator::{ComparisonMethod, ComparisonStrategy, ObjectChangeComparator};
pub use similarity::{SimilarityFallback, SimilarityScorer, SsimScorer};
pub use policy::{LocationNormalization, ScoreWeights, ScoringPolicy, SeverityTable};
pub use aggregator::{AggregateScore, DamageScoreAggregator, ScoreBreakdown};
pub use assessment::{DamageAssessment, DamageAssessor, ImageEvidence};
pub use risk::{ClimateFactors, HazardRisks, RiskBand, RiskZone};
pub use adapters::{RemoteDetector, RemoteDetectorConfig};
#[cfg(any(test, feature = "mock"))]
pub use detection::mock::{FixedSimilarityScorer, ScriptedDetector};
