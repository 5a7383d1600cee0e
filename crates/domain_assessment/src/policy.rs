//! Scoring policy
//!
//! Every constant of the composite score lives here so deployments can tune
//! it through configuration. The defaults reproduce the production scoring.

use serde::{Deserialize, Serialize};

use crate::context::LocationContext;
use crate::disaster::DisasterType;
use crate::error::AssessmentError;

/// Rounds half away from zero to `dp` decimal places
pub fn round_half_away(value: f64, dp: u32) -> f64 {
    let factor = 10f64.powi(dp as i32);
    (value * factor).round() / factor
}

/// Weights of the three composite components; they must sum to 1
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub image: f64,
    pub severity: f64,
    pub location: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            image: 0.5,
            severity: 0.3,
            location: 0.2,
        }
    }
}

/// Severity per disaster category
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeverityTable {
    pub flood: f64,
    pub wildfire: f64,
    pub storm: f64,
    pub earthquake: f64,
    /// Drought has no dedicated severity unless one is configured
    pub drought: Option<f64>,
    /// Used for any category without an entry
    pub default: f64,
}

impl Default for SeverityTable {
    fn default() -> Self {
        Self {
            flood: 0.7,
            wildfire: 0.8,
            storm: 0.6,
            earthquake: 0.9,
            drought: None,
            default: 0.5,
        }
    }
}

impl SeverityTable {
    pub fn lookup(&self, disaster: &DisasterType) -> f64 {
        match disaster {
            DisasterType::Flood => self.flood,
            DisasterType::Wildfire => self.wildfire,
            DisasterType::Storm => self.storm,
            DisasterType::Earthquake => self.earthquake,
            DisasterType::Drought => self.drought.unwrap_or(self.default),
            DisasterType::Other(_) => self.default,
        }
    }

    fn values(&self) -> impl Iterator<Item = (&'static str, f64)> {
        [
            ("flood", self.flood),
            ("wildfire", self.wildfire),
            ("storm", self.storm),
            ("earthquake", self.earthquake),
            ("default", self.default),
        ]
        .into_iter()
        .chain(self.drought.map(|d| ("drought", d)))
    }
}

/// Normalisation of the location context into [0, 1]
///
/// `score = min(dryness / a + sea_level / b + events / c, cap) / cap`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationNormalization {
    pub dryness_divisor: f64,
    pub sea_level_divisor: f64,
    pub events_divisor: f64,
    pub cap: f64,
}

impl Default for LocationNormalization {
    fn default() -> Self {
        Self {
            dryness_divisor: 1.0,
            sea_level_divisor: 5.0,
            events_divisor: 10.0,
            cap: 3.0,
        }
    }
}

impl LocationNormalization {
    pub fn score(&self, context: &LocationContext) -> f64 {
        let raw = context.vegetation_dryness / self.dryness_divisor
            + context.sea_level_rise_m / self.sea_level_divisor
            + f64::from(context.historical_events) / self.events_divisor;
        raw.min(self.cap) / self.cap
    }
}

/// Complete scoring configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringPolicy {
    pub weights: ScoreWeights,
    pub severity: SeverityTable,
    pub location: LocationNormalization,
    /// Affected area in square metres at a damage score of 1
    pub area_ceiling_sqm: f64,
    /// Confidence recorded on every assessment
    pub confidence: f64,
    /// Decimal places of the pixel-similarity damage ratio
    pub similarity_precision: u32,
    /// Decimal places of the stored damage percentage, at most
    /// [`ScoringPolicy::MAX_PERCENTAGE_DP`]
    pub percentage_precision: u32,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            weights: ScoreWeights::default(),
            severity: SeverityTable::default(),
            location: LocationNormalization::default(),
            area_ceiling_sqm: 5000.0,
            confidence: 0.9,
            similarity_precision: 2,
            percentage_precision: 2,
        }
    }
}

impl ScoringPolicy {
    /// Scale of the `damage_percentage` column (`NUMERIC(7, 4)`)
    pub const MAX_PERCENTAGE_DP: u32 = 4;

    pub fn validate(&self) -> Result<(), AssessmentError> {
        let ScoreWeights { image, severity, location } = self.weights;
        for (name, weight) in [("image", image), ("severity", severity), ("location", location)] {
            if !weight.is_finite() || weight < 0.0 {
                return Err(AssessmentError::InvalidPolicy(format!(
                    "weight '{name}' must be a non-negative number"
                )));
            }
        }
        let sum = image + severity + location;
        if (sum - 1.0).abs() > 1e-9 {
            return Err(AssessmentError::InvalidPolicy(format!(
                "weights must sum to 1, got {sum}"
            )));
        }

        for (name, value) in self.severity.values() {
            if !(0.0..=1.0).contains(&value) {
                return Err(AssessmentError::InvalidPolicy(format!(
                    "severity '{name}' must be within [0, 1], got {value}"
                )));
            }
        }

        let norm = &self.location;
        for (name, divisor) in [
            ("dryness_divisor", norm.dryness_divisor),
            ("sea_level_divisor", norm.sea_level_divisor),
            ("events_divisor", norm.events_divisor),
            ("cap", norm.cap),
        ] {
            if !divisor.is_finite() || divisor <= 0.0 {
                return Err(AssessmentError::InvalidPolicy(format!(
                    "location '{name}' must be positive"
                )));
            }
        }

        if !self.area_ceiling_sqm.is_finite() || self.area_ceiling_sqm < 0.0 {
            return Err(AssessmentError::InvalidPolicy(
                "area_ceiling_sqm must be non-negative".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(AssessmentError::InvalidPolicy(
                "confidence must be within [0, 1]".to_string(),
            ));
        }
        if self.similarity_precision > 10 {
            return Err(AssessmentError::InvalidPolicy(
                "similarity_precision must be at most 10 decimal places".to_string(),
            ));
        }
        if self.percentage_precision > Self::MAX_PERCENTAGE_DP {
            return Err(AssessmentError::InvalidPolicy(format!(
                "percentage_precision must be at most {} decimal places",
                Self::MAX_PERCENTAGE_DP
            )));
        }
        Ok(())
    }
}
