//! Risk zones
//!
//! A risk zone is reference data about a location: hazard probabilities and
//! the climate readings that feed the location component of a damage score.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::RiskZoneId;

use crate::context::LocationContext;
use crate::error::AssessmentError;

/// Coarse banding of a zone's composite risk score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskBand {
    Low,
    Medium,
    High,
}

impl RiskBand {
    /// High at 70 and above, medium from 50, low below
    pub fn from_score(score: u8) -> Self {
        match score {
            70.. => RiskBand::High,
            50..=69 => RiskBand::Medium,
            _ => RiskBand::Low,
        }
    }
}

impl fmt::Display for RiskBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskBand::Low => write!(f, "low"),
            RiskBand::Medium => write!(f, "medium"),
            RiskBand::High => write!(f, "high"),
        }
    }
}

/// Hazard probabilities, each in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HazardRisks {
    pub flood: f64,
    pub wildfire: f64,
    pub storm: f64,
}

impl HazardRisks {
    /// Mean hazard as a whole percentage, truncated
    pub fn composite_score(&self) -> u8 {
        let mean = (self.flood + self.wildfire + self.storm) * 100.0 / 3.0;
        mean.clamp(0.0, 100.0) as u8
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClimateFactors {
    pub vegetation_dryness: f64,
    pub avg_temperature_c: f64,
    pub sea_level_rise_m: f64,
    pub historical_events: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskZone {
    pub id: RiskZoneId,
    pub location_name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub hazards: HazardRisks,
    pub climate: ClimateFactors,
    pub risk_score: u8,
    pub updated_at: DateTime<Utc>,
}

impl RiskZone {
    pub fn new(
        location_name: impl Into<String>,
        latitude: f64,
        longitude: f64,
        hazards: HazardRisks,
        climate: ClimateFactors,
    ) -> Result<Self, AssessmentError> {
        let location_name = location_name.into();
        if location_name.trim().is_empty() {
            return Err(AssessmentError::validation("location_name is required"));
        }
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(AssessmentError::validation(format!(
                "coordinates out of range: ({latitude}, {longitude})"
            )));
        }
        for (name, value) in [
            ("flood_risk", hazards.flood),
            ("wildfire_risk", hazards.wildfire),
            ("storm_risk", hazards.storm),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(AssessmentError::validation(format!(
                    "{name} must be within [0, 1], got {value}"
                )));
            }
        }

        let zone = Self {
            id: RiskZoneId::new_v7(),
            location_name,
            latitude,
            longitude,
            hazards,
            climate,
            risk_score: hazards.composite_score(),
            updated_at: Utc::now(),
        };
        zone.location_context().validate()?;
        Ok(zone)
    }

    pub fn band(&self) -> RiskBand {
        RiskBand::from_score(self.risk_score)
    }

    /// Replaces the hazard readings and recomputes the risk score
    pub fn update_hazards(&mut self, hazards: HazardRisks) {
        self.hazards = hazards;
        self.risk_score = hazards.composite_score();
        self.updated_at = Utc::now();
    }

    pub fn location_context(&self) -> LocationContext {
        LocationContext {
            vegetation_dryness: self.climate.vegetation_dryness,
            sea_level_rise_m: self.climate.sea_level_rise_m,
            historical_events: self.climate.historical_events,
        }
    }
}

impl From<&RiskZone> for LocationContext {
    fn from(zone: &RiskZone) -> Self {
        zone.location_context()
    }
}
