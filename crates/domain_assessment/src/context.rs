//! Assessment inputs: the image pair and its location context

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::disaster::DisasterType;
use crate::error::AssessmentError;

pub const MAX_LOCATION_NAME_LEN: usize = 200;

/// Environmental context for the assessed location
///
/// Missing readings fall back to the defaults: dryness 0.5, no sea-level
/// rise, no recorded events.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationContext {
    /// Vegetation dryness in [0, 1]
    pub vegetation_dryness: f64,
    /// Observed sea-level rise in metres, non-negative
    pub sea_level_rise_m: f64,
    /// Count of past events recorded at the location
    pub historical_events: u32,
}

impl Default for LocationContext {
    fn default() -> Self {
        Self {
            vegetation_dryness: 0.5,
            sea_level_rise_m: 0.0,
            historical_events: 0,
        }
    }
}

impl LocationContext {
    /// Builds a context from optional readings, applying defaults for the gaps
    pub fn from_readings(
        vegetation_dryness: Option<f64>,
        sea_level_rise_m: Option<f64>,
        historical_events: Option<u32>,
    ) -> Result<Self, AssessmentError> {
        let defaults = Self::default();
        let context = Self {
            vegetation_dryness: vegetation_dryness.unwrap_or(defaults.vegetation_dryness),
            sea_level_rise_m: sea_level_rise_m.unwrap_or(defaults.sea_level_rise_m),
            historical_events: historical_events.unwrap_or(defaults.historical_events),
        };
        context.validate()?;
        Ok(context)
    }

    pub fn validate(&self) -> Result<(), AssessmentError> {
        if !self.vegetation_dryness.is_finite() || !(0.0..=1.0).contains(&self.vegetation_dryness) {
            return Err(AssessmentError::validation(format!(
                "vegetation_dryness must be within [0, 1], got {}",
                self.vegetation_dryness
            )));
        }
        if !self.sea_level_rise_m.is_finite() || self.sea_level_rise_m < 0.0 {
            return Err(AssessmentError::validation(format!(
                "sea_level_rise_m must be non-negative, got {}",
                self.sea_level_rise_m
            )));
        }
        Ok(())
    }
}

/// A before/after image pair submitted for assessment
///
/// Image bytes are shared, so the pair can be handed to blocking workers
/// without copying.
#[derive(Clone)]
pub struct ImagePair {
    pre_image: Arc<[u8]>,
    post_image: Arc<[u8]>,
    location_name: String,
    disaster_type: DisasterType,
    context: LocationContext,
}

impl ImagePair {
    pub fn new(
        pre_image: impl Into<Arc<[u8]>>,
        post_image: impl Into<Arc<[u8]>>,
        location_name: impl Into<String>,
        disaster_type: DisasterType,
        context: LocationContext,
    ) -> Result<Self, AssessmentError> {
        let pre_image = pre_image.into();
        let post_image = post_image.into();
        let location_name = location_name.into().trim().to_string();

        if pre_image.is_empty() {
            return Err(AssessmentError::validation("pre_image is required"));
        }
        if post_image.is_empty() {
            return Err(AssessmentError::validation("post_image is required"));
        }
        if location_name.is_empty() {
            return Err(AssessmentError::validation("location_name is required"));
        }
        if location_name.chars().count() > MAX_LOCATION_NAME_LEN {
            return Err(AssessmentError::validation(format!(
                "location_name must be at most {MAX_LOCATION_NAME_LEN} characters"
            )));
        }
        if disaster_type.is_blank() {
            return Err(AssessmentError::validation("disaster_type is required"));
        }
        context.validate()?;

        Ok(Self {
            pre_image,
            post_image,
            location_name,
            disaster_type,
            context,
        })
    }

    pub fn pre_image(&self) -> &Arc<[u8]> {
        &self.pre_image
    }

    pub fn post_image(&self) -> &Arc<[u8]> {
        &self.post_image
    }

    pub fn location_name(&self) -> &str {
        &self.location_name
    }

    pub fn disaster_type(&self) -> &DisasterType {
        &self.disaster_type
    }

    pub fn context(&self) -> &LocationContext {
        &self.context
    }
}

impl fmt::Debug for ImagePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImagePair")
            .field("pre_image_bytes", &self.pre_image.len())
            .field("post_image_bytes", &self.post_image.len())
            .field("location_name", &self.location_name)
            .field("disaster_type", &self.disaster_type)
            .field("context", &self.context)
            .finish()
    }
}
