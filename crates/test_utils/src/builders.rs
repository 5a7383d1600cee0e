//! Test Data Builders
//!
//! Builders start from valid defaults so a test only spells out the field
//! it is about.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use domain_assessment::{DisasterType, ImagePair, LocationContext};
use domain_claims::{ClaimStatus, DirectClaimRequest};
use domain_parametric::TriggerInput;

use crate::fixtures::{ImageFixtures, StringFixtures};

/// Builder for [`ImagePair`]
pub struct ImagePairBuilder {
    pre: Vec<u8>,
    post: Vec<u8>,
    location: String,
    disaster: DisasterType,
    context: LocationContext,
}

impl Default for ImagePairBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ImagePairBuilder {
    pub fn new() -> Self {
        Self {
            pre: ImageFixtures::pre_disaster(),
            post: ImageFixtures::post_disaster(),
            location: StringFixtures::location().to_string(),
            disaster: DisasterType::Flood,
            context: LocationContext::default(),
        }
    }

    pub fn with_images(mut self, pre: Vec<u8>, post: Vec<u8>) -> Self {
        self.pre = pre;
        self.post = post;
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    pub fn with_disaster(mut self, disaster: DisasterType) -> Self {
        self.disaster = disaster;
        self
    }

    pub fn with_context(mut self, context: LocationContext) -> Self {
        self.context = context;
        self
    }

    /// Panics if the configured fields are invalid
    pub fn build(self) -> ImagePair {
        ImagePair::new(self.pre, self.post, self.location, self.disaster, self.context)
            .expect("ImagePairBuilder produced an invalid pair")
    }
}

/// Builder for [`DirectClaimRequest`]
pub struct DirectClaimBuilder {
    request: DirectClaimRequest,
}

impl Default for DirectClaimBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DirectClaimBuilder {
    pub fn new() -> Self {
        Self {
            request: DirectClaimRequest {
                policy_number: None,
                location_name: StringFixtures::location().to_string(),
                disaster_type: DisasterType::Flood,
                damage_score: 0.5,
                claim_amount: dec!(25000.00),
                status: None,
            },
        }
    }

    pub fn with_score(mut self, damage_score: f64) -> Self {
        self.request.damage_score = damage_score;
        self
    }

    pub fn with_amount(mut self, amount: Decimal) -> Self {
        self.request.claim_amount = amount;
        self
    }

    pub fn with_status(mut self, status: ClaimStatus) -> Self {
        self.request.status = Some(status);
        self
    }

    pub fn with_policy_number(mut self, policy_number: impl Into<String>) -> Self {
        self.request.policy_number = Some(policy_number.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.request.location_name = location.into();
        self
    }

    pub fn with_disaster(mut self, disaster: DisasterType) -> Self {
        self.request.disaster_type = disaster;
        self
    }

    pub fn build(self) -> DirectClaimRequest {
        self.request
    }
}

/// Builder for [`TriggerInput`]
pub struct TriggerInputBuilder {
    input: TriggerInput,
}

impl Default for TriggerInputBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TriggerInputBuilder {
    pub fn new() -> Self {
        Self {
            input: TriggerInput {
                trigger_code: StringFixtures::trigger_code().to_string(),
                parameter: StringFixtures::parameter().to_string(),
                threshold: 100.0,
                current_value: 40.0,
                triggered: None,
                location_name: StringFixtures::location().to_string(),
                date_checked: None,
            },
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.input.trigger_code = code.into();
        self
    }

    pub fn with_values(mut self, threshold: f64, current_value: f64) -> Self {
        self.input.threshold = threshold;
        self.input.current_value = current_value;
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.input.location_name = location.into();
        self
    }

    pub fn with_parameter(mut self, parameter: impl Into<String>) -> Self {
        self.input.parameter = parameter.into();
        self
    }

    /// A client-supplied flag; evaluation ignores it
    pub fn claiming_triggered(mut self, triggered: bool) -> Self {
        self.input.triggered = Some(triggered);
        self
    }

    pub fn checked_on(mut self, date: NaiveDate) -> Self {
        self.input.date_checked = Some(date);
        self
    }

    pub fn build(self) -> TriggerInput {
        self.input
    }
}
