//! Property-Based Test Generators
//!
//! Proptest strategies for scoring inputs, plus `fake` location names.

use fake::faker::address::en::CityName;
use fake::Fake;
use proptest::prelude::*;

use domain_assessment::{DisasterType, LocationContext};

/// Strategy for image-damage ratios in [0, 1]
pub fn ratio_strategy() -> impl Strategy<Value = f64> {
    0.0f64..=1.0
}

/// Strategy for known and unknown disaster types
pub fn disaster_strategy() -> impl Strategy<Value = DisasterType> {
    prop_oneof![
        Just(DisasterType::Flood),
        Just(DisasterType::Wildfire),
        Just(DisasterType::Storm),
        Just(DisasterType::Earthquake),
        Just(DisasterType::Drought),
        "[A-Z][a-z]{3,10}".prop_map(|name| DisasterType::parse(&name)),
    ]
}

/// Strategy for valid location contexts, including ones above the cap
pub fn location_context_strategy() -> impl Strategy<Value = LocationContext> {
    (0.0f64..=1.0, 0.0f64..20.0, 0u32..50).prop_map(|(dryness, sea_level, events)| LocationContext {
        vegetation_dryness: dryness,
        sea_level_rise_m: sea_level,
        historical_events: events,
    })
}

/// Strategy for finite trigger readings
pub fn reading_strategy() -> impl Strategy<Value = f64> {
    -1_000.0f64..1_000.0
}

/// A random city name
pub fn fake_location() -> String {
    CityName().fake()
}
