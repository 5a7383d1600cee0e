//! Composite damage score

use serde::{Deserialize, Serialize};

use crate::context::LocationContext;
use crate::disaster::DisasterType;
use crate::error::AssessmentError;
use crate::policy::ScoringPolicy;

/// The three components of a composite score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub image_damage_ratio: f64,
    pub disaster_severity: f64,
    pub location_score: f64,
}

/// Composite score and the area estimate derived from it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AggregateScore {
    pub composite: f64,
    pub affected_area_sqm: f64,
    pub breakdown: ScoreBreakdown,
}

/// Weights image evidence, disaster severity and location context into one score
#[derive(Debug, Clone)]
pub struct DamageScoreAggregator {
    policy: ScoringPolicy,
}

impl DamageScoreAggregator {
    pub fn new(policy: ScoringPolicy) -> Result<Self, AssessmentError> {
        policy.validate()?;
        Ok(Self { policy })
    }

    pub fn policy(&self) -> &ScoringPolicy {
        &self.policy
    }

    pub fn disaster_severity(&self, disaster: &DisasterType) -> f64 {
        self.policy.severity.lookup(disaster)
    }

    pub fn location_score(&self, context: &LocationContext) -> f64 {
        self.policy.location.score(context)
    }

    pub fn aggregate(
        &self,
        image_damage_ratio: f64,
        disaster: &DisasterType,
        context: &LocationContext,
    ) -> Result<AggregateScore, AssessmentError> {
        if !image_damage_ratio.is_finite() || !(0.0..=1.0).contains(&image_damage_ratio) {
            return Err(AssessmentError::validation(format!(
                "image damage ratio must be within [0, 1], got {image_damage_ratio}"
            )));
        }
        context.validate()?;

        let breakdown = ScoreBreakdown {
            image_damage_ratio,
            disaster_severity: self.disaster_severity(disaster),
            location_score: self.location_score(context),
        };
        let weights = &self.policy.weights;
        let composite = weights.image * breakdown.image_damage_ratio
            + weights.severity * breakdown.disaster_severity
            + weights.location * breakdown.location_score;
        // Components and weights are already bounded; this only absorbs float error.
        let composite = composite.clamp(0.0, 1.0);

        Ok(AggregateScore {
            composite,
            affected_area_sqm: composite * self.policy.area_ceiling_sqm,
            breakdown,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::SeverityTable;

    fn aggregator() -> DamageScoreAggregator {
        DamageScoreAggregator::new(ScoringPolicy::default()).unwrap()
    }

    #[test]
    fn test_flood_with_moderate_context() {
        let context = LocationContext {
            vegetation_dryness: 0.5,
            sea_level_rise_m: 0.0,
            historical_events: 0,
        };
        let score = aggregator().aggregate(0.25, &DisasterType::Flood, &context).unwrap();

        let expected = 0.125 + 0.21 + 0.2 * (0.5 / 3.0);
        assert!((score.composite - expected).abs() < 1e-12);
        assert!((score.affected_area_sqm - expected * 5000.0).abs() < 1e-9);
        assert_eq!(score.breakdown.disaster_severity, 0.7);
    }

    #[test]
    fn test_unknown_disaster_uses_default_severity() {
        let score = aggregator()
            .aggregate(0.0, &DisasterType::parse("Volcano"), &LocationContext::default())
            .unwrap();
        assert_eq!(score.breakdown.disaster_severity, 0.5);
    }

    #[test]
    fn test_out_of_range_ratio_rejected() {
        let result = aggregator().aggregate(1.5, &DisasterType::Storm, &LocationContext::default());
        assert!(matches!(result, Err(AssessmentError::Validation(_))));
    }

    fn polar_policy() -> ScoringPolicy {
        ScoringPolicy {
            severity: SeverityTable {
                flood: 0.0,
                earthquake: 1.0,
                ..SeverityTable::default()
            },
            ..ScoringPolicy::default()
        }
    }

    fn quiet_context() -> LocationContext {
        LocationContext {
            vegetation_dryness: 0.0,
            sea_level_rise_m: 0.0,
            historical_events: 0,
        }
    }

    fn capped_context() -> LocationContext {
        LocationContext {
            vegetation_dryness: 1.0,
            sea_level_rise_m: 10.0,
            historical_events: 10,
        }
    }

    #[test]
    fn test_all_components_zero() {
        let aggregator = DamageScoreAggregator::new(polar_policy()).unwrap();
        let score = aggregator.aggregate(0.0, &DisasterType::Flood, &quiet_context()).unwrap();
        assert_eq!(score.composite, 0.0);
        assert_eq!(score.affected_area_sqm, 0.0);
    }

    #[test]
    fn test_all_components_one() {
        let policy = ScoringPolicy {
            severity: SeverityTable {
                flood: 1.0,
                ..SeverityTable::default()
            },
            ..ScoringPolicy::default()
        };
        let aggregator = DamageScoreAggregator::new(policy).unwrap();
        let score = aggregator.aggregate(1.0, &DisasterType::Flood, &capped_context()).unwrap();
        assert_eq!(score.breakdown.location_score, 1.0);
        assert_eq!(score.composite, 1.0);
        assert_eq!(score.affected_area_sqm, 5000.0);
    }

    #[test]
    fn test_every_corner_of_the_component_cube() {
        let aggregator = DamageScoreAggregator::new(polar_policy()).unwrap();
        for ratio in [0.0, 1.0] {
            for (disaster, severity) in [(DisasterType::Flood, 0.0), (DisasterType::Earthquake, 1.0)] {
                for (context, location) in [(quiet_context(), 0.0), (capped_context(), 1.0)] {
                    let score = aggregator.aggregate(ratio, &disaster, &context).unwrap();
                    let expected = 0.5 * ratio + 0.3 * severity + 0.2 * location;
                    assert!((0.0..=1.0).contains(&score.composite));
                    assert!((score.composite - expected).abs() < 1e-12, "{ratio} {disaster} {location}");
                    assert!((0.0..=5000.0).contains(&score.affected_area_sqm));
                }
            }
        }
    }

    #[test]
    fn test_invalid_policy_rejected_at_construction() {
        let mut policy = ScoringPolicy::default();
        policy.location.cap = 0.0;
        assert!(DamageScoreAggregator::new(policy).is_err());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn disaster() -> impl Strategy<Value = DisasterType> {
        prop_oneof![
            Just(DisasterType::Flood),
            Just(DisasterType::Wildfire),
            Just(DisasterType::Storm),
            Just(DisasterType::Earthquake),
            Just(DisasterType::Drought),
            "[a-z]{3,10}".prop_map(|name| DisasterType::parse(&name)),
        ]
    }

    proptest! {
        #[test]
        fn composite_is_bounded(
            ratio in 0.0f64..=1.0,
            dryness in 0.0f64..=1.0,
            sea_level in 0.0f64..50.0,
            events in 0u32..1000,
            disaster in disaster(),
        ) {
            let aggregator = DamageScoreAggregator::new(ScoringPolicy::default()).unwrap();
            let context = LocationContext {
                vegetation_dryness: dryness,
                sea_level_rise_m: sea_level,
                historical_events: events,
            };
            let score = aggregator.aggregate(ratio, &disaster, &context).unwrap();
            prop_assert!((0.0..=1.0).contains(&score.composite));
            prop_assert!((0.0..=5000.0).contains(&score.affected_area_sqm));
        }

        #[test]
        fn composite_grows_with_image_damage(
            low in 0.0f64..0.5,
            bump in 0.0f64..0.5,
        ) {
            let aggregator = DamageScoreAggregator::new(ScoringPolicy::default()).unwrap();
            let context = LocationContext::default();
            let a = aggregator.aggregate(low, &DisasterType::Storm, &context).unwrap();
            let b = aggregator.aggregate(low + bump, &DisasterType::Storm, &context).unwrap();
            prop_assert!(b.composite >= a.composite);
        }
    }
}
