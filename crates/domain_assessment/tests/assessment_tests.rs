//! Pipeline tests for domain_assessment

use async_trait::async_trait;
use image::{DynamicImage, GrayImage};
use rust_decimal_macros::dec;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use core_kernel::{DomainPort, PortError};

use domain_assessment::{
    AssessmentError, ComparisonMethod, DamageAssessor, DamageScoreAggregator, Detection,
    DetectionAdapter, DisasterType, ImagePair, LocationContext, NullDetector, ObjectDetector,
    ScoringPolicy, SimilarityFallback, SimilarityScorer, SsimScorer,
};
use test_utils::{assert_unit_interval, DetectionFixtures, ImageFixtures, ImagePairBuilder};

// ============================================================================
// Test doubles
// ============================================================================

/// Returns one prepared label set per call, in order
struct QueuedDetector {
    queue: Mutex<Vec<Vec<&'static str>>>,
}

impl QueuedDetector {
    fn new(pre: Vec<&'static str>, post: Vec<&'static str>) -> Self {
        Self {
            queue: Mutex::new(vec![post, pre]),
        }
    }
}

impl DomainPort for QueuedDetector {}

#[async_trait]
impl ObjectDetector for QueuedDetector {
    fn model_name(&self) -> &str {
        "queued"
    }

    async fn detect(&self, _image: &DynamicImage) -> Result<Vec<Detection>, PortError> {
        let labels = self.queue.lock().unwrap().pop().unwrap_or_default();
        Ok(labels.into_iter().map(|l| Detection::new(l, 0.9)).collect())
    }
}

struct ConstantScorer(f64);

impl DomainPort for ConstantScorer {}

impl SimilarityScorer for ConstantScorer {
    fn name(&self) -> &str {
        "constant"
    }

    fn similarity(&self, _pre: &GrayImage, _post: &GrayImage) -> Result<f64, PortError> {
        Ok(self.0)
    }
}

/// Tracks how many detections are in flight at once
#[derive(Default)]
struct InFlightDetector {
    current: AtomicUsize,
    peak: AtomicUsize,
    calls: AtomicUsize,
}

impl DomainPort for InFlightDetector {}

#[async_trait]
impl ObjectDetector for InFlightDetector {
    fn model_name(&self) -> &str {
        "in-flight"
    }

    async fn detect(&self, _image: &DynamicImage) -> Result<Vec<Detection>, PortError> {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(20)).await;
        self.current.fetch_sub(1, Ordering::SeqCst);
        Ok(vec![Detection::new("house", 0.9)])
    }
}

fn png(width: u32, height: u32, shade: u8) -> Vec<u8> {
    ImageFixtures::solid_png(width, height, [shade; 3])
}

fn assessor(detector: Arc<dyn ObjectDetector>, scorer: Arc<dyn SimilarityScorer>) -> DamageAssessor {
    DamageAssessor::new(
        DetectionAdapter::new(detector, Duration::from_secs(5)),
        SimilarityFallback::new(scorer, Duration::from_secs(5), 2),
        DamageScoreAggregator::new(ScoringPolicy::default()).unwrap(),
    )
}

fn pair(pre: Vec<u8>, post: Vec<u8>, disaster: &str) -> ImagePair {
    ImagePair::new(pre, post, "Miami", DisasterType::parse(disaster), LocationContext::default()).unwrap()
}

// ============================================================================
// Object-diff path
// ============================================================================

mod object_diff {
    use super::*;

    #[tokio::test]
    async fn test_vanished_car_in_flood() {
        let assessor = assessor(
            Arc::new(QueuedDetector::new(vec!["car"], vec![])),
            Arc::new(ConstantScorer(1.0)),
        );

        let assessment = assessor.assess(&pair(png(8, 8, 10), png(8, 8, 200), "Flood")).await.unwrap();

        let expected = 0.5 + 0.3 * 0.7 + 0.2 * (0.5 / 3.0);
        assert!((assessment.damage_score - expected).abs() < 1e-9);
        assert!((assessment.affected_area_sqm - 3716.6667).abs() < 1e-3);
        assert_eq!(assessment.method, ComparisonMethod::ObjectDiff);
        assert_eq!(assessment.breakdown.image_damage_ratio, 1.0);
        assert_eq!(assessment.damage_percentage, dec!(74.33));
        assert_eq!(assessment.confidence, 0.9);
        assert_eq!(assessment.model_used, "queued object comparator");
        assert_eq!(
            assessment.notes,
            "Automated analysis using queued object comparator. Confidence: 90.00%"
        );
    }

    #[tokio::test]
    async fn test_flooded_street_fixture() {
        let assessor = assessor(
            Arc::new(DetectionFixtures::flood_detector()),
            Arc::new(ConstantScorer(1.0)),
        );

        let assessment = assessor
            .assess(&pair(ImageFixtures::pre_disaster(), ImageFixtures::post_disaster(), "Flood"))
            .await
            .unwrap();

        assert_eq!(assessment.method, ComparisonMethod::ObjectDiff);
        assert!((assessment.breakdown.image_damage_ratio - 0.75).abs() < 1e-12);
        assert_unit_interval(assessment.damage_score);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_pre_and_post_are_detected_one_at_a_time() {
        let detector = Arc::new(InFlightDetector::default());
        let assessor = assessor(detector.clone(), Arc::new(ConstantScorer(1.0)));

        assessor.assess(&pair(png(8, 8, 10), png(8, 8, 200), "Storm")).await.unwrap();

        assert_eq!(detector.calls.load(Ordering::SeqCst), 2);
        assert_eq!(detector.peak.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unchanged_scene_scores_context_only() {
        let assessor = assessor(
            Arc::new(QueuedDetector::new(vec!["house", "road"], vec!["road", "house"])),
            Arc::new(ConstantScorer(0.0)),
        );

        let assessment = assessor.assess(&pair(png(4, 4, 0), png(4, 4, 0), "Earthquake")).await.unwrap();

        assert_eq!(assessment.breakdown.image_damage_ratio, 0.0);
        let expected = 0.3 * 0.9 + 0.2 * (0.5 / 3.0);
        assert!((assessment.damage_score - expected).abs() < 1e-9);
    }
}

// ============================================================================
// Pixel-similarity path
// ============================================================================

mod pixel_similarity {
    use super::*;

    #[tokio::test]
    async fn test_mostly_similar_storm_scene() {
        let assessor = assessor(Arc::new(NullDetector), Arc::new(ConstantScorer(0.95)));

        let assessment = assessor.assess(&pair(png(8, 8, 90), png(8, 8, 95), "Storm")).await.unwrap();

        assert_eq!(assessment.method, ComparisonMethod::PixelSimilarity);
        assert!((assessment.breakdown.image_damage_ratio - 0.05).abs() < 1e-12);
        let expected = 0.5 * 0.05 + 0.3 * 0.6 + 0.2 * (0.5 / 3.0);
        assert!((assessment.damage_score - expected).abs() < 1e-9);
        assert!(assessment.damage_score < 0.7);
        assert_eq!(assessment.model_used, "constant pixel comparator");
    }

    #[tokio::test]
    async fn test_blind_detector_falls_back_to_pixels() {
        let assessor = assessor(
            Arc::new(DetectionFixtures::blind_detector()),
            Arc::new(ConstantScorer(0.4)),
        );

        let assessment = assessor
            .assess(&pair(ImageFixtures::pre_disaster(), ImageFixtures::post_disaster(), "Wildfire"))
            .await
            .unwrap();

        assert_eq!(assessment.method, ComparisonMethod::PixelSimilarity);
        assert!((assessment.breakdown.image_damage_ratio - 0.6).abs() < 1e-12);
    }

    #[tokio::test]
    async fn test_undecodable_images_fail_on_fallback() {
        let assessor = assessor(Arc::new(NullDetector), Arc::new(SsimScorer::default()));

        let result = assessor
            .assess(&pair(ImageFixtures::corrupt(), png(8, 8, 0), "Flood"))
            .await;

        assert!(matches!(result, Err(AssessmentError::ImageDecode { .. })));
    }

    #[tokio::test]
    async fn test_identical_images_with_real_scorer() {
        let assessor = assessor(Arc::new(NullDetector), Arc::new(SsimScorer::default()));
        let image = png(24, 24, 128);

        let assessment = assessor.assess(&pair(image.clone(), image, "Wildfire")).await.unwrap();

        assert_eq!(assessment.breakdown.image_damage_ratio, 0.0);
        assert_eq!(assessment.breakdown.disaster_severity, 0.8);
    }

    #[tokio::test]
    async fn test_different_sizes_are_compared() {
        let assessor = assessor(Arc::new(NullDetector), Arc::new(SsimScorer::default()));

        let assessment = assessor.assess(&pair(png(32, 20, 60), png(16, 40, 60), "Flood")).await.unwrap();

        assert_eq!(assessment.breakdown.image_damage_ratio, 0.0);
    }
}

// ============================================================================
// Context and severity
// ============================================================================

mod context {
    use super::*;

    #[tokio::test]
    async fn test_extreme_context_is_capped() {
        let assessor = assessor(Arc::new(NullDetector), Arc::new(ConstantScorer(1.0)));
        let context = LocationContext {
            vegetation_dryness: 1.0,
            sea_level_rise_m: 100.0,
            historical_events: 1000,
        };
        let pair = ImagePairBuilder::new()
            .with_images(png(4, 4, 0), png(4, 4, 0))
            .with_location("Tuvalu")
            .with_context(context)
            .build();

        let assessment = assessor.assess(&pair).await.unwrap();

        assert_eq!(assessment.breakdown.location_score, 1.0);
        assert!(assessment.damage_score <= 1.0);
    }

    #[tokio::test]
    async fn test_unknown_disaster_type_uses_default_severity() {
        let assessor = assessor(Arc::new(NullDetector), Arc::new(ConstantScorer(1.0)));

        let assessment = assessor.assess(&pair(png(4, 4, 0), png(4, 4, 0), "Landslide")).await.unwrap();

        assert_eq!(assessment.breakdown.disaster_severity, 0.5);
    }
}

// ============================================================================
// Properties
// ============================================================================

mod properties {
    use super::*;
    use proptest::prelude::*;
    use test_utils::{disaster_strategy, location_context_strategy, ratio_strategy};

    proptest! {
        #[test]
        fn any_valid_input_scores_within_unit_interval(
            ratio in ratio_strategy(),
            disaster in disaster_strategy(),
            context in location_context_strategy(),
        ) {
            let aggregator = DamageScoreAggregator::new(ScoringPolicy::default()).unwrap();
            let score = aggregator.aggregate(ratio, &disaster, &context).unwrap();
            assert_unit_interval(score.composite);
            assert_unit_interval(score.breakdown.location_score);
            prop_assert!((score.affected_area_sqm - score.composite * 5000.0).abs() < 1e-9);
        }
    }
}
