//! Service tests for domain_parametric

use chrono::NaiveDate;
use std::sync::Arc;

use core_kernel::TriggerId;
use domain_parametric::{
    evaluate_trigger, InMemoryTriggerRepository, TriggerError, TriggerInput, TriggerQuery, TriggerService,
};
use test_utils::TriggerInputBuilder;

fn service() -> TriggerService {
    TriggerService::new(Arc::new(InMemoryTriggerRepository::new()))
}

fn input(code: &str, location: &str, threshold: f64, current_value: f64) -> TriggerInput {
    TriggerInputBuilder::new()
        .with_code(code)
        .with_location(location)
        .with_values(threshold, current_value)
        .checked_on(NaiveDate::from_ymd_opt(2024, 9, 1).unwrap())
        .build()
}

// ============================================================================
// Writes
// ============================================================================

mod write_tests {
    use super::*;

    #[tokio::test]
    async fn test_create_and_update_recompute_state() {
        let service = service();
        let created = service.create(input("TRG-1", "Dhaka", 0.5, 0.4999)).await.unwrap();
        assert!(!created.triggered());

        let write = TriggerInputBuilder::new()
            .with_code("TRG-1")
            .with_location("Dhaka")
            .with_values(0.5, 0.5)
            .claiming_triggered(false)
            .build();
        let updated = service.update(created.id(), write).await.unwrap();
        assert!(updated.triggered());
        assert_eq!(updated.id(), created.id());

        let stored = service.get(created.id()).await.unwrap();
        assert_eq!(stored, updated);
    }

    #[tokio::test]
    async fn test_replayed_write_is_idempotent() {
        let service = service();
        let created = service.create(input("TRG-2", "Dhaka", 10.0, 12.0)).await.unwrap();

        let first = service.update(created.id(), input("TRG-2", "Dhaka", 10.0, 12.0)).await.unwrap();
        let second = service.update(created.id(), input("TRG-2", "Dhaka", 10.0, 12.0)).await.unwrap();
        assert_eq!(first.triggered(), second.triggered());
        assert!(second.triggered());
    }

    #[tokio::test]
    async fn test_duplicate_code_rejected() {
        let service = service();
        service.create(input("TRG-3", "Dhaka", 1.0, 0.0)).await.unwrap();

        let err = service.create(input("TRG-3", "Manila", 1.0, 0.0)).await.unwrap_err();
        assert!(matches!(err, TriggerError::DuplicateCode(code) if code == "TRG-3"));
    }

    #[tokio::test]
    async fn test_update_unknown_trigger() {
        let err = service()
            .update(TriggerId::new(), input("TRG-4", "Dhaka", 1.0, 0.0))
            .await
            .unwrap_err();
        assert!(matches!(err, TriggerError::TriggerNotFound(_)));
    }
}

// ============================================================================
// Queries
// ============================================================================

mod query_tests {
    use super::*;

    #[tokio::test]
    async fn test_active_and_location_filters() {
        let service = service();
        service.create(input("A", "Port-au-Prince", 5.0, 8.0)).await.unwrap();
        service.create(input("B", "Port Louis", 5.0, 1.0)).await.unwrap();
        service.create(input("C", "Kingston", 5.0, 5.0)).await.unwrap();

        let active = service.active().await.unwrap();
        let mut codes: Vec<_> = active.iter().map(|t| t.trigger_code().to_string()).collect();
        codes.sort();
        assert_eq!(codes, vec!["A", "C"]);

        let port = TriggerQuery {
            location: Some("port".to_string()),
            ..TriggerQuery::default()
        };
        assert_eq!(service.find(&port).await.unwrap().len(), 2);
    }
}

// ============================================================================
// Properties
// ============================================================================

mod properties {
    use super::*;
    use proptest::prelude::*;
    use test_utils::{fake_location, reading_strategy};

    proptest! {
        #[test]
        fn triggered_iff_reading_reaches_threshold(
            threshold in reading_strategy(),
            reading in reading_strategy(),
            claimed in any::<bool>(),
        ) {
            let write = TriggerInputBuilder::new()
                .with_location(fake_location())
                .with_parameter("wind_speed_kmh")
                .with_values(threshold, reading)
                .claiming_triggered(claimed)
                .build();
            let trigger = evaluate_trigger(write).unwrap();
            prop_assert_eq!(trigger.triggered(), reading >= threshold);
            prop_assert_eq!(trigger.parameter(), "wind_speed_kmh");
        }
    }
}
