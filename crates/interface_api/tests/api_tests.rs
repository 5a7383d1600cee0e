//! HTTP-level tests for interface_api

use axum::http::StatusCode;
use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use serde_json::{json, Value};
use std::sync::Arc;

use core_kernel::Currency;
use domain_assessment::{FixedSimilarityScorer, NullDetector, ObjectDetector, ScriptedDetector};
use interface_api::{config::ApiConfig, create_router, AppState, Storage};
use test_utils::{ImageFixtures, StringFixtures};

fn server(detector: Arc<dyn ObjectDetector>, similarity: f64) -> TestServer {
    let state = AppState::new(
        ApiConfig::default(),
        Storage::in_memory(Currency::USD),
        detector,
        Arc::new(FixedSimilarityScorer::new(similarity)),
    )
    .unwrap();
    TestServer::new(create_router(state)).unwrap()
}

fn default_server() -> TestServer {
    server(Arc::new(NullDetector), 0.95)
}

fn upload(disaster: &str, pre: Vec<u8>, post: Vec<u8>) -> MultipartForm {
    MultipartForm::new()
        .add_part("pre_image", Part::bytes(pre).file_name("pre.png").mime_type("image/png"))
        .add_part("post_image", Part::bytes(post).file_name("post.png").mime_type("image/png"))
        .add_text("location_name", StringFixtures::location())
        .add_text("disaster_type", disaster)
}

fn direct_claim(score: f64) -> Value {
    json!({
        "location_name": "Miami",
        "disaster_type": "Storm",
        "damage_score": score,
        "claim_amount": "12500.00"
    })
}

fn trigger(code: &str, threshold: f64, current_value: f64) -> Value {
    json!({
        "trigger_code": code,
        "parameter": "rainfall_mm",
        "threshold": threshold,
        "current_value": current_value,
        "triggered": false,
        "location_name": "Houston"
    })
}

// ============================================================================
// Health
// ============================================================================

mod health_tests {
    use super::*;

    #[tokio::test]
    async fn test_health() {
        let response = default_server().get("/health").await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["status"], "healthy");
    }

    #[tokio::test]
    async fn test_readiness_with_in_memory_storage() {
        let response = default_server().get("/health/ready").await;
        response.assert_status_ok();
        let body = response.json::<Value>();
        assert_eq!(body["status"], "ready");
        assert_eq!(body["checks"].as_array().unwrap().len(), 2);
    }
}

// ============================================================================
// Damage analysis
// ============================================================================

mod damage_analysis_tests {
    use super::*;

    #[tokio::test]
    async fn test_vanished_object_is_auto_approved() {
        let server = server(Arc::new(ScriptedDetector::with_labels(&["car"], &[])), 1.0);

        let response = server
            .post("/api/v1/damage-analysis")
            .multipart(upload("Flood", ImageFixtures::pre_disaster(), ImageFixtures::post_disaster()))
            .await;

        response.assert_status(StatusCode::CREATED);
        let body = response.json::<Value>();
        assert_eq!(body["message"], "Damage analysis completed successfully");
        assert_eq!(body["claim"]["claim_number"], "C1001");
        assert_eq!(body["claim"]["policy_number"], "P5001");
        assert_eq!(body["claim"]["status"], "Approved");
        assert_eq!(body["claim"]["auto_approved"], true);
        assert_eq!(body["claim"]["claim_amount"], "371666.67");
        assert_eq!(body["analysis"]["method"], "object_diff");
        assert_eq!(body["analysis"]["damage_percentage"], "74.33");
    }

    #[tokio::test]
    async fn test_similar_scene_goes_to_review() {
        let server = default_server();

        let response = server
            .post("/api/v1/damage-analysis")
            .multipart(upload("Storm", ImageFixtures::pre_disaster(), ImageFixtures::pre_disaster()))
            .await;

        response.assert_status(StatusCode::CREATED);
        let body = response.json::<Value>();
        assert_eq!(body["claim"]["status"], "Under Review");
        assert_eq!(body["claim"]["auto_approved"], false);
        assert_eq!(body["analysis"]["method"], "pixel_similarity");
        assert_eq!(body["analysis"]["breakdown"]["disaster_severity"], 0.6);
    }

    #[tokio::test]
    async fn test_optional_context_fields_are_applied() {
        let server = default_server();
        let form = upload("Wildfire", ImageFixtures::pre_disaster(), ImageFixtures::post_disaster())
            .add_text("vegetation_dryness", "1.0")
            .add_text("sea_level_rise_m", "5")
            .add_text("historical_events", "10");

        let response = server.post("/api/v1/damage-analysis").multipart(form).await;

        response.assert_status(StatusCode::CREATED);
        assert_eq!(response.json::<Value>()["analysis"]["breakdown"]["location_score"], 1.0);
    }

    #[tokio::test]
    async fn test_missing_image_is_unprocessable() {
        let form = MultipartForm::new()
            .add_part("post_image", Part::bytes(ImageFixtures::post_disaster()).file_name("post.png"))
            .add_text("location_name", "Houston")
            .add_text("disaster_type", "Flood");

        let response = default_server().post("/api/v1/damage-analysis").multipart(form).await;

        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(response.json::<Value>()["error"], "validation_error");
    }

    #[tokio::test]
    async fn test_non_numeric_context_is_unprocessable() {
        let form = upload("Flood", ImageFixtures::pre_disaster(), ImageFixtures::post_disaster())
            .add_text("historical_events", "several");

        let response = default_server().post("/api/v1/damage-analysis").multipart(form).await;

        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_undecodable_image_is_bad_request() {
        let server = default_server();

        let response = server
            .post("/api/v1/damage-analysis")
            .multipart(upload("Flood", ImageFixtures::corrupt(), ImageFixtures::post_disaster()))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);

        let claims = server.get("/api/v1/claims").await.json::<Value>();
        assert!(claims.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unavailable_detector_is_retryable() {
        let server = server(Arc::new(ScriptedDetector::unavailable()), 0.5);

        let response = server
            .post("/api/v1/damage-analysis")
            .multipart(upload("Flood", ImageFixtures::pre_disaster(), ImageFixtures::post_disaster()))
            .await;

        response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
        assert!(response.headers().get("retry-after").is_some());
    }
}

// ============================================================================
// Claims
// ============================================================================

mod claims_tests {
    use super::*;

    #[tokio::test]
    async fn test_direct_filing_applies_threshold() {
        let server = default_server();

        let approved = server.post("/api/v1/claims").json(&direct_claim(0.7)).await;
        approved.assert_status(StatusCode::CREATED);
        assert_eq!(approved.json::<Value>()["status"], "Approved");
        assert_eq!(approved.json::<Value>()["auto_approved"], true);

        let mut low = direct_claim(0.4);
        low["status"] = json!("Under Review");
        let kept = server.post("/api/v1/claims").json(&low).await;
        kept.assert_status(StatusCode::CREATED);
        assert_eq!(kept.json::<Value>()["status"], "Under Review");
        assert_eq!(kept.json::<Value>()["auto_approved"], false);
    }

    #[tokio::test]
    async fn test_out_of_range_score_is_rejected() {
        let response = default_server().post("/api/v1/claims").json(&direct_claim(1.5)).await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        assert!(response.json::<Value>()["details"].is_array());
    }

    #[tokio::test]
    async fn test_approve_then_reject_by_claim_number() {
        let server = default_server();
        let filed = server.post("/api/v1/claims").json(&direct_claim(0.2)).await.json::<Value>();
        let number = filed["claim_number"].as_str().unwrap().to_string();
        assert_eq!(filed["status"], "Pending");

        let approved = server.post(&format!("/api/v1/claims/{number}/approve")).await;
        approved.assert_status_ok();
        assert_eq!(approved.json::<Value>()["status"], "Approved");
        assert_eq!(approved.json::<Value>()["auto_approved"], false);

        server
            .post(&format!("/api/v1/claims/{number}/approve"))
            .await
            .assert_status(StatusCode::CONFLICT);

        let rejected = server.post(&format!("/api/v1/claims/{number}/reject")).await;
        rejected.assert_status_ok();
        assert_eq!(rejected.json::<Value>()["status"], "Rejected");
    }

    #[tokio::test]
    async fn test_get_by_id_and_unknown_claim() {
        let server = default_server();
        let filed = server.post("/api/v1/claims").json(&direct_claim(0.9)).await.json::<Value>();
        let id = filed["id"].as_str().unwrap();

        let fetched = server.get(&format!("/api/v1/claims/{id}")).await;
        fetched.assert_status_ok();
        assert_eq!(fetched.json::<Value>()["claim_number"], filed["claim_number"]);

        server.get("/api/v1/claims/C9999").await.assert_status_not_found();
    }

    #[tokio::test]
    async fn test_views_and_summary() {
        let server = default_server();
        for score in [0.9, 0.3, 0.1] {
            server.post("/api/v1/claims").json(&direct_claim(score)).await;
        }

        let approved = server.get("/api/v1/claims/approved").await.json::<Value>();
        assert_eq!(approved.as_array().unwrap().len(), 1);

        let pending = server.get("/api/v1/claims/pending").await.json::<Value>();
        assert_eq!(pending.as_array().unwrap().len(), 2);

        let summary = server.get("/api/v1/claims/summary").await.json::<Value>();
        assert_eq!(summary["total_claims"], 3);
        assert_eq!(summary["approved_claims"], 1);
        assert_eq!(summary["pending_claims"], 2);
        assert_eq!(summary["auto_approved_claims"], 1);
        assert_eq!(summary["total_claim_amount"], "37500.00");
        assert_eq!(summary["currency"], "USD");
    }

    #[tokio::test]
    async fn test_list_filters_by_status() {
        let server = default_server();
        server.post("/api/v1/claims").json(&direct_claim(0.9)).await;
        server.post("/api/v1/claims").json(&direct_claim(0.1)).await;

        let response = server
            .get("/api/v1/claims")
            .add_query_param("status", "Approved")
            .await;
        let claims = response.json::<Value>();
        assert_eq!(claims.as_array().unwrap().len(), 1);

        server
            .get("/api/v1/claims")
            .add_query_param("status", "Closed")
            .await
            .assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    }
}

// ============================================================================
// Parametric triggers
// ============================================================================

mod trigger_tests {
    use super::*;

    #[tokio::test]
    async fn test_triggered_flag_is_derived() {
        let server = default_server();

        let created = server.post("/api/v1/triggers").json(&trigger("TRG-1", 0.5, 0.5)).await;
        created.assert_status(StatusCode::CREATED);
        let body = created.json::<Value>();
        assert_eq!(body["triggered"], true);

        let id = body["id"].as_str().unwrap();
        let updated = server
            .put(&format!("/api/v1/triggers/{id}"))
            .json(&trigger("TRG-1", 0.5, 0.4999))
            .await;
        updated.assert_status_ok();
        assert_eq!(updated.json::<Value>()["triggered"], false);
    }

    #[tokio::test]
    async fn test_active_lists_only_triggered() {
        let server = default_server();
        server.post("/api/v1/triggers").json(&trigger("TRG-HOT", 100.0, 150.0)).await;
        server.post("/api/v1/triggers").json(&trigger("TRG-COLD", 100.0, 10.0)).await;

        let active = server.get("/api/v1/triggers/active").await.json::<Value>();
        let codes: Vec<&str> = active
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["trigger_code"].as_str().unwrap())
            .collect();
        assert_eq!(codes, vec!["TRG-HOT"]);

        let all = server.get("/api/v1/triggers").await.json::<Value>();
        assert_eq!(all.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_code_conflicts() {
        let server = default_server();
        server.post("/api/v1/triggers").json(&trigger("TRG-DUP", 1.0, 0.0)).await;

        server
            .post("/api/v1/triggers")
            .json(&trigger("TRG-DUP", 2.0, 0.0))
            .await
            .assert_status(StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_invalid_and_unknown_ids() {
        let server = default_server();

        server
            .get("/api/v1/triggers/not-a-uuid")
            .await
            .assert_status(StatusCode::BAD_REQUEST);
        server
            .get("/api/v1/triggers/TRG-0190f4b2-7c1d-7000-8000-000000000000")
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn test_blank_code_is_unprocessable() {
        default_server()
            .post("/api/v1/triggers")
            .json(&trigger("  ", 1.0, 0.0))
            .await
            .assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    }
}
