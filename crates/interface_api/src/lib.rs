//! HTTP API Layer
//!
//! REST surface of the damage engine using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: request handlers for damage analysis, claims and triggers
//! - **Middleware**: request ids, tracing and audit logging
//! - **DTOs**: request/response bodies
//! - **Error Handling**: domain errors mapped onto status codes
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::{create_router, AppState, Storage};
//!
//! let state = AppState::new(config, Storage::in_memory(Currency::USD), detector, scorer)?;
//! axum::serve(listener, create_router(state)).await?;
//! ```

pub mod config;
pub mod error;
pub mod middleware;
pub mod handlers;
pub mod dto;

use axum::{
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use core_kernel::Currency;
use domain_assessment::{
    DamageAssessor, DamageScoreAggregator, DetectionAdapter, ObjectDetector, SimilarityFallback,
    SimilarityScorer,
};
use domain_claims::{
    AtomicClaimSequence, ClaimError, ClaimNumberIssuer, ClaimRepository, ClaimsDecisionEngine,
    DamageClaimService, InMemoryClaimRepository,
};
use domain_parametric::{InMemoryTriggerRepository, TriggerRepository, TriggerService};
use infra_db::{DatabasePool, PgClaimRepository, PgClaimSequence, PgTriggerRepository};

use crate::config::ApiConfig;
use crate::handlers::{analysis, claims, health, triggers};
use crate::middleware::audit_middleware;

/// Storage adapters behind the services
#[derive(Clone)]
pub struct Storage {
    pub claims: Arc<dyn ClaimRepository>,
    pub triggers: Arc<dyn TriggerRepository>,
    pub numbers: Arc<dyn ClaimNumberIssuer>,
}

impl Storage {
    /// Process-local storage; contents are lost on restart
    pub fn in_memory(currency: Currency) -> Self {
        Self {
            claims: Arc::new(InMemoryClaimRepository::new(currency)),
            triggers: Arc::new(InMemoryTriggerRepository::new()),
            numbers: Arc::new(AtomicClaimSequence::new()),
        }
    }

    pub fn postgres(pool: DatabasePool, currency: Currency) -> Self {
        Self {
            claims: Arc::new(PgClaimRepository::new(pool.clone(), currency)),
            triggers: Arc::new(PgTriggerRepository::new(pool.clone())),
            numbers: Arc::new(PgClaimSequence::new(pool)),
        }
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub claims: Arc<DamageClaimService>,
    pub triggers: Arc<TriggerService>,
    pub config: Arc<ApiConfig>,
}

impl AppState {
    /// Wires the assessment pipeline and services from configuration
    ///
    /// Fails if the scoring or adjudication policy is invalid.
    pub fn new(
        config: ApiConfig,
        storage: Storage,
        detector: Arc<dyn ObjectDetector>,
        scorer: Arc<dyn SimilarityScorer>,
    ) -> Result<Self, ClaimError> {
        let aggregator = DamageScoreAggregator::new(config.scoring.clone())?;
        let assessor = DamageAssessor::new(
            DetectionAdapter::new(detector, config.detector.timeout()),
            SimilarityFallback::new(
                scorer,
                config.similarity_timeout(),
                config.scoring.similarity_precision,
            ),
            aggregator,
        );
        let engine = ClaimsDecisionEngine::new(config.adjudication.clone())?;

        let claims = DamageClaimService::new(
            Arc::new(assessor),
            engine,
            storage.numbers,
            config.numbering.clone(),
            storage.claims,
        );

        Ok(Self {
            claims: Arc::new(claims),
            triggers: Arc::new(TriggerService::new(storage.triggers)),
            config: Arc::new(config),
        })
    }
}

/// Creates the main API router
pub fn create_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes;

    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    let analysis_routes = Router::new()
        .route("/", post(analysis::analyze_damage))
        .layer(DefaultBodyLimit::max(upload_limit));

    let claims_routes = Router::new()
        .route("/", get(claims::list_claims).post(claims::create_claim))
        .route("/summary", get(claims::claims_summary))
        .route("/approved", get(claims::approved_claims))
        .route("/pending", get(claims::pending_claims))
        .route("/:id", get(claims::get_claim))
        .route("/:id/approve", post(claims::approve_claim))
        .route("/:id/reject", post(claims::reject_claim));

    let trigger_routes = Router::new()
        .route("/", get(triggers::list_triggers).post(triggers::create_trigger))
        .route("/active", get(triggers::active_triggers))
        .route("/:id", get(triggers::get_trigger).put(triggers::update_trigger));

    let api_routes = Router::new()
        .nest("/damage-analysis", analysis_routes)
        .nest("/claims", claims_routes)
        .nest("/triggers", trigger_routes)
        .layer(axum_middleware::from_fn(audit_middleware));

    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                ),
        )
        .with_state(state)
}
