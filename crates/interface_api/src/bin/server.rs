//! Damage Engine - API Server Binary
//!
//! # Usage
//!
//! ```bash
//! # In-memory storage, pixel-similarity assessments only
//! cargo run --bin damage-engine-api
//!
//! # PostgreSQL storage and a remote object detector
//! API_DATABASE_URL=postgres://localhost/damage_engine \
//! API_DETECTOR__ENDPOINT=http://detector:8500 \
//!     cargo run --bin damage-engine-api
//! ```
//!
//! # Environment Variables
//!
//! * `API_HOST` - Server host (default: 0.0.0.0)
//! * `API_PORT` - Server port (default: 8080)
//! * `API_DATABASE_URL` - PostgreSQL connection string (default: in-memory storage)
//! * `API_DETECTOR__ENDPOINT` - Object detection service (default: none)
//! * `API_LOG_LEVEL` - Log level: trace, debug, info, warn, error (default: info)
//! * `API_LOG_JSON` - Structured JSON log lines (default: false)
//!
//! Nested settings (scoring, adjudication, numbering) follow the same
//! `API_SECTION__KEY` pattern or come from `damage-engine.toml`.

use anyhow::Context;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use domain_assessment::{NullDetector, ObjectDetector, RemoteDetector, SsimScorer};
use infra_db::{create_pool, run_migrations, DatabaseConfig};
use interface_api::{config::ApiConfig, create_router, AppState, Storage};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = ApiConfig::load().context("failed to load configuration")?;

    init_tracing(&config.log_level, config.log_json);

    tracing::info!(
        host = %config.host,
        port = %config.port,
        "Starting Damage Engine API Server"
    );

    let storage = create_storage(&config).await?;
    let detector = create_detector(&config)?;

    let addr: SocketAddr = config.server_addr().parse()?;
    let state = AppState::new(config, storage, detector, Arc::new(SsimScorer::default()))
        .context("invalid scoring or adjudication policy")?;
    let app = create_router(state);

    tracing::info!(%addr, "Server listening");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// `RUST_LOG` wins over the configured level
fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_current_span(true))
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer().with_target(true)).init();
    }
}

async fn create_storage(config: &ApiConfig) -> anyhow::Result<Storage> {
    let currency = config.adjudication.currency;
    match config.database_url.as_deref() {
        Some(url) => {
            tracing::info!("Connecting to database...");
            let pool = create_pool(DatabaseConfig::new(url)).await?;
            run_migrations(&pool).await?;
            tracing::info!("Database ready");
            Ok(Storage::postgres(pool, currency))
        }
        None => {
            tracing::warn!("No database configured; claims and triggers are kept in memory");
            Ok(Storage::in_memory(currency))
        }
    }
}

fn create_detector(config: &ApiConfig) -> anyhow::Result<Arc<dyn ObjectDetector>> {
    match config.detector.remote() {
        Some(remote) => {
            tracing::info!(endpoint = %remote.endpoint, model = %remote.model_name, "Using remote object detector");
            Ok(Arc::new(RemoteDetector::new(remote)?))
        }
        None => {
            tracing::warn!("No detector endpoint configured; assessments use pixel similarity");
            Ok(Arc::new(NullDetector))
        }
    }
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
