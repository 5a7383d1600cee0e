//! PostgreSQL implementations of the domain ports
//!
//! Each adapter wraps a row-level repository and converts between rows and
//! domain types. Database failures surface as `PortError` so services stay
//! storage-agnostic.

pub mod claims;
pub mod triggers;
pub mod sequence;

pub use claims::PgClaimRepository;
pub use triggers::PgTriggerRepository;
pub use sequence::PgClaimSequence;

use std::time::Instant;

use sqlx::PgPool;

use core_kernel::{AdapterHealth, HealthCheckResult};

/// Round-trips `SELECT 1` and reports the latency
pub(crate) async fn probe(pool: &PgPool, adapter_id: &str) -> HealthCheckResult {
    let started = Instant::now();
    let result = sqlx::query_scalar::<_, i32>("SELECT 1").fetch_one(pool).await;

    let (status, message) = match result {
        Ok(_) => (AdapterHealth::Healthy, None),
        Err(e) => (AdapterHealth::Unhealthy, Some(e.to_string())),
    };

    HealthCheckResult::measured(adapter_id, started, status, message)
}
