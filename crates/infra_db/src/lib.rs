//! Infrastructure Database Layer
//!
//! PostgreSQL persistence for the damage engine using SQLx.
//!
//! # Architecture
//!
//! - `repositories`: row types and SQL, returning [`DatabaseError`]
//! - `adapters`: domain port implementations built on the repositories,
//!   translating rows to domain types and errors to `PortError`
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool, run_migrations, DatabaseConfig, PgClaimRepository};
//!
//! let pool = create_pool(DatabaseConfig::new("postgres://localhost/damage_engine")).await?;
//! run_migrations(&pool).await?;
//! let claims = PgClaimRepository::new(pool.clone(), Currency::USD);
//! ```

pub mod pool;
pub mod error;
pub mod repositories;
pub mod adapters;

pub use pool::{create_pool, run_migrations, DatabaseConfig, DatabasePool};
pub use error::DatabaseError;
pub use adapters::{PgClaimRepository, PgClaimSequence, PgTriggerRepository};
