//! Core Kernel - Foundational types shared by the damage engine crates
//!
//! - Money types with precise decimal arithmetic
//! - Strongly-typed entity identifiers
//! - Port error and health-check abstractions used by every adapter

pub mod money;
pub mod identifiers;
pub mod ports;

pub use money::{Money, Currency, MoneyError};
pub use identifiers::{ClaimId, AssessmentId, RiskZoneId, TriggerId};
pub use ports::{
    PortError, DomainPort, AdapterHealth, HealthCheckResult, HealthCheckable,
};
