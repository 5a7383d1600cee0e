//! Parametric Trigger Domain
//!
//! A parametric trigger compares an observed value against a threshold.
//! Its `triggered` flag is derived: every write recomputes
//! `current_value >= threshold` and ignores any value the caller supplied.

pub mod trigger;
pub mod ports;
pub mod memory;
pub mod service;
pub mod error;

pub use trigger::{evaluate_trigger, ParametricTrigger, TriggerInput, TriggerRecord};
pub use ports::{TriggerQuery, TriggerRepository};
pub use memory::InMemoryTriggerRepository;
pub use service::TriggerService;
pub use error::TriggerError;
