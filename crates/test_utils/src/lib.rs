//! Test Utilities Crate
//!
//! Shared test infrastructure for the damage engine test suite.
//!
//! # Modules
//!
//! - `fixtures`: synthetic images, detection sets and canned inputs
//! - `builders`: builders for image pairs, direct claims and trigger writes
//! - `assertions`: assertion helpers for scores and money
//! - `generators`: proptest strategies and fake location names

pub mod fixtures;
pub mod builders;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use assertions::*;
pub use generators::*;
