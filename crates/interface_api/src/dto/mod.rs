//! Request and response bodies

pub mod analysis;
pub mod claims;
pub mod triggers;
