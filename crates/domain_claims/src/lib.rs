//! Claims Decision Domain
//!
//! Maps a damage assessment to a claim: status and auto-approval, claim
//! amount, and claim/policy numbers. Also carries the claim lifecycle that
//! follows (manual approve/reject) and the claim repository port.
//!
//! # Claim Lifecycle
//!
//! ```text
//!                  score >= threshold
//! assessDamage ──┬────────────────────► Approved (auto_approved)
//!                └────────────────────► Under Review ──► Approved / Rejected
//!
//! file_claim ────┬── score >= threshold ──► Approved (auto_approved)
//!                └── otherwise ──────────► caller status (default Pending)
//! ```

pub mod claim;
pub mod adjudication;
pub mod numbering;
pub mod ports;
pub mod memory;
pub mod summary;
pub mod service;
pub mod error;

pub use claim::{Claim, ClaimStatus};
pub use adjudication::{AdjudicationPolicy, ClaimsDecisionEngine, Decision, DirectClaimRequest};
pub use numbering::{AtomicClaimSequence, ClaimNumberFormat, ClaimNumberIssuer, ClaimNumbers};
pub use ports::{ClaimQuery, ClaimRepository};
pub use memory::InMemoryClaimRepository;
pub use summary::ClaimsSummary;
pub use service::DamageClaimService;
pub use error::ClaimError;
