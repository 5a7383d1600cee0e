//! Row-level repositories
//!
//! Repositories own the SQL. They read and write plain row structs and
//! report [`DatabaseError`](crate::DatabaseError); mapping rows to domain
//! types happens in [`adapters`](crate::adapters).
//!
//! Queries are built at runtime with `sqlx::query_as` and
//! `sqlx::QueryBuilder`, so the crate builds without a live database.

pub mod claims;
pub mod triggers;

pub use claims::{AnalysisRow, ClaimRow, ClaimsRepository, SummaryRow};
pub use triggers::{TriggerRow, TriggersRepository};

/// Escapes `LIKE` wildcards so user input matches literally
pub(crate) fn like_pattern(fragment: &str) -> String {
    let escaped = fragment
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}
