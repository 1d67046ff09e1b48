//! Trust & rate-limit ledger.
//!
//! Owns the only write path to [`TrustRecord`]s and rate-limit windows.
//! Verifiers receive a read-only [`TrustContext`] built here; the decision
//! stage and the reward ledger call the `record_*` operations.

pub mod error;
pub mod ledger;

pub use error::TrustError;
pub use ledger::TrustLedger;
