//! Reward ledger: LOCKED → {RELEASED, REVOKED}.
//!
//! Every transition is deduplicated on `(participation, transition)` in the
//! store, so replaying a sweep tick or a webhook never credits or revokes
//! twice. REVOKED is terminal and reachable from both other states.

pub mod delay;
pub mod error;
pub mod ledger;

pub use delay::lock_delay_days;
pub use error::RewardError;
pub use ledger::{RevocationOutcome, RewardLedger, SweepReport};
