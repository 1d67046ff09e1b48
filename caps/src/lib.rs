//! Participation cap enforcer.
//!
//! Pure functions over a mission and a tally of its participations. The
//! advisory check runs before verification and never reserves anything; the
//! commit check runs under the mission lock immediately before the
//! participation is written, and is the authoritative one.

pub mod enforcer;
pub mod tally;

pub use enforcer::{check_advisory, check_commit, entitlement, CapCheck, Entitlement};
pub use tally::ParticipationCounts;
