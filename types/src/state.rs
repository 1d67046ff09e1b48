//! Lifecycle state enums for participations and reward ledger entries.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of a participation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ParticipationStatus {
    /// Waiting on the user (e.g. automated polling gave up and manual proof is needed).
    InProgress,
    /// Slot reserved; verification running.
    PendingVerification,
    /// Waiting for the owning business to decide.
    Flagged,
    /// Approved; reward lock not yet written.
    Approved,
    /// Rejected. Terminal.
    Rejected,
    /// Reward locked in the ledger. Terminal except for revocation.
    Completed,
}

impl ParticipationStatus {
    /// Whether this participation occupies a cap slot (completed or pending).
    pub fn occupies_slot(&self) -> bool {
        matches!(
            self,
            Self::PendingVerification | Self::Flagged | Self::Approved | Self::Completed
        )
    }

    /// Whether the participation has been approved.
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Approved | Self::Completed)
    }

    /// COMPLETED and REJECTED participations are immutable.
    pub fn is_final(&self) -> bool {
        matches!(self, Self::Completed | Self::Rejected)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InProgress => "IN_PROGRESS",
            Self::PendingVerification => "PENDING_VERIFICATION",
            Self::Flagged => "FLAGGED",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
            Self::Completed => "COMPLETED",
        }
    }
}

impl fmt::Display for ParticipationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State of a reward ledger entry. `Revoked` is terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RewardState {
    Locked,
    Released,
    Revoked,
}

impl fmt::Display for RewardState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Locked => f.write_str("LOCKED"),
            Self::Released => f.write_str("RELEASED"),
            Self::Revoked => f.write_str("REVOKED"),
        }
    }
}
