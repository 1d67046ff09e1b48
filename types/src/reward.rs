//! Reward ledger records.

use crate::amount::RewardPoints;
use crate::ids::{MissionId, ParticipationId, UserId};
use crate::proof::ProofType;
use crate::reason::ReasonCode;
use crate::state::RewardState;
use crate::time::Timestamp;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a reward was revoked.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RevocationReason {
    Refund,
    Chargeback,
    ContentDeleted,
    FraudDetected,
}

impl RevocationReason {
    pub fn reason_code(&self) -> ReasonCode {
        match self {
            Self::Refund => ReasonCode::Refund,
            Self::Chargeback => ReasonCode::Chargeback,
            Self::ContentDeleted => ReasonCode::ContentDeleted,
            Self::FraudDetected => ReasonCode::FraudDetected,
        }
    }
}

impl fmt::Display for RevocationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.reason_code().as_str())
    }
}

/// A reward moving through LOCKED → {RELEASED, REVOKED}.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardLedgerEntry {
    pub participation_id: ParticipationId,
    pub user_id: UserId,
    pub mission_id: MissionId,
    pub amount: RewardPoints,
    pub proof_type: ProofType,
    pub state: RewardState,
    pub locked_at: Timestamp,
    pub unlock_at: Timestamp,
    #[serde(default)]
    pub released_at: Option<Timestamp>,
    #[serde(default)]
    pub revoked_at: Option<Timestamp>,
    #[serde(default)]
    pub revoked_reason: Option<RevocationReason>,
    /// A revocation signal is pending (e.g. an open dispute); blocks release.
    #[serde(default)]
    pub on_hold: bool,
}

impl RewardLedgerEntry {
    /// Due for release: locked, unlock time passed, nothing pending.
    pub fn is_releasable(&self, now: Timestamp) -> bool {
        self.state == RewardState::Locked && !self.on_hold && now >= self.unlock_at
    }
}

/// Spendable and locked points for one user.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserBalance {
    pub credited: RewardPoints,
    pub locked: RewardPoints,
    /// Revoked points that could not be deducted because they were already spent.
    #[serde(default)]
    pub deficit: RewardPoints,
}
