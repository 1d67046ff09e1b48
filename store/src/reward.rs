//! Reward ledger storage trait.

use crate::StoreError;
use fluzio_types::{ParticipationId, RewardLedgerEntry, Timestamp, UserBalance, UserId};
use serde::{Deserialize, Serialize};

/// A ledger transition, recorded once per participation for idempotency.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionKind {
    Lock,
    Release,
    Revoke,
    /// A booking no-show counted against the user's trust record.
    NoShow,
}

pub trait RewardStore {
    fn put_reward(&self, entry: &RewardLedgerEntry) -> Result<(), StoreError>;

    fn get_reward(&self, participation: ParticipationId) -> Result<Option<RewardLedgerEntry>, StoreError>;

    /// Locked entries with `unlock_at <= now`, held or not.
    fn locked_due(&self, now: Timestamp) -> Result<Vec<RewardLedgerEntry>, StoreError>;

    fn user_rewards(&self, user: &UserId) -> Result<Vec<RewardLedgerEntry>, StoreError>;

    /// Zero balance for users never credited.
    fn get_balance(&self, user: &UserId) -> Result<UserBalance, StoreError>;

    fn put_balance(&self, user: &UserId, balance: &UserBalance) -> Result<(), StoreError>;

    /// Mark `(participation, kind)` as processed.
    ///
    /// Returns `false` if it was already recorded, in which case the caller
    /// must not apply the transition again.
    fn record_transition(
        &self,
        participation: ParticipationId,
        kind: TransitionKind,
    ) -> Result<bool, StoreError>;

    /// Whether `(participation, kind)` has been recorded, without recording it.
    fn transition_recorded(
        &self,
        participation: ParticipationId,
        kind: TransitionKind,
    ) -> Result<bool, StoreError>;
}
