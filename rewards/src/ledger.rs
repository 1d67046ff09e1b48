use crate::delay::lock_delay_days;
use crate::RewardError;
use fluzio_store::{RateLimitStore, RewardStore, TransitionKind, TrustStore};
use fluzio_trust::TrustLedger;
use fluzio_types::{
    EngineParams, Participation, ParticipationId, RevocationReason, RewardLedgerEntry,
    RewardPoints, RewardState, Timestamp, UserBalance, UserId,
};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};

/// Result of one unlock sweep.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    pub released: Vec<ParticipationId>,
    /// Due entries skipped because a revocation signal is pending.
    pub held: usize,
    /// Entries whose release failed; retried on the next sweep.
    pub errors: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum RevocationOutcome {
    Revoked {
        entry: RewardLedgerEntry,
        was_released: bool,
        revocations: u32,
        suspension_recommended: bool,
    },
    AlreadyRevoked,
    /// No ledger entry for the participation; logged, nothing changed.
    NotFound,
}

/// The reward ledger state machine.
///
/// Transitions are serialized by one writer lock so a release racing a
/// revocation cannot lose either update. A transition's dedupe key is
/// recorded only after its writes succeed; a failed write restores the
/// entry so the transition can be retried.
pub struct RewardLedger<S> {
    store: Arc<S>,
    trust: Arc<TrustLedger<S>>,
    params: EngineParams,
    writer: Mutex<()>,
}

impl<S: RewardStore + TrustStore + RateLimitStore> RewardLedger<S> {
    pub fn new(store: Arc<S>, trust: Arc<TrustLedger<S>>, params: EngineParams) -> Self {
        Self {
            store,
            trust,
            params,
            writer: Mutex::new(()),
        }
    }

    fn write_guard(&self) -> MutexGuard<'_, ()> {
        self.writer.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn entry(
        &self,
        participation: ParticipationId,
    ) -> Result<Option<RewardLedgerEntry>, RewardError> {
        Ok(self.store.get_reward(participation)?)
    }

    pub fn balance(&self, user: &UserId) -> Result<UserBalance, RewardError> {
        Ok(self.store.get_balance(user)?)
    }

    fn adjust_balance(
        &self,
        user: &UserId,
        f: impl FnOnce(&mut UserBalance),
    ) -> Result<UserBalance, RewardError> {
        let mut balance = self.store.get_balance(user)?;
        f(&mut balance);
        self.store.put_balance(user, &balance)?;
        Ok(balance)
    }

    /// Lock the reward for an approved participation.
    ///
    /// Locking the same participation twice returns the existing entry.
    pub fn lock(
        &self,
        participation: &Participation,
        amount: RewardPoints,
        high_value: bool,
        now: Timestamp,
    ) -> Result<RewardLedgerEntry, RewardError> {
        let _writer = self.write_guard();
        if !self
            .store
            .record_transition(participation.id, TransitionKind::Lock)?
        {
            if let Some(existing) = self.store.get_reward(participation.id)? {
                return Ok(existing);
            }
        }
        let days = lock_delay_days(
            &self.params,
            participation.proof_type,
            high_value,
            participation.payload.is_first_purchase(),
        );
        let entry = RewardLedgerEntry {
            participation_id: participation.id,
            user_id: participation.user_id.clone(),
            mission_id: participation.mission_id.clone(),
            amount,
            proof_type: participation.proof_type,
            state: RewardState::Locked,
            locked_at: now,
            unlock_at: now.plus_days(days),
            released_at: None,
            revoked_at: None,
            revoked_reason: None,
            on_hold: false,
        };
        self.store.put_reward(&entry)?;
        self.adjust_balance(&entry.user_id, |b| b.locked = b.locked.saturating_add(amount))?;
        tracing::info!(
            participation = %entry.participation_id,
            user = %entry.user_id,
            amount = %amount,
            delay_days = days,
            unlock_at = %entry.unlock_at,
            "reward locked"
        );
        Ok(entry)
    }

    /// Release one entry if it is locked, due, and not held.
    ///
    /// Returns `false` (a no-op, not an error) in every other case,
    /// including a repeated release.
    pub fn release(&self, participation: ParticipationId, now: Timestamp) -> Result<bool, RewardError> {
        let _writer = self.write_guard();
        let Some(mut entry) = self.store.get_reward(participation)? else {
            return Ok(false);
        };
        if !entry.is_releasable(now)
            || self
                .store
                .transition_recorded(participation, TransitionKind::Release)?
        {
            return Ok(false);
        }
        let locked = entry.clone();
        entry.state = RewardState::Released;
        entry.released_at = Some(now);
        self.store.put_reward(&entry)?;
        let amount = entry.amount;
        let credited = self.adjust_balance(&entry.user_id, |b| {
            b.locked = b.locked.saturating_sub(amount);
            b.credited = b.credited.saturating_add(amount);
        });
        if let Err(e) = credited {
            self.store.put_reward(&locked)?;
            return Err(e);
        }
        self.store
            .record_transition(participation, TransitionKind::Release)?;
        tracing::info!(
            participation = %participation,
            user = %entry.user_id,
            amount = %amount,
            "reward released"
        );
        Ok(true)
    }

    /// Release every due, unheld entry. A failing entry is logged and left
    /// for the next sweep.
    pub fn sweep(&self, now: Timestamp) -> Result<SweepReport, RewardError> {
        let mut report = SweepReport::default();
        for entry in self.store.locked_due(now)? {
            if entry.on_hold {
                report.held += 1;
                continue;
            }
            match self.release(entry.participation_id, now) {
                Ok(true) => report.released.push(entry.participation_id),
                Ok(false) => {}
                Err(e) => {
                    report.errors += 1;
                    tracing::warn!(participation = %entry.participation_id, error = %e, "release failed");
                }
            }
        }
        if !report.released.is_empty() || report.held > 0 {
            tracing::info!(
                released = report.released.len(),
                held = report.held,
                "unlock sweep"
            );
        }
        Ok(report)
    }

    /// Revoke a locked or released reward.
    ///
    /// Revoking after release deducts the credited points; whatever was
    /// already spent is recorded as a deficit. Every revocation flags the
    /// user's trust record.
    pub fn revoke(
        &self,
        participation: ParticipationId,
        reason: RevocationReason,
        now: Timestamp,
    ) -> Result<RevocationOutcome, RewardError> {
        let _writer = self.write_guard();
        let Some(mut entry) = self.store.get_reward(participation)? else {
            tracing::warn!(participation = %participation, reason = %reason, "revocation for unknown ledger entry ignored");
            return Ok(RevocationOutcome::NotFound);
        };
        if entry.state == RewardState::Revoked
            || self
                .store
                .transition_recorded(participation, TransitionKind::Revoke)?
        {
            tracing::debug!(participation = %participation, "revocation already applied");
            return Ok(RevocationOutcome::AlreadyRevoked);
        }

        let before = entry.clone();
        let was_released = entry.state == RewardState::Released;
        let amount = entry.amount;
        entry.state = RewardState::Revoked;
        entry.revoked_at = Some(now);
        entry.revoked_reason = Some(reason);
        entry.on_hold = false;
        self.store.put_reward(&entry)?;
        let deducted = self.adjust_balance(&entry.user_id, |b| {
            if was_released {
                let shortfall = amount.saturating_sub(b.credited);
                b.credited = b.credited.saturating_sub(amount);
                b.deficit = b.deficit.saturating_add(shortfall);
            } else {
                b.locked = b.locked.saturating_sub(amount);
            }
        });
        if let Err(e) = deducted {
            self.store.put_reward(&before)?;
            return Err(e);
        }
        self.store
            .record_transition(participation, TransitionKind::Revoke)?;

        let revocations = self.trust.record_revocation(&entry.user_id, now)?;
        let suspension_recommended = revocations >= self.params.suspension_revocation_threshold;
        tracing::info!(
            participation = %participation,
            user = %entry.user_id,
            reason = %reason,
            was_released,
            revocations,
            suspension_recommended,
            "reward revoked"
        );
        Ok(RevocationOutcome::Revoked {
            entry,
            was_released,
            revocations,
            suspension_recommended,
        })
    }

    fn set_hold(&self, participation: ParticipationId, hold: bool) -> Result<bool, RewardError> {
        let _writer = self.write_guard();
        let Some(mut entry) = self.store.get_reward(participation)? else {
            tracing::warn!(participation = %participation, hold, "hold change for unknown ledger entry ignored");
            return Ok(false);
        };
        if entry.state != RewardState::Locked || entry.on_hold == hold {
            return Ok(false);
        }
        entry.on_hold = hold;
        self.store.put_reward(&entry)?;
        tracing::info!(participation = %participation, hold, "reward hold changed");
        Ok(true)
    }

    /// Block release while a revocation signal (e.g. a dispute) is pending.
    pub fn hold(&self, participation: ParticipationId) -> Result<bool, RewardError> {
        self.set_hold(participation, true)
    }

    pub fn clear_hold(&self, participation: ParticipationId) -> Result<bool, RewardError> {
        self.set_hold(participation, false)
    }

    /// Number of entries still locked, for the metrics gauge.
    pub fn locked_count(&self) -> Result<usize, RewardError> {
        Ok(self.store.locked_due(Timestamp::MAX)?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fluzio_store::StoreError;
    use fluzio_store_memory::MemoryStore;
    use fluzio_types::proof::{OrderStatus, PaymentProof};
    use fluzio_types::{
        DeviceId, IpAddress, MissionId, ParticipationStatus, ProofPayload, ProofType,
        RateLimitKey, TrustRecord, SECS_PER_DAY,
    };

    const T0: u64 = 1_000 * SECS_PER_DAY;

    struct Harness {
        store: Arc<MemoryStore>,
        ledger: RewardLedger<MemoryStore>,
    }

    fn harness() -> Harness {
        let store = Arc::new(MemoryStore::new());
        let params = EngineParams::default();
        let trust = Arc::new(TrustLedger::new(store.clone(), params.clone()));
        Harness {
            ledger: RewardLedger::new(store.clone(), trust, params),
            store,
        }
    }

    fn payment_participation(id: u64) -> Participation {
        Participation {
            id: ParticipationId::new(id),
            mission_id: MissionId::new("m1"),
            user_id: UserId::new("u1"),
            device_id: DeviceId::new("d1"),
            ip: IpAddress::new("ip"),
            proof_type: ProofType::PaymentWebhook,
            status: ParticipationStatus::Approved,
            created_at: Timestamp::new(T0),
            completed_at: None,
            payload: ProofPayload::PaymentWebhook(PaymentProof {
                provider: "stripe".into(),
                order_id: format!("o{id}"),
                status: OrderStatus::Paid,
                amount_cents: 1_000,
                customer_id: UserId::new("u1"),
                timestamp: Timestamp::new(T0),
                signature: String::new(),
                first_purchase: false,
            }),
            ai_confidence: None,
            verdicts: Vec::new(),
            decision: None,
            reason: None,
            external_ref: None,
            fingerprint: None,
            revoked_at: None,
        }
    }

    fn day(n: u64) -> Timestamp {
        Timestamp::new(T0 + n * SECS_PER_DAY)
    }

    #[test]
    fn payment_locks_for_seven_days_then_releases() {
        let h = harness();
        let p = payment_participation(1);
        let entry = h.ledger.lock(&p, RewardPoints::new(100), false, day(0)).unwrap();
        assert_eq!(entry.unlock_at, day(7));

        assert!(h.ledger.sweep(day(6)).unwrap().released.is_empty());
        let report = h.ledger.sweep(day(7)).unwrap();
        assert_eq!(report.released, vec![p.id]);

        let b = h.ledger.balance(&p.user_id).unwrap();
        assert_eq!(b.credited, RewardPoints::new(100));
        assert!(b.locked.is_zero());
    }

    #[test]
    fn release_is_idempotent() {
        let h = harness();
        let p = payment_participation(1);
        h.ledger.lock(&p, RewardPoints::new(100), false, day(0)).unwrap();
        assert!(h.ledger.release(p.id, day(8)).unwrap());
        assert!(!h.ledger.release(p.id, day(8)).unwrap());
        assert!(h.ledger.sweep(day(9)).unwrap().released.is_empty());
        assert_eq!(h.ledger.balance(&p.user_id).unwrap().credited, RewardPoints::new(100));
    }

    #[test]
    fn double_lock_returns_existing_entry() {
        let h = harness();
        let p = payment_participation(1);
        let first = h.ledger.lock(&p, RewardPoints::new(100), false, day(0)).unwrap();
        let second = h.ledger.lock(&p, RewardPoints::new(100), false, day(1)).unwrap();
        assert_eq!(first, second);
        assert_eq!(h.ledger.balance(&p.user_id).unwrap().locked, RewardPoints::new(100));
    }

    #[test]
    fn refund_on_day_five_prevents_release() {
        let h = harness();
        let p = payment_participation(1);
        h.ledger.lock(&p, RewardPoints::new(100), false, day(0)).unwrap();

        let outcome = h.ledger.revoke(p.id, RevocationReason::Refund, day(5)).unwrap();
        assert!(matches!(
            outcome,
            RevocationOutcome::Revoked { was_released: false, revocations: 1, .. }
        ));
        assert!(h.ledger.sweep(day(7)).unwrap().released.is_empty());

        let b = h.ledger.balance(&p.user_id).unwrap();
        assert!(b.credited.is_zero() && b.locked.is_zero());
        let trust = h.store.get_trust(&p.user_id).unwrap().unwrap();
        assert_eq!(trust.fraud_flag_count, 1);
    }

    #[test]
    fn revoke_after_release_deducts_once() {
        let h = harness();
        let p = payment_participation(1);
        h.ledger.lock(&p, RewardPoints::new(100), false, day(0)).unwrap();
        h.ledger.sweep(day(7)).unwrap();

        let outcome = h.ledger.revoke(p.id, RevocationReason::Chargeback, day(9)).unwrap();
        assert!(matches!(outcome, RevocationOutcome::Revoked { was_released: true, .. }));
        assert_eq!(
            h.ledger.revoke(p.id, RevocationReason::Chargeback, day(9)).unwrap(),
            RevocationOutcome::AlreadyRevoked
        );
        let b = h.ledger.balance(&p.user_id).unwrap();
        assert!(b.credited.is_zero());
        assert!(b.deficit.is_zero());
        assert_eq!(h.store.get_trust(&p.user_id).unwrap().unwrap().fraud_flag_count, 1);
    }

    #[test]
    fn spent_points_become_deficit() {
        let h = harness();
        let p = payment_participation(1);
        h.ledger.lock(&p, RewardPoints::new(100), false, day(0)).unwrap();
        h.ledger.sweep(day(7)).unwrap();
        h.store
            .put_balance(
                &p.user_id,
                &UserBalance {
                    credited: RewardPoints::new(30),
                    ..Default::default()
                },
            )
            .unwrap();
        h.ledger.revoke(p.id, RevocationReason::FraudDetected, day(8)).unwrap();
        let b = h.ledger.balance(&p.user_id).unwrap();
        assert!(b.credited.is_zero());
        assert_eq!(b.deficit, RewardPoints::new(70));
    }

    #[test]
    fn unknown_entry_revocation_is_a_noop() {
        let h = harness();
        assert_eq!(
            h.ledger
                .revoke(ParticipationId::new(99), RevocationReason::Refund, day(0))
                .unwrap(),
            RevocationOutcome::NotFound
        );
    }

    #[test]
    fn third_revocation_recommends_suspension() {
        let h = harness();
        for id in 1..=3 {
            let p = payment_participation(id);
            h.ledger.lock(&p, RewardPoints::new(10), false, day(0)).unwrap();
            let outcome = h.ledger.revoke(p.id, RevocationReason::Refund, day(1)).unwrap();
            let RevocationOutcome::Revoked { suspension_recommended, revocations, .. } = outcome else {
                panic!("expected revocation");
            };
            assert_eq!(revocations, id as u32);
            assert_eq!(suspension_recommended, id == 3);
        }
    }

    #[test]
    fn held_entry_skipped_until_cleared() {
        let h = harness();
        let p = payment_participation(1);
        h.ledger.lock(&p, RewardPoints::new(100), false, day(0)).unwrap();
        assert!(h.ledger.hold(p.id).unwrap());
        assert!(!h.ledger.hold(p.id).unwrap());

        let report = h.ledger.sweep(day(8)).unwrap();
        assert!(report.released.is_empty());
        assert_eq!(report.held, 1);

        assert!(h.ledger.clear_hold(p.id).unwrap());
        assert_eq!(h.ledger.sweep(day(8)).unwrap().released, vec![p.id]);
    }

    /// Memory store whose balance writes can be switched off.
    #[derive(Default)]
    struct FlakyBalances {
        inner: MemoryStore,
        down: std::sync::atomic::AtomicBool,
    }

    impl FlakyBalances {
        fn set_down(&self, down: bool) {
            self.down.store(down, std::sync::atomic::Ordering::SeqCst);
        }
    }

    impl RewardStore for FlakyBalances {
        fn put_reward(&self, entry: &RewardLedgerEntry) -> Result<(), StoreError> {
            self.inner.put_reward(entry)
        }
        fn get_reward(&self, participation: ParticipationId) -> Result<Option<RewardLedgerEntry>, StoreError> {
            self.inner.get_reward(participation)
        }
        fn locked_due(&self, now: Timestamp) -> Result<Vec<RewardLedgerEntry>, StoreError> {
            self.inner.locked_due(now)
        }
        fn user_rewards(&self, user: &UserId) -> Result<Vec<RewardLedgerEntry>, StoreError> {
            self.inner.user_rewards(user)
        }
        fn get_balance(&self, user: &UserId) -> Result<UserBalance, StoreError> {
            self.inner.get_balance(user)
        }
        fn put_balance(&self, user: &UserId, balance: &UserBalance) -> Result<(), StoreError> {
            if self.down.load(std::sync::atomic::Ordering::SeqCst) {
                return Err(StoreError::Backend("balances offline".into()));
            }
            self.inner.put_balance(user, balance)
        }
        fn record_transition(&self, participation: ParticipationId, kind: TransitionKind) -> Result<bool, StoreError> {
            self.inner.record_transition(participation, kind)
        }
        fn transition_recorded(&self, participation: ParticipationId, kind: TransitionKind) -> Result<bool, StoreError> {
            self.inner.transition_recorded(participation, kind)
        }
    }

    impl TrustStore for FlakyBalances {
        fn get_trust(&self, user: &UserId) -> Result<Option<TrustRecord>, StoreError> {
            self.inner.get_trust(user)
        }
        fn put_trust(&self, record: &TrustRecord) -> Result<(), StoreError> {
            self.inner.put_trust(record)
        }
        fn update_trust(
            &self,
            user: &UserId,
            now: Timestamp,
            f: &mut dyn FnMut(&mut TrustRecord),
        ) -> Result<TrustRecord, StoreError> {
            self.inner.update_trust(user, now, f)
        }
    }

    impl RateLimitStore for FlakyBalances {
        fn increment_window(&self, key: &RateLimitKey, mission: &MissionId, day: u64) -> Result<u32, StoreError> {
            self.inner.increment_window(key, mission, day)
        }
        fn window_count(&self, key: &RateLimitKey, mission: &MissionId, day: u64) -> Result<u32, StoreError> {
            self.inner.window_count(key, mission, day)
        }
    }

    fn flaky_ledger() -> (Arc<FlakyBalances>, RewardLedger<FlakyBalances>) {
        let store = Arc::new(FlakyBalances::default());
        let params = EngineParams::default();
        let trust = Arc::new(TrustLedger::new(store.clone(), params.clone()));
        (store.clone(), RewardLedger::new(store, trust, params))
    }

    #[test]
    fn failed_release_is_retried_by_next_sweep() {
        let (store, ledger) = flaky_ledger();
        let p = payment_participation(1);
        ledger.lock(&p, RewardPoints::new(100), false, day(0)).unwrap();

        store.set_down(true);
        let report = ledger.sweep(day(7)).unwrap();
        assert_eq!(report.errors, 1);
        assert!(report.released.is_empty());
        assert_eq!(store.get_reward(p.id).unwrap().unwrap().state, RewardState::Locked);

        store.set_down(false);
        assert_eq!(ledger.sweep(day(8)).unwrap().released, vec![p.id]);
        let b = ledger.balance(&p.user_id).unwrap();
        assert_eq!(b.credited, RewardPoints::new(100));
        assert!(b.locked.is_zero());
    }

    #[test]
    fn failed_revocation_can_be_retried() {
        let (store, ledger) = flaky_ledger();
        let p = payment_participation(1);
        ledger.lock(&p, RewardPoints::new(100), false, day(0)).unwrap();

        store.set_down(true);
        assert!(ledger.revoke(p.id, RevocationReason::Chargeback, day(2)).is_err());
        assert_eq!(store.get_reward(p.id).unwrap().unwrap().state, RewardState::Locked);

        store.set_down(false);
        assert!(matches!(
            ledger.revoke(p.id, RevocationReason::Chargeback, day(2)).unwrap(),
            RevocationOutcome::Revoked { was_released: false, revocations: 1, .. }
        ));
        assert!(ledger.balance(&p.user_id).unwrap().locked.is_zero());
    }
}
