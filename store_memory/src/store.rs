//! The mutex-guarded table set.

use fluzio_store::{
    MissionStore, ParticipationStore, RateLimitStore, RewardStore, StoreError, TransitionKind,
    TrustStore,
};
use fluzio_types::{
    Mission, MissionId, Participation, ParticipationId, RateLimitKey, RewardLedgerEntry,
    RewardState, Timestamp, TrustRecord, UserBalance, UserId,
};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

pub(crate) type WindowKey = (String, MissionId, u64);

/// Thread-safe in-memory store. Safe to share behind an `Arc` across tokio tasks.
pub struct MemoryStore {
    pub(crate) missions: Mutex<BTreeMap<MissionId, Mission>>,
    pub(crate) participations: Mutex<BTreeMap<ParticipationId, Participation>>,
    pub(crate) next_id: AtomicU64,
    pub(crate) rewards: Mutex<BTreeMap<ParticipationId, RewardLedgerEntry>>,
    pub(crate) balances: Mutex<HashMap<UserId, UserBalance>>,
    pub(crate) transitions: Mutex<HashSet<(ParticipationId, TransitionKind)>>,
    pub(crate) trust: Mutex<HashMap<UserId, TrustRecord>>,
    pub(crate) windows: Mutex<HashMap<WindowKey, u32>>,
}

pub(crate) fn guard<T>(m: &Mutex<T>) -> Result<MutexGuard<'_, T>, StoreError> {
    m.lock()
        .map_err(|_| StoreError::Backend("table lock poisoned".into()))
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            missions: Mutex::new(BTreeMap::new()),
            participations: Mutex::new(BTreeMap::new()),
            next_id: AtomicU64::new(1),
            rewards: Mutex::new(BTreeMap::new()),
            balances: Mutex::new(HashMap::new()),
            transitions: Mutex::new(HashSet::new()),
            trust: Mutex::new(HashMap::new()),
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Number of live rate-limit windows (after pruning).
    pub fn window_len(&self) -> Result<usize, StoreError> {
        Ok(guard(&self.windows)?.len())
    }

    /// All reward entries, in participation order.
    pub fn all_rewards(&self) -> Result<Vec<RewardLedgerEntry>, StoreError> {
        Ok(guard(&self.rewards)?.values().cloned().collect())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MissionStore for MemoryStore {
    fn get_mission(&self, id: &MissionId) -> Result<Mission, StoreError> {
        guard(&self.missions)?
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("mission {id}")))
    }

    fn put_mission(&self, mission: &Mission) -> Result<(), StoreError> {
        guard(&self.missions)?.insert(mission.id.clone(), mission.clone());
        Ok(())
    }

    fn list_missions(&self) -> Result<Vec<Mission>, StoreError> {
        Ok(guard(&self.missions)?.values().cloned().collect())
    }
}

impl ParticipationStore for MemoryStore {
    fn next_participation_id(&self) -> Result<ParticipationId, StoreError> {
        Ok(ParticipationId::new(self.next_id.fetch_add(1, Ordering::SeqCst)))
    }

    fn put_participation(&self, participation: &Participation) -> Result<(), StoreError> {
        guard(&self.participations)?.insert(participation.id, participation.clone());
        Ok(())
    }

    fn get_participation(&self, id: ParticipationId) -> Result<Participation, StoreError> {
        guard(&self.participations)?
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("participation {id}")))
    }

    fn mission_participations(&self, mission: &MissionId) -> Result<Vec<Participation>, StoreError> {
        Ok(guard(&self.participations)?
            .values()
            .filter(|p| &p.mission_id == mission)
            .cloned()
            .collect())
    }

    fn user_mission_participations(
        &self,
        user: &UserId,
        mission: &MissionId,
    ) -> Result<Vec<Participation>, StoreError> {
        Ok(guard(&self.participations)?
            .values()
            .filter(|p| &p.user_id == user && &p.mission_id == mission)
            .cloned()
            .collect())
    }

    fn user_participation_count(&self, user: &UserId) -> Result<u64, StoreError> {
        Ok(guard(&self.participations)?
            .values()
            .filter(|p| &p.user_id == user)
            .count() as u64)
    }

    fn find_by_external_ref(&self, external_ref: &str) -> Result<Option<Participation>, StoreError> {
        Ok(guard(&self.participations)?
            .values()
            .find(|p| p.external_ref.as_deref() == Some(external_ref))
            .cloned())
    }
}

impl RewardStore for MemoryStore {
    fn put_reward(&self, entry: &RewardLedgerEntry) -> Result<(), StoreError> {
        guard(&self.rewards)?.insert(entry.participation_id, entry.clone());
        Ok(())
    }

    fn get_reward(&self, participation: ParticipationId) -> Result<Option<RewardLedgerEntry>, StoreError> {
        Ok(guard(&self.rewards)?.get(&participation).cloned())
    }

    fn locked_due(&self, now: Timestamp) -> Result<Vec<RewardLedgerEntry>, StoreError> {
        Ok(guard(&self.rewards)?
            .values()
            .filter(|e| e.state == RewardState::Locked && e.unlock_at <= now)
            .cloned()
            .collect())
    }

    fn user_rewards(&self, user: &UserId) -> Result<Vec<RewardLedgerEntry>, StoreError> {
        Ok(guard(&self.rewards)?
            .values()
            .filter(|e| &e.user_id == user)
            .cloned()
            .collect())
    }

    fn get_balance(&self, user: &UserId) -> Result<UserBalance, StoreError> {
        Ok(guard(&self.balances)?.get(user).cloned().unwrap_or_default())
    }

    fn put_balance(&self, user: &UserId, balance: &UserBalance) -> Result<(), StoreError> {
        guard(&self.balances)?.insert(user.clone(), balance.clone());
        Ok(())
    }

    fn record_transition(
        &self,
        participation: ParticipationId,
        kind: TransitionKind,
    ) -> Result<bool, StoreError> {
        Ok(guard(&self.transitions)?.insert((participation, kind)))
    }

    fn transition_recorded(
        &self,
        participation: ParticipationId,
        kind: TransitionKind,
    ) -> Result<bool, StoreError> {
        Ok(guard(&self.transitions)?.contains(&(participation, kind)))
    }
}

impl TrustStore for MemoryStore {
    fn get_trust(&self, user: &UserId) -> Result<Option<TrustRecord>, StoreError> {
        Ok(guard(&self.trust)?.get(user).cloned())
    }

    fn put_trust(&self, record: &TrustRecord) -> Result<(), StoreError> {
        guard(&self.trust)?.insert(record.user_id.clone(), record.clone());
        Ok(())
    }

    fn update_trust(
        &self,
        user: &UserId,
        now: Timestamp,
        f: &mut dyn FnMut(&mut TrustRecord),
    ) -> Result<TrustRecord, StoreError> {
        let mut trust = guard(&self.trust)?;
        let record = trust
            .entry(user.clone())
            .or_insert_with(|| TrustRecord::new(user.clone(), now));
        f(record);
        Ok(record.clone())
    }
}

impl RateLimitStore for MemoryStore {
    fn increment_window(&self, key: &RateLimitKey, mission: &MissionId, day: u64) -> Result<u32, StoreError> {
        let mut windows = guard(&self.windows)?;
        // Windows before yesterday can never be read again.
        windows.retain(|(_, _, d), _| *d + 1 >= day);
        let count = windows
            .entry((key.as_key(), mission.clone(), day))
            .or_insert(0);
        *count = count.saturating_add(1);
        Ok(*count)
    }

    fn window_count(&self, key: &RateLimitKey, mission: &MissionId, day: u64) -> Result<u32, StoreError> {
        Ok(guard(&self.windows)?
            .get(&(key.as_key(), mission.clone(), day))
            .copied()
            .unwrap_or(0))
    }
}
