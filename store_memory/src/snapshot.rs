//! JSON snapshot persistence.

use crate::store::{guard, MemoryStore};
use fluzio_store::{StoreError, TransitionKind};
use fluzio_types::{
    Mission, MissionId, Participation, ParticipationId, RewardLedgerEntry, TrustRecord,
    UserBalance, UserId,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::atomic::Ordering;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WindowRecord {
    pub key: String,
    pub mission: MissionId,
    pub day: u64,
    pub count: u32,
}

/// Serializable image of a [`MemoryStore`].
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Snapshot {
    pub next_participation_id: u64,
    #[serde(default)]
    pub missions: Vec<Mission>,
    #[serde(default)]
    pub participations: Vec<Participation>,
    #[serde(default)]
    pub rewards: Vec<RewardLedgerEntry>,
    #[serde(default)]
    pub balances: Vec<(UserId, UserBalance)>,
    #[serde(default)]
    pub transitions: Vec<(ParticipationId, TransitionKind)>,
    #[serde(default)]
    pub trust: Vec<TrustRecord>,
    #[serde(default)]
    pub windows: Vec<WindowRecord>,
}

impl MemoryStore {
    pub fn snapshot(&self) -> Result<Snapshot, StoreError> {
        let mut transitions: Vec<_> = guard(&self.transitions)?.iter().copied().collect();
        transitions.sort();
        Ok(Snapshot {
            next_participation_id: self.next_id.load(Ordering::SeqCst),
            missions: guard(&self.missions)?.values().cloned().collect(),
            participations: guard(&self.participations)?.values().cloned().collect(),
            rewards: guard(&self.rewards)?.values().cloned().collect(),
            balances: guard(&self.balances)?
                .iter()
                .map(|(u, b)| (u.clone(), b.clone()))
                .collect(),
            transitions,
            trust: guard(&self.trust)?.values().cloned().collect(),
            windows: guard(&self.windows)?
                .iter()
                .map(|((key, mission, day), count)| WindowRecord {
                    key: key.clone(),
                    mission: mission.clone(),
                    day: *day,
                    count: *count,
                })
                .collect(),
        })
    }

    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        let store = Self::new();
        let max_seen = snapshot
            .participations
            .iter()
            .map(|p| p.id.raw() + 1)
            .max()
            .unwrap_or(1);
        store
            .next_id
            .store(snapshot.next_participation_id.max(max_seen), Ordering::SeqCst);
        // A fresh store has no other handles, so the locks cannot be poisoned.
        if let Ok(mut t) = store.missions.lock() {
            t.extend(snapshot.missions.into_iter().map(|m| (m.id.clone(), m)));
        }
        if let Ok(mut t) = store.participations.lock() {
            t.extend(snapshot.participations.into_iter().map(|p| (p.id, p)));
        }
        if let Ok(mut t) = store.rewards.lock() {
            t.extend(snapshot.rewards.into_iter().map(|e| (e.participation_id, e)));
        }
        if let Ok(mut t) = store.balances.lock() {
            t.extend(snapshot.balances);
        }
        if let Ok(mut t) = store.transitions.lock() {
            t.extend(snapshot.transitions);
        }
        if let Ok(mut t) = store.trust.lock() {
            t.extend(snapshot.trust.into_iter().map(|r| (r.user_id.clone(), r)));
        }
        if let Ok(mut t) = store.windows.lock() {
            t.extend(
                snapshot
                    .windows
                    .into_iter()
                    .map(|w| ((w.key, w.mission, w.day), w.count)),
            );
        }
        store
    }

    /// Write the whole store to `path` as JSON.
    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        let snapshot = self.snapshot()?;
        let json = serde_json::to_vec_pretty(&snapshot)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        let tmp = path.with_extension("tmp");
        std::fs::write(&tmp, json).map_err(|e| StoreError::Backend(e.to_string()))?;
        std::fs::rename(&tmp, path).map_err(|e| StoreError::Backend(e.to_string()))?;
        tracing::info!(
            path = %path.display(),
            participations = snapshot.participations.len(),
            rewards = snapshot.rewards.len(),
            "snapshot written"
        );
        Ok(())
    }

    /// Load a snapshot, or start empty when `path` does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, StoreError> {
        if !path.exists() {
            tracing::info!(path = %path.display(), "no snapshot, starting empty");
            return Ok(Self::new());
        }
        let bytes = std::fs::read(path).map_err(|e| StoreError::Backend(e.to_string()))?;
        let snapshot: Snapshot = serde_json::from_slice(&bytes)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        tracing::info!(
            path = %path.display(),
            participations = snapshot.participations.len(),
            "snapshot restored"
        );
        Ok(Self::from_snapshot(snapshot))
    }
}
