use fluzio_types::MissionId;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Per-mission commit locks.
///
/// Writes to participations of the same mission are serialized, so the
/// commit-time cap check always sees the latest committed count. Different
/// missions proceed in parallel.
#[derive(Default)]
pub struct MissionLocks {
    locks: Mutex<HashMap<MissionId, Arc<Mutex<()>>>>,
}

impl MissionLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lock(&self, mission: &MissionId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            locks
                .entry(mission.clone())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }

    /// Drop locks nobody holds.
    pub async fn cleanup(&self) {
        let mut locks = self.locks.lock().await;
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
    }

    pub async fn len(&self) -> usize {
        self.locks.lock().await.len()
    }
}
