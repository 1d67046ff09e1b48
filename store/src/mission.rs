//! Mission storage trait.

use crate::StoreError;
use fluzio_types::{Mission, MissionId};

pub trait MissionStore {
    /// Fails with [`StoreError::NotFound`] for an unknown id.
    fn get_mission(&self, id: &MissionId) -> Result<Mission, StoreError>;
    fn put_mission(&self, mission: &Mission) -> Result<(), StoreError>;
    fn list_missions(&self) -> Result<Vec<Mission>, StoreError>;
}
