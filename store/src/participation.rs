//! Participation storage trait.

use crate::StoreError;
use fluzio_types::{MissionId, Participation, ParticipationId, UserId};

/// Storage for participation records.
///
/// Writes replace the whole record; the engine serializes writes per mission
/// so a read-modify-write under the mission lock is race free.
pub trait ParticipationStore {
    /// Allocate a fresh, never reused participation id.
    fn next_participation_id(&self) -> Result<ParticipationId, StoreError>;

    fn put_participation(&self, participation: &Participation) -> Result<(), StoreError>;

    /// Fails with [`StoreError::NotFound`] for an unknown id.
    fn get_participation(&self, id: ParticipationId) -> Result<Participation, StoreError>;

    /// All participations of a mission, in id order.
    fn mission_participations(&self, mission: &MissionId) -> Result<Vec<Participation>, StoreError>;

    /// All participations of one user in one mission, in id order.
    fn user_mission_participations(
        &self,
        user: &UserId,
        mission: &MissionId,
    ) -> Result<Vec<Participation>, StoreError>;

    /// Number of participations the user has in any mission.
    fn user_participation_count(&self, user: &UserId) -> Result<u64, StoreError>;

    /// The first participation that used this provider reference. Any later
    /// one carrying the same reference is a duplicate.
    fn find_by_external_ref(&self, external_ref: &str) -> Result<Option<Participation>, StoreError>;
}
