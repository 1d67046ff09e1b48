//! [`ProofHistory`] over the participation store.

use fluzio_store::{ParticipationStore, StoreError};
use fluzio_types::{MissionId, Participation, ParticipationId, ParticipationStatus, ProofPayload, UserId};
use fluzio_verification::{ProofHistory, VerificationError};

/// Read-only view of committed participations that excludes the one being
/// verified.
///
/// Rejected participations do not count as prior media or fingerprints, so
/// a refused upload can be corrected and resubmitted. Provider references
/// count regardless of status: an order id is spent once.
pub struct StoreHistory<'a, S> {
    store: &'a S,
    current: ParticipationId,
}

impl<'a, S: ParticipationStore> StoreHistory<'a, S> {
    pub fn new(store: &'a S, current: ParticipationId) -> Self {
        Self { store, current }
    }

    fn others_in(&self, mission: &MissionId) -> Result<Vec<Participation>, VerificationError> {
        Ok(self
            .store
            .mission_participations(mission)
            .map_err(unavailable)?
            .into_iter()
            .filter(|p| p.id != self.current && p.status != ParticipationStatus::Rejected)
            .collect())
    }
}

fn unavailable(e: StoreError) -> VerificationError {
    VerificationError::History(e.to_string())
}

fn media_hash(payload: &ProofPayload) -> Option<&str> {
    match payload {
        ProofPayload::Screenshot(m) | ProofPayload::MediaUpload(m) => Some(&m.content_hash),
        _ => None,
    }
}

impl<S: ParticipationStore + Sync> ProofHistory for StoreHistory<'_, S> {
    fn external_ref_seen(&self, external_ref: &str) -> Result<bool, VerificationError> {
        let found = self
            .store
            .find_by_external_ref(external_ref)
            .map_err(unavailable)?;
        Ok(found.is_some_and(|p| p.id != self.current))
    }

    fn media_hash_seen(&self, mission: &MissionId, content_hash: &str) -> Result<bool, VerificationError> {
        Ok(self
            .others_in(mission)?
            .iter()
            .any(|p| media_hash(&p.payload).is_some_and(|h| h.eq_ignore_ascii_case(content_hash))))
    }

    fn fingerprint_seen(&self, mission: &MissionId, fingerprint: &str) -> Result<bool, VerificationError> {
        Ok(self
            .others_in(mission)?
            .iter()
            .any(|p| p.fingerprint.as_deref() == Some(fingerprint)))
    }

    fn user_has_activity(&self, user: &UserId) -> Result<bool, VerificationError> {
        let n = self.store.user_participation_count(user).map_err(unavailable)?;
        let own = match self.store.get_participation(self.current) {
            Ok(p) => &p.user_id == user,
            Err(StoreError::NotFound(_)) => false,
            Err(e) => return Err(unavailable(e)),
        };
        Ok(n > u64::from(own))
    }
}
