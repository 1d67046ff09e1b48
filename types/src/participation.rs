//! Participation records.

use crate::ids::{DeviceId, IpAddress, MissionId, ParticipationId, UserId};
use crate::proof::{ProofPayload, ProofType};
use crate::reason::ReasonCode;
use crate::state::ParticipationStatus;
use crate::time::Timestamp;
use crate::verdict::{AiConfidenceScore, DecisionOutcome, SignalVerdict};
use serde::{Deserialize, Serialize};

/// Who submitted a proof, as seen by the ingress.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitterIdentity {
    pub user_id: UserId,
    pub device_id: DeviceId,
    pub ip: IpAddress,
    #[serde(default)]
    pub user_agent: String,
}

/// One user's attempt at one mission.
///
/// Created at the conditional commit in `PendingVerification`. Status is
/// changed only by the decision stage; once `Completed` or `Rejected` the
/// only permitted mutation is setting `revoked_at`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Participation {
    pub id: ParticipationId,
    pub mission_id: MissionId,
    pub user_id: UserId,
    pub device_id: DeviceId,
    pub ip: IpAddress,
    pub proof_type: ProofType,
    pub status: ParticipationStatus,
    pub created_at: Timestamp,
    #[serde(default)]
    pub completed_at: Option<Timestamp>,
    pub payload: ProofPayload,
    #[serde(default)]
    pub ai_confidence: Option<AiConfidenceScore>,
    #[serde(default)]
    pub verdicts: Vec<SignalVerdict>,
    #[serde(default)]
    pub decision: Option<DecisionOutcome>,
    #[serde(default)]
    pub reason: Option<ReasonCode>,
    /// Provider reference (order / booking id) used to route later webhooks.
    #[serde(default)]
    pub external_ref: Option<String>,
    /// Hex fingerprint of the payload for unique-proof missions.
    #[serde(default)]
    pub fingerprint: Option<String>,
    #[serde(default)]
    pub revoked_at: Option<Timestamp>,
}

impl Participation {
    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }
}
