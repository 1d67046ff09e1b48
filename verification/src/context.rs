//! Read-only inputs shared by every verifier.

use crate::VerificationError;
use fluzio_crypto::SecretBook;
use fluzio_types::{
    AiConfidenceScore, EngineParams, MissionId, ReasonCode, SignalVerdict, SubmitterIdentity,
    Timestamp, TrustContext, UserId,
};

/// Lookups into already-committed proofs.
///
/// Implementations must exclude the participation being verified, so a
/// proof never collides with itself. A failed lookup is an error, never
/// `false`.
pub trait ProofHistory: Send + Sync {
    /// Another participation already used this provider reference.
    fn external_ref_seen(&self, external_ref: &str) -> Result<bool, VerificationError>;

    /// Another participation in the mission carries this media hash.
    fn media_hash_seen(&self, mission: &MissionId, content_hash: &str)
        -> Result<bool, VerificationError>;

    /// Another participation in the mission carries this fingerprint.
    fn fingerprint_seen(&self, mission: &MissionId, fingerprint: &str)
        -> Result<bool, VerificationError>;

    /// The user has any participation besides the current one.
    fn user_has_activity(&self, user: &UserId) -> Result<bool, VerificationError>;
}

/// A history check as a finding: FAIL with `seen` on a hit, nothing on a
/// miss, and INCONCLUSIVE when the lookup itself failed.
pub(crate) fn history_finding(
    name: &str,
    lookup: Result<bool, VerificationError>,
    seen: ReasonCode,
) -> Option<SignalVerdict> {
    match lookup {
        Ok(true) => Some(SignalVerdict::fail(name, seen)),
        Ok(false) => None,
        Err(e) => {
            tracing::warn!(verifier = name, error = %e, "history unavailable, routing to review");
            Some(SignalVerdict::inconclusive(name, ReasonCode::HistoryUnavailable))
        }
    }
}

/// Everything a verifier may read.
#[derive(Clone, Copy)]
pub struct VerificationContext<'a> {
    pub now: Timestamp,
    pub submitter: &'a SubmitterIdentity,
    pub trust: &'a TrustContext,
    pub history: &'a dyn ProofHistory,
    pub secrets: &'a SecretBook,
    pub params: &'a EngineParams,
    /// Score from an external vision/OCR model, when the client sent one.
    pub ai: Option<&'a AiConfidenceScore>,
}
