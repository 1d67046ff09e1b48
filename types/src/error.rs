//! The rejection taxonomy surfaced to callers.

use crate::reason::ReasonCode;
use crate::time::Timestamp;
use crate::verdict::SignalVerdict;
use thiserror::Error;

/// Why a submission, decision or signal was refused.
///
/// Every variant carries a stable [`ReasonCode`]; no rejection is silent.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("capacity reached: {0}")]
    CapacityExceeded(ReasonCode),

    #[error("cooldown active: must wait {remaining_days} more days (until {unlock_at})")]
    CooldownActive {
        unlock_at: Timestamp,
        remaining_days: u64,
    },

    #[error("mission already completed by this user")]
    AlreadyCompleted,

    #[error("signature invalid")]
    SignatureInvalid,

    #[error("outside geofence: {0}")]
    GeofenceViolation(ReasonCode),

    #[error("duplicate proof")]
    DuplicateProof,

    #[error("external verification timed out")]
    TimedOut,

    #[error("insufficient confidence")]
    InsufficientConfidence,

    #[error("rejected by business")]
    BusinessRejected,

    #[error("reward revoked: {0}")]
    Revoked(ReasonCode),

    #[error("mission not accepting submissions: {0}")]
    MissionInactive(ReasonCode),

    #[error("rate limit exceeded")]
    RateLimited,

    #[error("user is blacklisted or suspended")]
    Blacklisted,

    #[error("verification failed: {0}")]
    VerificationFailed(ReasonCode),
}

impl Rejection {
    /// Stable wire code for this rejection.
    pub fn reason_code(&self) -> ReasonCode {
        match self {
            Self::CapacityExceeded(code) => *code,
            Self::CooldownActive { .. } => ReasonCode::CooldownActive,
            Self::AlreadyCompleted => ReasonCode::AlreadyCompleted,
            Self::SignatureInvalid => ReasonCode::SignatureInvalid,
            Self::GeofenceViolation(code) => *code,
            Self::DuplicateProof => ReasonCode::DuplicateProof,
            Self::TimedOut => ReasonCode::TimedOut,
            Self::InsufficientConfidence => ReasonCode::InsufficientConfidence,
            Self::BusinessRejected => ReasonCode::BusinessRejected,
            Self::Revoked(code) => *code,
            Self::MissionInactive(code) => *code,
            Self::RateLimited => ReasonCode::RateLimited,
            Self::Blacklisted => ReasonCode::UserBlacklisted,
            Self::VerificationFailed(code) => *code,
        }
    }

    /// Classify a failing verdict into the taxonomy.
    pub fn from_verdict(verdict: &SignalVerdict) -> Self {
        match verdict.reason {
            ReasonCode::SignatureInvalid => Self::SignatureInvalid,
            ReasonCode::GeofenceViolation | ReasonCode::CentroidOutsideGeofence => {
                Self::GeofenceViolation(verdict.reason)
            }
            ReasonCode::DuplicateProof => Self::DuplicateProof,
            ReasonCode::AiConfidenceLow | ReasonCode::InsufficientConfidence => {
                Self::InsufficientConfidence
            }
            other => Self::VerificationFailed(other),
        }
    }
}
