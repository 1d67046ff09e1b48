use fluzio_types::{MissionId, ParticipationId, ParticipationStatus, Rejection};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NodeError {
    /// A submission or webhook refused with a stable reason code.
    #[error("rejected: {0}")]
    Rejected(#[from] Rejection),

    #[error("mission {0} not found")]
    MissionNotFound(MissionId),

    #[error("participation {0} not found")]
    ParticipationNotFound(ParticipationId),

    #[error("participation {participation} is {status}; the operation does not apply")]
    InvalidState {
        participation: ParticipationId,
        status: ParticipationStatus,
    },

    #[error("business {business} does not own participation {participation}")]
    WrongBusiness {
        business: String,
        participation: ParticipationId,
    },

    #[error("unknown webhook provider: {0}")]
    UnknownProvider(String),

    #[error("malformed payload: {0}")]
    Malformed(String),

    #[error("store error: {0}")]
    Store(#[from] fluzio_store::StoreError),

    #[error("trust ledger error: {0}")]
    Trust(#[from] fluzio_trust::TrustError),

    #[error("reward ledger error: {0}")]
    Reward(#[from] fluzio_rewards::RewardError),

    #[error("verification error: {0}")]
    Verification(#[from] fluzio_verification::VerificationError),

    #[error("config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
