use fluzio_store::StoreError;
use fluzio_trust::TrustError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RewardError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("trust ledger error: {0}")]
    Trust(#[from] TrustError),
}
