use fluzio_store::StoreError;
use fluzio_types::{Timestamp, UserId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrustError {
    #[error("rate limit exceeded for {key}: {count} submissions today")]
    RateLimited { key: String, count: u32 },

    #[error("user {user} is blocked until {until}")]
    Blocked { user: UserId, until: Timestamp },

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}
