//! Abstract storage traits for the Fluzio proof engine.
//!
//! Each persisted record type (missions, participations, reward ledger
//! entries, trust records, rate-limit windows) has its own trait. Backends
//! implement all of them; the rest of the workspace depends only on the
//! traits.

pub mod error;
pub mod mission;
pub mod participation;
pub mod rate_limit;
pub mod reward;
pub mod trust;

pub use error::StoreError;
pub use mission::MissionStore;
pub use participation::ParticipationStore;
pub use rate_limit::RateLimitStore;
pub use reward::{RewardStore, TransitionKind};
pub use trust::TrustStore;

/// Everything the engine needs from a backend.
pub trait EngineStore:
    MissionStore + ParticipationStore + RewardStore + TrustStore + RateLimitStore + Send + Sync
{
}

impl<T> EngineStore for T where
    T: MissionStore + ParticipationStore + RewardStore + TrustStore + RateLimitStore + Send + Sync
{
}
