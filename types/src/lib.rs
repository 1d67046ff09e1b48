//! Fundamental types for the Fluzio proof engine.
//!
//! This crate defines the types shared across every other crate in the workspace:
//! identifiers, timestamps, reward amounts, geolocation, proof payloads, the
//! persisted record types, engine parameters, and the rejection taxonomy.

pub mod amount;
pub mod error;
pub mod geo;
pub mod ids;
pub mod mission;
pub mod params;
pub mod participation;
pub mod proof;
pub mod reason;
pub mod reward;
pub mod state;
pub mod time;
pub mod trust;
pub mod verdict;

pub use amount::RewardPoints;
pub use error::Rejection;
pub use geo::GeoPoint;
pub use ids::{BusinessId, DeviceId, IpAddress, MissionId, ParticipationId, UserId};
pub use mission::{CapTier, Mission, MissionConfigError, ParticipationCapConfig};
pub use params::{EngineParams, ParamsError};
pub use participation::{Participation, SubmitterIdentity};
pub use proof::{ProofCategory, ProofPayload, ProofType};
pub use reason::ReasonCode;
pub use reward::{RevocationReason, RewardLedgerEntry, UserBalance};
pub use state::{ParticipationStatus, RewardState};
pub use time::{Clock, SystemClock, Timestamp, SECS_PER_DAY};
pub use trust::{RateLimitKey, ScanRecord, TrustContext, TrustFactors, TrustRecord};
pub use verdict::{AiConfidenceScore, DecisionOutcome, ReviewPriority, SignalVerdict, VerdictOutcome};
