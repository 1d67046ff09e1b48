//! Fluzio proof engine.
//!
//! [`ProofEngine`] owns the submission pipeline:
//! mission gate → standing and rate limit → advisory caps → conditional
//! commit under the mission lock → parallel verification → optional
//! bounded review polling → decision → reward lock or review queue.
//!
//! It also handles everything that happens after a decision: business
//! decisions, revocation signals, provider webhooks and the unlock sweep.
//! Config, logging, metrics and shutdown live here for the daemon.

pub mod config;
pub mod engine;
pub mod error;
pub mod history;
pub mod logging;
pub mod metrics;
pub mod mission_locks;
pub mod review_client;
pub mod review_queue;
pub mod shutdown;
pub mod sweeper;
pub mod webhook;

pub use config::{BusinessSecret, EngineConfig, ProviderSecret, ReviewApiConfig};
pub use engine::{
    BusinessDecision, BusinessVerdict, ParticipationOutcome, ParticipationView, ProofEngine,
    RevocationReport, SubmitProof,
};
pub use error::NodeError;
pub use history::StoreHistory;
pub use logging::{init_logging, LogFormat};
pub use metrics::EngineMetrics;
pub use mission_locks::MissionLocks;
pub use review_client::HttpReviewProbe;
pub use review_queue::{ReviewAlert, ReviewItem, ReviewQueue};
pub use shutdown::{ShutdownCause, ShutdownController, ShutdownSignal};
pub use sweeper::spawn_sweeper;
pub use webhook::{WebhookAck, WebhookAction, WebhookEvent};
