//! Signal verifiers.
//!
//! Every proof type has one verifier implementing [`SignalVerifier`]; a few
//! cross-cutting signals (unique proof, trust score, AI confidence) apply to
//! every type. Verifiers are pure functions over the typed payload plus a
//! read-only [`VerificationContext`]; none of them writes state.
//!
//! The [`VerifierRegistry`] dispatches by proof type and runs the selected
//! verifiers in parallel. [`polling`] holds the bounded retry loop used for
//! external review confirmation.

pub mod booking;
pub mod context;
pub mod error;
pub mod gps;
pub mod media;
pub mod method;
pub mod payment;
pub mod polling;
pub mod qr;
pub mod referral;
pub mod registry;
pub mod signals;

#[cfg(test)]
pub(crate) mod test_support;

pub use context::{ProofHistory, VerificationContext};
pub use error::VerificationError;
pub use method::SignalVerifier;
pub use polling::{
    poll_until_confirmed, ExternalProbe, PollBudget, PollOutcome, ProbeFuture, ReviewStatus,
};
pub use registry::VerifierRegistry;
