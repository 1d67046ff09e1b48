//! Decision engine.
//!
//! [`DecisionPolicy::decide`] is the single place that turns verdicts and an
//! AI confidence score into AUTO_APPROVE, FLAG_FOR_REVIEW or AUTO_REJECT.
//! It is also the only behaviour a deployment may tune through config.

pub mod policy;

pub use policy::{Decision, DecisionPolicy, PolicyError};
