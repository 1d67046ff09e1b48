//! Verifier verdicts, AI confidence inputs, and decision outcomes.

use crate::reason::ReasonCode;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of a single verification signal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerdictOutcome {
    Pass,
    Fail,
    /// The signal could not decide; routes the proof to review.
    Inconclusive,
}

/// The typed result of one verification signal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalVerdict {
    /// Name of the verifier that produced this verdict.
    pub verifier: String,
    pub outcome: VerdictOutcome,
    /// Optional confidence 0–100.
    #[serde(default)]
    pub confidence: Option<u8>,
    pub reason: ReasonCode,
}

impl SignalVerdict {
    pub fn pass(verifier: &str) -> Self {
        Self {
            verifier: verifier.to_string(),
            outcome: VerdictOutcome::Pass,
            confidence: None,
            reason: ReasonCode::Verified,
        }
    }

    pub fn fail(verifier: &str, reason: ReasonCode) -> Self {
        Self {
            verifier: verifier.to_string(),
            outcome: VerdictOutcome::Fail,
            confidence: None,
            reason,
        }
    }

    pub fn inconclusive(verifier: &str, reason: ReasonCode) -> Self {
        Self {
            verifier: verifier.to_string(),
            outcome: VerdictOutcome::Inconclusive,
            confidence: None,
            reason,
        }
    }

    pub fn with_confidence(mut self, confidence: u8) -> Self {
        self.confidence = Some(confidence.min(100));
        self
    }

    pub fn is_fail(&self) -> bool {
        self.outcome == VerdictOutcome::Fail
    }

    pub fn is_inconclusive(&self) -> bool {
        self.outcome == VerdictOutcome::Inconclusive
    }
}

/// A confidence score from an external computer-vision / OCR model.
///
/// The engine only consumes the score; it never computes it. On its own the
/// score is never an authority: it is always wrapped into a [`SignalVerdict`]
/// and then weighed by the decision policy.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiConfidenceScore {
    /// 0–100; values above 100 are clamped on use.
    pub score: u8,
    /// Tag of the model that produced the score.
    pub model: String,
    #[serde(default)]
    pub findings: String,
}

impl AiConfidenceScore {
    pub fn clamped(&self) -> u8 {
        self.score.min(100)
    }
}

/// Aggregate decision for a proof.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DecisionOutcome {
    AutoApprove,
    FlagForReview,
    AutoReject,
}

impl fmt::Display for DecisionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AutoApprove => f.write_str("AUTO_APPROVE"),
            Self::FlagForReview => f.write_str("FLAG_FOR_REVIEW"),
            Self::AutoReject => f.write_str("AUTO_REJECT"),
        }
    }
}

/// How urgently a flagged proof should be looked at by the business.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewPriority {
    /// Every automated signal passed; review only because policy requires it.
    Low,
    Normal,
    High,
}
