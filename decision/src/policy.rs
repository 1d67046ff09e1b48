use fluzio_types::{
    AiConfidenceScore, DecisionOutcome, ProofCategory, ReasonCode, ReviewPriority, RewardPoints,
    SignalVerdict,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Highest reward that may ever be auto-approved.
pub const HIGH_VALUE_CEILING: u64 = 200;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PolicyError {
    #[error("policy.ai_reject_below ({reject}) must not exceed policy.ai_review_below ({review})")]
    AiThresholdsInverted { reject: u8, review: u8 },

    #[error("policy.ai_review_below ({0}) must be at most 100")]
    AiThresholdOutOfRange(u8),

    #[error("policy.high_value_threshold ({0}) must be at most 200")]
    HighValueCeiling(u64),
}

/// Categories that are never automated, whatever the config says.
const ALWAYS_REVIEWED: [ProofCategory; 3] = [
    ProofCategory::Screenshot,
    ProofCategory::Media,
    ProofCategory::FirstTimeUser,
];

/// The policy table. Loaded from the `[policy]` config section.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecisionPolicy {
    /// Rewards above this are never auto-approved. Default: 200.
    pub high_value_threshold: u64,
    /// AI confidence below this rejects automation-eligible proofs. Default: 50.
    pub ai_reject_below: u8,
    /// AI confidence below this (and at or above `ai_reject_below`) flags. Default: 90.
    pub ai_review_below: u8,
    /// Categories that may be auto-approved when every signal passes.
    pub automation_eligible: Vec<ProofCategory>,
}

impl Default for DecisionPolicy {
    fn default() -> Self {
        Self {
            high_value_threshold: HIGH_VALUE_CEILING,
            ai_reject_below: 50,
            ai_review_below: 90,
            automation_eligible: vec![
                ProofCategory::Qr,
                ProofCategory::PaymentWebhook,
                ProofCategory::Referral,
            ],
        }
    }
}

/// The aggregate decision for one proof.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub outcome: DecisionOutcome,
    pub reason: ReasonCode,
    /// Set for FLAG_FOR_REVIEW.
    pub priority: Option<ReviewPriority>,
    pub high_value: bool,
}

impl Decision {
    fn reject(reason: ReasonCode, high_value: bool) -> Self {
        Self {
            outcome: DecisionOutcome::AutoReject,
            reason,
            priority: None,
            high_value,
        }
    }

    fn flag(reason: ReasonCode, priority: ReviewPriority, high_value: bool) -> Self {
        Self {
            outcome: DecisionOutcome::FlagForReview,
            reason,
            priority: Some(if high_value { ReviewPriority::High } else { priority }),
            high_value,
        }
    }
}

impl DecisionPolicy {
    /// Keep config overrides inside the invariants: rewards above 200 are
    /// always reviewed and the AI bands stay ordered.
    pub fn validate(&self) -> Result<(), PolicyError> {
        if self.high_value_threshold > HIGH_VALUE_CEILING {
            return Err(PolicyError::HighValueCeiling(self.high_value_threshold));
        }
        if self.ai_review_below > 100 {
            return Err(PolicyError::AiThresholdOutOfRange(self.ai_review_below));
        }
        if self.ai_reject_below > self.ai_review_below {
            return Err(PolicyError::AiThresholdsInverted {
                reject: self.ai_reject_below,
                review: self.ai_review_below,
            });
        }
        Ok(())
    }

    pub fn is_automation_eligible(&self, category: ProofCategory) -> bool {
        !ALWAYS_REVIEWED.contains(&category) && self.automation_eligible.contains(&category)
    }

    pub fn is_high_value(&self, reward: RewardPoints) -> bool {
        reward.raw() > self.high_value_threshold
    }

    /// Rules, first match wins:
    ///
    /// 1. any FAIL → AUTO_REJECT
    /// 2. AI confidence below `ai_reject_below` on an eligible category → AUTO_REJECT
    /// 3. any INCONCLUSIVE, or AI confidence below `ai_review_below` → FLAG
    /// 4. always-reviewed category or high-value reward → FLAG (ceiling)
    /// 5. eligible category → AUTO_APPROVE, otherwise FLAG
    pub fn decide(
        &self,
        verdicts: &[SignalVerdict],
        ai: Option<&AiConfidenceScore>,
        reward: RewardPoints,
        category: ProofCategory,
    ) -> Decision {
        let high_value = self.is_high_value(reward);
        let eligible = self.is_automation_eligible(category);
        let ai_score = ai.map(AiConfidenceScore::clamped);

        if let Some(failed) = verdicts.iter().find(|v| v.is_fail()) {
            return Decision::reject(failed.reason, high_value);
        }
        if eligible && ai_score.is_some_and(|s| s < self.ai_reject_below) {
            return Decision::reject(ReasonCode::InsufficientConfidence, high_value);
        }
        if let Some(unsure) = verdicts.iter().find(|v| v.is_inconclusive()) {
            return Decision::flag(unsure.reason, ReviewPriority::Normal, high_value);
        }
        if ai_score.is_some_and(|s| s < self.ai_review_below) {
            return Decision::flag(ReasonCode::AiConfidenceModerate, ReviewPriority::Normal, high_value);
        }
        if high_value {
            return Decision::flag(ReasonCode::HighValueReview, ReviewPriority::High, true);
        }
        if !eligible {
            return Decision::flag(ReasonCode::ManualReviewRequired, ReviewPriority::Low, false);
        }
        Decision {
            outcome: DecisionOutcome::AutoApprove,
            reason: ReasonCode::AutoApproved,
            priority: None,
            high_value: false,
        }
    }
}
