//! Cross-cutting signals applied to every proof type.

use crate::context::history_finding;
use crate::method::{conclude, SignalVerifier};
use crate::VerificationContext;
use fluzio_crypto::proof_fingerprint;
use fluzio_types::{Mission, ProofPayload, ProofType, ReasonCode, SignalVerdict};

/// Unique-proof missions accept each piece of evidence once.
pub struct UniqueProofSignal;

impl SignalVerifier for UniqueProofSignal {
    fn name(&self) -> &'static str {
        "unique_proof"
    }

    fn proof_types(&self) -> &'static [ProofType] {
        &ProofType::ALL
    }

    fn verify(
        &self,
        proof: &ProofPayload,
        mission: &Mission,
        ctx: &VerificationContext<'_>,
    ) -> Vec<SignalVerdict> {
        if !mission.effective_caps().requires_unique_proof {
            return Vec::new();
        }
        let fingerprint = proof_fingerprint(proof);
        let lookup = ctx.history.fingerprint_seen(&mission.id, &fingerprint);
        let finding = history_finding(self.name(), lookup, ReasonCode::DuplicateProof);
        conclude(self.name(), finding.into_iter().collect())
    }
}

/// Low-trust users are always routed to review.
pub struct TrustSignal;

impl SignalVerifier for TrustSignal {
    fn name(&self) -> &'static str {
        "trust_score"
    }

    fn proof_types(&self) -> &'static [ProofType] {
        &ProofType::ALL
    }

    fn verify(
        &self,
        _proof: &ProofPayload,
        _mission: &Mission,
        ctx: &VerificationContext<'_>,
    ) -> Vec<SignalVerdict> {
        let score = ctx.trust.score;
        let verdict = if score < ctx.params.low_trust_threshold {
            SignalVerdict::inconclusive(self.name(), ReasonCode::LowTrustScore)
        } else {
            SignalVerdict::pass(self.name())
        };
        vec![verdict.with_confidence(score)]
    }
}

/// Wraps an external AI confidence score. Never produces a FAIL.
pub struct AiConfidenceSignal;

impl SignalVerifier for AiConfidenceSignal {
    fn name(&self) -> &'static str {
        "ai_confidence"
    }

    fn proof_types(&self) -> &'static [ProofType] {
        &ProofType::ALL
    }

    fn verify(
        &self,
        _proof: &ProofPayload,
        _mission: &Mission,
        ctx: &VerificationContext<'_>,
    ) -> Vec<SignalVerdict> {
        let Some(ai) = ctx.ai else {
            return Vec::new();
        };
        let score = ai.clamped();
        let verdict = if score >= ctx.params.ai_pass_threshold {
            SignalVerdict {
                reason: ReasonCode::AiConfidenceHigh,
                ..SignalVerdict::pass(self.name())
            }
        } else if score >= 50 {
            SignalVerdict::inconclusive(self.name(), ReasonCode::AiConfidenceModerate)
        } else {
            SignalVerdict::inconclusive(self.name(), ReasonCode::AiConfidenceLow)
        };
        vec![verdict.with_confidence(score)]
    }
}
