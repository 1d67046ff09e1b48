//! Verifier registry: dispatch by proof type, run in parallel.

use crate::booking::BookingVerifier;
use crate::gps::GpsDwellVerifier;
use crate::media::MediaVerifier;
use crate::payment::PaymentVerifier;
use crate::qr::QrVerifier;
use crate::referral::ReferralVerifier;
use crate::signals::{AiConfidenceSignal, TrustSignal, UniqueProofSignal};
use crate::{SignalVerifier, VerificationContext, VerificationError};
use fluzio_types::{Mission, ProofPayload, ProofType, SignalVerdict};
use rayon::prelude::*;
use std::collections::HashMap;

/// Verifiers in registration order, indexed by the proof types they handle.
pub struct VerifierRegistry {
    verifiers: Vec<Box<dyn SignalVerifier>>,
    by_type: HashMap<ProofType, Vec<usize>>,
}

impl VerifierRegistry {
    pub fn empty() -> Self {
        Self {
            verifiers: Vec::new(),
            by_type: HashMap::new(),
        }
    }

    /// One verifier per proof type, then the cross-cutting signals.
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        registry.register(Box::new(QrVerifier));
        registry.register(Box::new(GpsDwellVerifier));
        registry.register(Box::new(PaymentVerifier));
        registry.register(Box::new(BookingVerifier));
        registry.register(Box::new(ReferralVerifier));
        registry.register(Box::new(MediaVerifier::screenshot()));
        registry.register(Box::new(MediaVerifier::media_upload()));
        registry.register(Box::new(UniqueProofSignal));
        registry.register(Box::new(TrustSignal));
        registry.register(Box::new(AiConfidenceSignal));
        registry
    }

    pub fn register(&mut self, verifier: Box<dyn SignalVerifier>) {
        let index = self.verifiers.len();
        for proof_type in verifier.proof_types() {
            self.by_type.entry(*proof_type).or_default().push(index);
        }
        self.verifiers.push(verifier);
    }

    /// Names of the verifiers dispatched for `proof_type`, in order.
    pub fn names_for(&self, proof_type: ProofType) -> Vec<&'static str> {
        self.by_type
            .get(&proof_type)
            .map(|idx| idx.iter().map(|&i| self.verifiers[i].name()).collect())
            .unwrap_or_default()
    }

    // At least one verifier must be specific to the type; the cross-cutting
    // signals alone never suffice.
    fn has_specific(&self, idx: &[usize]) -> bool {
        idx.iter()
            .any(|&i| self.verifiers[i].proof_types().len() < ProofType::ALL.len())
    }

    /// Whether proofs of this type can be verified at all.
    pub fn supports(&self, proof_type: ProofType) -> bool {
        self.by_type
            .get(&proof_type)
            .is_some_and(|idx| self.has_specific(idx))
    }

    /// Run every verifier registered for the proof's type.
    ///
    /// Verifiers run concurrently; verdicts come back in registration order.
    pub fn verify(
        &self,
        proof: &ProofPayload,
        mission: &Mission,
        ctx: &VerificationContext<'_>,
    ) -> Result<Vec<SignalVerdict>, VerificationError> {
        let proof_type = proof.proof_type();
        let selected = self
            .by_type
            .get(&proof_type)
            .filter(|idx| self.has_specific(idx))
            .ok_or(VerificationError::NoVerifier(proof_type))?;

        let verdicts: Vec<Vec<SignalVerdict>> = selected
            .par_iter()
            .map(|&i| self.verifiers[i].verify(proof, mission, ctx))
            .collect();
        let verdicts: Vec<SignalVerdict> = verdicts.into_iter().flatten().collect();
        for v in &verdicts {
            tracing::debug!(
                mission = %mission.id,
                verifier = %v.verifier,
                outcome = ?v.outcome,
                reason = %v.reason,
                "verdict"
            );
        }
        Ok(verdicts)
    }
}

impl Default for VerifierRegistry {
    fn default() -> Self {
        Self::standard()
    }
}
