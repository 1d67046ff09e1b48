//! The verifier trait.

use crate::VerificationContext;
use fluzio_types::{Mission, ProofPayload, ProofType, SignalVerdict};

/// A pluggable verification signal.
pub trait SignalVerifier: Send + Sync {
    /// Stable name recorded on every verdict this verifier produces.
    fn name(&self) -> &'static str;

    /// Proof types this verifier is dispatched for.
    fn proof_types(&self) -> &'static [ProofType];

    /// Judge one proof. May return several verdicts (one per failed check)
    /// or none when the signal does not apply to this mission.
    fn verify(
        &self,
        proof: &ProofPayload,
        mission: &Mission,
        ctx: &VerificationContext<'_>,
    ) -> Vec<SignalVerdict>;
}

/// Collapse a list of findings into verdicts: the findings themselves, plus
/// a PASS when none of them is a failure.
pub(crate) fn conclude(name: &str, mut findings: Vec<SignalVerdict>) -> Vec<SignalVerdict> {
    if !findings.iter().any(SignalVerdict::is_fail) {
        findings.insert(0, SignalVerdict::pass(name));
    }
    findings
}
