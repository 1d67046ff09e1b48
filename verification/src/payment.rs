//! Payment webhook verifier.
//!
//! The provider signature is checked first and unconditionally. A later
//! refund or chargeback never re-runs this verifier; it revokes the reward.
//! Proofs whose provider timestamp is outside `payment_proof_max_age_days`
//! of now are stale.

use crate::context::history_finding;
use crate::method::{conclude, SignalVerifier};
use crate::VerificationContext;
use fluzio_types::proof::{order_ref, OrderStatus, PaymentProof};
use fluzio_types::{
    Mission, ProofPayload, ProofType, ReasonCode, SignalVerdict, UserId, SECS_PER_DAY,
};

pub struct PaymentVerifier;

impl PaymentVerifier {
    pub const NAME: &'static str = "payment_webhook";

    /// Verify `payment` as evidence that `customer` paid for `mission`.
    pub(crate) fn check(
        &self,
        name: &str,
        payment: &PaymentProof,
        mission: &Mission,
        customer: &UserId,
        ctx: &VerificationContext<'_>,
    ) -> Vec<SignalVerdict> {
        if !ctx.secrets.verify_provider(
            &payment.provider,
            payment.signing_message().as_bytes(),
            &payment.signature,
        ) {
            return vec![SignalVerdict::fail(name, ReasonCode::SignatureInvalid)];
        }

        let mut findings = Vec::new();
        let max_age = ctx.params.payment_proof_max_age_days as u64 * SECS_PER_DAY;
        if payment.timestamp.abs_diff(ctx.now) > max_age {
            findings.push(SignalVerdict::fail(name, ReasonCode::StaleWebhook));
        }
        if payment.status != OrderStatus::Paid {
            findings.push(SignalVerdict::fail(name, ReasonCode::OrderNotPaid));
        }
        if payment.amount_cents < mission.min_purchase_cents {
            findings.push(SignalVerdict::fail(name, ReasonCode::AmountBelowMinimum));
        }
        if &payment.customer_id != customer {
            findings.push(SignalVerdict::fail(name, ReasonCode::CustomerMismatch));
        }
        let lookup = ctx
            .history
            .external_ref_seen(&order_ref(&payment.provider, &payment.order_id));
        findings.extend(history_finding(name, lookup, ReasonCode::DuplicateProof));
        conclude(name, findings)
    }
}

impl SignalVerifier for PaymentVerifier {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn proof_types(&self) -> &'static [ProofType] {
        &[ProofType::PaymentWebhook]
    }

    fn verify(
        &self,
        proof: &ProofPayload,
        mission: &Mission,
        ctx: &VerificationContext<'_>,
    ) -> Vec<SignalVerdict> {
        match proof {
            ProofPayload::PaymentWebhook(p) => {
                self.check(Self::NAME, p, mission, &ctx.submitter.user_id, ctx)
            }
            _ => vec![SignalVerdict::fail(Self::NAME, ReasonCode::ProofTypeMismatch)],
        }
    }
}
