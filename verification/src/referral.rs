//! Referral verifier.
//!
//! Self-referral is checked before anything else and is an unconditional
//! FAIL. The referrer must be the submitter, and the referred party may not
//! share the submitter's user, device, IP or user agent. The conversion is verified by delegating to the verifier for its
//! own proof type.

use crate::context::history_finding;
use crate::gps::GpsDwellVerifier;
use crate::method::{conclude, SignalVerifier};
use crate::payment::PaymentVerifier;
use crate::qr::QrVerifier;
use crate::VerificationContext;
use fluzio_types::proof::{ReferralParty, ReferralProof};
use fluzio_types::{
    Mission, ProofPayload, ProofType, ReasonCode, SignalVerdict, SubmitterIdentity, SECS_PER_DAY,
};

pub struct ReferralVerifier;

fn same_party(a: &ReferralParty, b: &ReferralParty) -> bool {
    a.user_id == b.user_id
        || a.device_id == b.device_id
        || a.ip == b.ip
        || (!a.user_agent.is_empty() && a.user_agent == b.user_agent)
}

fn shares_identity(party: &ReferralParty, submitter: &SubmitterIdentity) -> bool {
    party.user_id == submitter.user_id
        || party.device_id == submitter.device_id
        || party.ip == submitter.ip
        || (!party.user_agent.is_empty() && party.user_agent == submitter.user_agent)
}

impl ReferralVerifier {
    pub const NAME: &'static str = "referral";
    const CONVERSION: &'static str = "referral/conversion";

    fn check(&self, referral: &ReferralProof, mission: &Mission, ctx: &VerificationContext<'_>) -> Vec<SignalVerdict> {
        let name = Self::NAME;
        // The reward goes to the submitter, so the referrer named in the payload
        // has to be them.
        if referral.referrer.user_id != ctx.submitter.user_id
            || same_party(&referral.referrer, &referral.referred)
            || shares_identity(&referral.referred, ctx.submitter)
        {
            return vec![SignalVerdict::fail(name, ReasonCode::SelfReferral)];
        }

        let lookup = ctx.history.user_has_activity(&referral.referred.user_id);
        let mut findings: Vec<SignalVerdict> =
            history_finding(name, lookup, ReasonCode::ReferredUserNotNew).into_iter().collect();
        let window = ctx.params.referral_conversion_window_days as u64 * SECS_PER_DAY;
        if referral.converted_at < referral.clicked_at
            || referral.clicked_at.elapsed_since(referral.converted_at) > window
        {
            findings.push(SignalVerdict::fail(name, ReasonCode::ConversionWindowExpired));
        }
        if let Some(cluster) = &referral.cluster_score {
            let score = cluster.clamped();
            if score < ctx.params.referral_cluster_min_score {
                findings.push(
                    SignalVerdict::inconclusive(name, ReasonCode::ReferralClusterRisk)
                        .with_confidence(score),
                );
            }
        }

        let mut verdicts = conclude(name, findings);
        verdicts.extend(self.verify_conversion(referral, mission, ctx));
        verdicts
    }

    fn verify_conversion(
        &self,
        referral: &ReferralProof,
        mission: &Mission,
        ctx: &VerificationContext<'_>,
    ) -> Vec<SignalVerdict> {
        let name = Self::CONVERSION;
        match referral.conversion.as_ref() {
            // The referred user is the paying customer, not the submitter.
            ProofPayload::PaymentWebhook(p) => {
                PaymentVerifier.check(name, p, mission, &referral.referred.user_id, ctx)
            }
            ProofPayload::Qr(q) => QrVerifier.check(name, q, mission, ctx),
            ProofPayload::GpsDwell(g) => GpsDwellVerifier.check(name, g, mission, ctx),
            _ => vec![SignalVerdict::fail(name, ReasonCode::UnsupportedConversion)],
        }
    }
}

impl SignalVerifier for ReferralVerifier {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn proof_types(&self) -> &'static [ProofType] {
        &[ProofType::Referral]
    }

    fn verify(
        &self,
        proof: &ProofPayload,
        mission: &Mission,
        ctx: &VerificationContext<'_>,
    ) -> Vec<SignalVerdict> {
        match proof {
            ProofPayload::Referral(r) => self.check(r, mission, ctx),
            _ => vec![SignalVerdict::fail(Self::NAME, ReasonCode::ProofTypeMismatch)],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;
    use fluzio_types::proof::{MediaProof, OrderStatus, PaymentProof};
    use fluzio_types::{AiConfidenceScore, DeviceId, IpAddress, Timestamp, UserId, VerdictOutcome};

    fn party(n: &str) -> ReferralParty {
        ReferralParty {
            user_id: UserId::new(&format!("user-{n}")),
            device_id: DeviceId::new(&format!("dev-{n}")),
            ip: IpAddress::new(&format!("10.0.0.{n}")),
            user_agent: format!("agent/{n}"),
        }
    }

    fn purchase(customer: &str) -> ProofPayload {
        let mut p = PaymentProof {
            provider: "stripe".into(),
            order_id: "ord_ref".into(),
            status: OrderStatus::Paid,
            amount_cents: 2_000,
            customer_id: UserId::new(customer),
            timestamp: Timestamp::new(NOW - 60),
            signature: String::new(),
            first_purchase: true,
        };
        p.signature = sign(&p.signing_message());
        ProofPayload::PaymentWebhook(p)
    }

    fn submitter_party(fx: &Fixture) -> ReferralParty {
        ReferralParty {
            user_id: fx.submitter.user_id.clone(),
            device_id: fx.submitter.device_id.clone(),
            ip: fx.submitter.ip.clone(),
            user_agent: fx.submitter.user_agent.clone(),
        }
    }

    fn referral(referred: ReferralParty, conversion: ProofPayload) -> ReferralProof {
        ReferralProof {
            referrer: submitter_party(&Fixture::new()),
            referred,
            clicked_at: Timestamp::new(NOW - 5 * SECS_PER_DAY),
            converted_at: Timestamp::new(NOW - 60),
            conversion: Box::new(conversion),
            cluster_score: None,
        }
    }

    fn run(fx: &Fixture, r: ReferralProof) -> Vec<SignalVerdict> {
        ReferralVerifier.verify(&ProofPayload::Referral(r), &mission(ProofType::Referral), &fx.ctx())
    }

    #[test]
    fn organic_referral_with_purchase_passes() {
        let fx = Fixture::new();
        let verdicts = run(&fx, referral(party("2"), purchase("user-2")));
        assert_eq!(
            verdicts,
            vec![SignalVerdict::pass("referral"), SignalVerdict::pass("referral/conversion")]
        );
    }

    #[test]
    fn shared_device_is_self_referral_before_anything_else() {
        let fx = Fixture::new();
        let mut referred = party("2");
        referred.device_id = DeviceId::new("d1");
        let mut r = referral(referred, purchase("nobody"));
        r.converted_at = Timestamp::new(NOW + 90 * SECS_PER_DAY);
        assert_eq!(run(&fx, r), vec![SignalVerdict::fail("referral", ReasonCode::SelfReferral)]);
    }

    #[test]
    fn returning_user_and_late_conversion_fail() {
        let mut fx = Fixture::new();
        fx.history.active_users.insert(UserId::new("user-2"));
        let mut r = referral(party("2"), purchase("user-2"));
        r.clicked_at = Timestamp::new(NOW - 31 * SECS_PER_DAY);
        assert_eq!(
            reasons(&run(&fx, r), VerdictOutcome::Fail),
            vec![ReasonCode::ReferredUserNotNew, ReasonCode::ConversionWindowExpired]
        );
    }

    #[test]
    fn conversion_is_verified_by_payment_rules() {
        let fx = Fixture::new();
        let verdicts = run(&fx, referral(party("2"), purchase("user-1")));
        assert_eq!(
            verdicts.last(),
            Some(&SignalVerdict::fail("referral/conversion", ReasonCode::CustomerMismatch))
        );
    }

    #[test]
    fn media_conversion_unsupported() {
        let fx = Fixture::new();
        let media = ProofPayload::MediaUpload(MediaProof {
            content_hash: "ff".into(),
            exif: None,
            stock_image_detected: false,
            ai_generated_detected: false,
            external_review_ref: None,
        });
        assert_eq!(
            reasons(&run(&fx, referral(party("2"), media)), VerdictOutcome::Fail),
            vec![ReasonCode::UnsupportedConversion]
        );
    }

    #[test]
    fn clustered_referral_is_inconclusive() {
        let fx = Fixture::new();
        let mut r = referral(party("2"), purchase("user-2"));
        r.cluster_score = Some(AiConfidenceScore {
            score: 60,
            model: "farm-detector".into(),
            findings: "shared subnet".into(),
        });
        let verdicts = run(&fx, r);
        assert!(reasons(&verdicts, VerdictOutcome::Fail).is_empty());
        assert_eq!(
            reasons(&verdicts, VerdictOutcome::Inconclusive),
            vec![ReasonCode::ReferralClusterRisk]
        );
    }

    #[test]
    fn referred_account_on_submitters_device_is_self_referral() {
        let fx = Fixture::new();
        let referred = ReferralParty {
            user_id: UserId::new("user-2"),
            device_id: fx.submitter.device_id.clone(),
            ip: fx.submitter.ip.clone(),
            user_agent: fx.submitter.user_agent.clone(),
        };
        let mut r = referral(referred, purchase("user-2"));
        r.referrer = party("9");
        r.referrer.ip = IpAddress::new("192.168.9.9");
        assert_eq!(run(&fx, r), vec![SignalVerdict::fail("referral", ReasonCode::SelfReferral)]);
    }

    #[test]
    fn referrer_other_than_submitter_fails() {
        let fx = Fixture::new();
        let mut r = referral(party("2"), purchase("user-2"));
        r.referrer = party("3");
        assert_eq!(run(&fx, r), vec![SignalVerdict::fail("referral", ReasonCode::SelfReferral)]);
    }

    #[test]
    fn referred_sharing_only_submitters_ip_fails() {
        let fx = Fixture::new();
        let mut referred = party("2");
        referred.ip = fx.submitter.ip.clone();
        assert_eq!(
            reasons(&run(&fx, referral(referred, purchase("user-2"))), VerdictOutcome::Fail),
            vec![ReasonCode::SelfReferral]
        );
    }

    #[test]
    fn unknown_referred_activity_is_inconclusive() {
        let mut fx = Fixture::new();
        fx.history.unavailable = true;
        let verdicts = run(&fx, referral(party("2"), purchase("user-2")));
        assert!(reasons(&verdicts, VerdictOutcome::Fail).is_empty());
        assert_eq!(
            reasons(&verdicts, VerdictOutcome::Inconclusive),
            vec![ReasonCode::HistoryUnavailable, ReasonCode::HistoryUnavailable]
        );
    }
}
