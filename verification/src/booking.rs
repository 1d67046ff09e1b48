//! Booking webhook verifier.

use crate::context::history_finding;
use crate::method::{conclude, SignalVerifier};
use crate::VerificationContext;
use fluzio_types::proof::{order_ref, BookingProof, BookingStatus};
use fluzio_types::{Mission, ProofPayload, ProofType, ReasonCode, SignalVerdict};

pub struct BookingVerifier;

impl BookingVerifier {
    pub const NAME: &'static str = "booking_webhook";

    fn check(&self, booking: &BookingProof, mission: &Mission, ctx: &VerificationContext<'_>) -> Vec<SignalVerdict> {
        let name = Self::NAME;
        if !ctx.secrets.verify_provider(
            &booking.provider,
            booking.signing_message().as_bytes(),
            &booking.signature,
        ) {
            return vec![SignalVerdict::fail(name, ReasonCode::SignatureInvalid)];
        }

        let mut findings = Vec::new();
        if booking.business_id != mission.business_id {
            findings.push(SignalVerdict::fail(name, ReasonCode::WrongBusiness));
        }
        if booking.customer_id != ctx.submitter.user_id {
            findings.push(SignalVerdict::fail(name, ReasonCode::CustomerMismatch));
        }
        if !matches!(
            booking.status_at_creation,
            BookingStatus::Scheduled | BookingStatus::Confirmed
        ) {
            findings.push(SignalVerdict::fail(name, ReasonCode::BookingNotScheduled));
        }
        let lookup = ctx
            .history
            .external_ref_seen(&order_ref(&booking.provider, &booking.booking_id));
        findings.extend(history_finding(name, lookup, ReasonCode::DuplicateProof));

        let deadline = booking
            .scheduled_for
            .plus_secs(ctx.params.booking_confirmation_window_secs);
        match booking.status {
            BookingStatus::NoShow => findings.push(SignalVerdict::fail(name, ReasonCode::BookingNoShow)),
            BookingStatus::Cancelled => {
                findings.push(SignalVerdict::fail(name, ReasonCode::BookingCancelled))
            }
            BookingStatus::Scheduled | BookingStatus::Confirmed => {
                if ctx.now > deadline {
                    findings.push(SignalVerdict::fail(name, ReasonCode::ConfirmationWindowElapsed));
                } else {
                    findings.push(SignalVerdict::inconclusive(name, ReasonCode::BookingNotCompleted));
                }
            }
            BookingStatus::Completed => match booking.business_confirmed_at {
                Some(at) if at <= deadline => {}
                Some(_) => {
                    findings.push(SignalVerdict::fail(name, ReasonCode::ConfirmationWindowElapsed))
                }
                None if ctx.now > deadline => {
                    findings.push(SignalVerdict::fail(name, ReasonCode::ConfirmationWindowElapsed))
                }
                None => findings.push(SignalVerdict::inconclusive(
                    name,
                    ReasonCode::AwaitingBusinessConfirmation,
                )),
            },
        }
        conclude(name, findings)
    }
}

impl SignalVerifier for BookingVerifier {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn proof_types(&self) -> &'static [ProofType] {
        &[ProofType::BookingWebhook]
    }

    fn verify(
        &self,
        proof: &ProofPayload,
        mission: &Mission,
        ctx: &VerificationContext<'_>,
    ) -> Vec<SignalVerdict> {
        match proof {
            ProofPayload::BookingWebhook(b) => self.check(b, mission, ctx),
            _ => vec![SignalVerdict::fail(Self::NAME, ReasonCode::ProofTypeMismatch)],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;
    use fluzio_types::{BusinessId, Timestamp, UserId, VerdictOutcome};

    const HOUR: u64 = 3600;

    fn booking(status: BookingStatus, confirmed_after: Option<u64>) -> BookingProof {
        let scheduled_for = Timestamp::new(NOW - 10 * HOUR);
        let mut b = BookingProof {
            provider: "calendly".into(),
            booking_id: "bk_9".into(),
            business_id: BusinessId::new("b1"),
            customer_id: UserId::new("u1"),
            status_at_creation: BookingStatus::Scheduled,
            status,
            created_at: Timestamp::new(NOW - 100 * HOUR),
            scheduled_for,
            business_confirmed_at: confirmed_after.map(|s| scheduled_for.plus_secs(s)),
            signature: String::new(),
        };
        b.signature = sign(&b.signing_message());
        b
    }

    fn run(fx: &Fixture, b: BookingProof) -> Vec<SignalVerdict> {
        BookingVerifier.verify(
            &ProofPayload::BookingWebhook(b),
            &mission(ProofType::BookingWebhook),
            &fx.ctx(),
        )
    }

    #[test]
    fn confirmed_completion_passes() {
        let fx = Fixture::new();
        assert_eq!(
            run(&fx, booking(BookingStatus::Completed, Some(2 * HOUR))),
            vec![SignalVerdict::pass("booking_webhook")]
        );
    }

    #[test]
    fn awaiting_confirmation_inside_window_is_inconclusive() {
        let fx = Fixture::new();
        let verdicts = run(&fx, booking(BookingStatus::Completed, None));
        assert_eq!(
            reasons(&verdicts, VerdictOutcome::Inconclusive),
            vec![ReasonCode::AwaitingBusinessConfirmation]
        );
    }

    #[test]
    fn confirmation_after_48h_fails() {
        let mut fx = Fixture::new();
        fx.now = fx.now.plus_secs(100 * HOUR);
        assert_eq!(
            reasons(&run(&fx, booking(BookingStatus::Completed, Some(49 * HOUR))), VerdictOutcome::Fail),
            vec![ReasonCode::ConfirmationWindowElapsed]
        );
        assert_eq!(
            reasons(&run(&fx, booking(BookingStatus::Completed, None)), VerdictOutcome::Fail),
            vec![ReasonCode::ConfirmationWindowElapsed]
        );
    }

    #[test]
    fn no_show_and_wrong_business_fail() {
        let fx = Fixture::new();
        let mut b = booking(BookingStatus::NoShow, None);
        b.business_id = BusinessId::new("b2");
        b.signature = sign(&b.signing_message());
        assert_eq!(
            reasons(&run(&fx, b), VerdictOutcome::Fail),
            vec![ReasonCode::WrongBusiness, ReasonCode::BookingNoShow]
        );
    }

    #[test]
    fn booking_created_cancelled_is_not_scheduled() {
        let fx = Fixture::new();
        let mut b = booking(BookingStatus::Completed, Some(HOUR));
        b.status_at_creation = BookingStatus::Cancelled;
        b.signature = sign(&b.signing_message());
        assert_eq!(
            reasons(&run(&fx, b), VerdictOutcome::Fail),
            vec![ReasonCode::BookingNotScheduled]
        );
    }

    #[test]
    fn forged_confirmation_breaks_signature() {
        let fx = Fixture::new();
        let mut b = booking(BookingStatus::Completed, None);
        b.business_confirmed_at = Some(b.scheduled_for.plus_secs(HOUR));
        assert_eq!(
            run(&fx, b),
            vec![SignalVerdict::fail("booking_webhook", ReasonCode::SignatureInvalid)]
        );

        let mut b = booking(BookingStatus::Completed, Some(HOUR));
        b.status_at_creation = BookingStatus::Confirmed;
        assert_eq!(
            reasons(&run(&fx, b), VerdictOutcome::Fail),
            vec![ReasonCode::SignatureInvalid]
        );
    }
}
