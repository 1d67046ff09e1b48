use proptest::prelude::*;

use fluzio_decision::DecisionPolicy;
use fluzio_types::{
    AiConfidenceScore, DecisionOutcome, ProofCategory, ReasonCode, RewardPoints, SignalVerdict,
};

fn category() -> impl Strategy<Value = ProofCategory> {
    prop_oneof![
        Just(ProofCategory::Qr),
        Just(ProofCategory::GpsDwell),
        Just(ProofCategory::PaymentWebhook),
        Just(ProofCategory::BookingWebhook),
        Just(ProofCategory::Referral),
        Just(ProofCategory::Screenshot),
        Just(ProofCategory::Media),
        Just(ProofCategory::FirstTimeUser),
    ]
}

fn verdict() -> impl Strategy<Value = SignalVerdict> {
    prop_oneof![
        Just(SignalVerdict::pass("v")),
        Just(SignalVerdict::inconclusive("v", ReasonCode::MissingExif)),
        Just(SignalVerdict::fail("v", ReasonCode::GeofenceViolation)),
    ]
}

fn ai() -> impl Strategy<Value = Option<AiConfidenceScore>> {
    proptest::option::of((0u8..=255).prop_map(|score| AiConfidenceScore {
        score,
        model: "m".into(),
        findings: String::new(),
    }))
}

proptest! {
    /// Any FAIL verdict means AUTO_REJECT whatever the AI says.
    #[test]
    fn fail_dominates(
        mut verdicts in proptest::collection::vec(verdict(), 0..8),
        at in 0usize..8,
        ai in ai(),
        reward in 0u64..10_000,
        cat in category(),
    ) {
        let at = at.min(verdicts.len());
        verdicts.insert(at, SignalVerdict::fail("x", ReasonCode::DuplicateProof));
        let d = DecisionPolicy::default().decide(&verdicts, ai.as_ref(), RewardPoints::new(reward), cat);
        prop_assert_eq!(d.outcome, DecisionOutcome::AutoReject);
    }

    /// Screenshot, media and first-time-user proofs are never auto-approved,
    /// even with every signal passing and AI confidence 100.
    #[test]
    fn ceiling_categories_never_approve(
        verdicts in proptest::collection::vec(verdict(), 0..8),
        ai in ai(),
        reward in 0u64..10_000,
        cat in prop_oneof![
            Just(ProofCategory::Screenshot),
            Just(ProofCategory::Media),
            Just(ProofCategory::FirstTimeUser),
        ],
    ) {
        let policy = DecisionPolicy {
            automation_eligible: vec![ProofCategory::Screenshot, ProofCategory::Media, ProofCategory::FirstTimeUser],
            ..DecisionPolicy::default()
        };
        let d = policy.decide(&verdicts, ai.as_ref(), RewardPoints::new(reward), cat);
        prop_assert_ne!(d.outcome, DecisionOutcome::AutoApprove);
    }

    /// High-value rewards are never auto-approved.
    #[test]
    fn high_value_never_approves(
        verdicts in proptest::collection::vec(verdict(), 0..8),
        ai in ai(),
        reward in 201u64..1_000_000,
        cat in category(),
    ) {
        let d = DecisionPolicy::default().decide(&verdicts, ai.as_ref(), RewardPoints::new(reward), cat);
        prop_assert_ne!(d.outcome, DecisionOutcome::AutoApprove);
    }

    /// An approval implies every verdict passed and the AI, if present, was confident.
    #[test]
    fn approval_requires_clean_signals(
        verdicts in proptest::collection::vec(verdict(), 0..8),
        ai in ai(),
        reward in 0u64..400,
        cat in category(),
    ) {
        let d = DecisionPolicy::default().decide(&verdicts, ai.as_ref(), RewardPoints::new(reward), cat);
        if d.outcome == DecisionOutcome::AutoApprove {
            prop_assert!(verdicts.iter().all(|v| !v.is_fail() && !v.is_inconclusive()));
            prop_assert!(ai.map_or(true, |a| a.clamped() >= 90));
            prop_assert!(reward <= 200);
        }
    }
}

#[test]
fn policy_loads_from_toml() {
    let policy: DecisionPolicy = toml::from_str(
        r#"
        high_value_threshold = 500
        automation_eligible = ["qr", "gps_dwell"]
        "#,
    )
    .unwrap();
    assert_eq!(policy.high_value_threshold, 500);
    assert_eq!(policy.ai_reject_below, 50);
    assert!(policy.is_automation_eligible(ProofCategory::GpsDwell));
    assert!(!policy.is_automation_eligible(ProofCategory::PaymentWebhook));
}
