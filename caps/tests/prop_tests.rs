use proptest::prelude::*;

use fluzio_caps::{check_advisory, check_commit, ParticipationCounts};
use fluzio_types::{
    BusinessId, Mission, MissionId, ParticipationCapConfig, ProofType, Rejection, RewardPoints,
    Timestamp, SECS_PER_DAY,
};

fn mission(caps: ParticipationCapConfig) -> Mission {
    Mission {
        id: MissionId::new("m"),
        business_id: BusinessId::new("b"),
        proof_type: ProofType::Qr,
        reward_points: RewardPoints::new(10),
        min_purchase_cents: 0,
        min_duration_secs: 0,
        caps: Some(caps),
        cap_tier: None,
        active: true,
        ends_at: None,
        location: None,
    }
}

proptest! {
    /// Cooldown: refused for any now < D+N days, allowed at exactly D+N days.
    #[test]
    fn cooldown_boundary(
        last_day in 0u64..10_000,
        offset in 0u64..SECS_PER_DAY,
        days in 1u32..60,
        before in 1u64..(60 * SECS_PER_DAY),
    ) {
        let m = mission(ParticipationCapConfig {
            cooldown_period_days: days,
            ..ParticipationCapConfig::unbounded()
        });
        let last = Timestamp::new(last_day * SECS_PER_DAY + offset);
        let counts = ParticipationCounts {
            user_completed: 1,
            user_active: 1,
            total_active: 1,
            last_completion: Some(last),
            ..Default::default()
        };
        let unlock = last.plus_days(days);
        prop_assert!(check_advisory(&m, &counts, unlock).allowed);
        prop_assume!(before <= unlock.as_secs() - last.as_secs());
        let early = unlock.minus_secs(before);
        let check = check_advisory(&m, &counts, early);
        prop_assert!(!check.allowed);
        let is_cooldown = matches!(
            check.reason,
            Some(Rejection::CooldownActive { unlock_at, .. }) if unlock_at == unlock
        );
        prop_assert!(is_cooldown);
    }

    /// One-time missions never admit a second participation after a completion.
    #[test]
    fn one_time_never_readmits(
        total in 1u32..1000,
        today in 0u32..100,
        max_per_user in proptest::option::of(0u32..=1),
        now in 0u64..u32::MAX as u64,
    ) {
        let m = mission(ParticipationCapConfig {
            is_one_time_only: true,
            max_participations_per_user: max_per_user,
            ..ParticipationCapConfig::unbounded()
        });
        let counts = ParticipationCounts {
            total_active: total,
            today,
            user_completed: 1,
            user_active: 1,
            last_completion: Some(Timestamp::new(0)),
        };
        let now = Timestamp::new(now);
        let advisory = check_advisory(&m, &counts, now);
        let commit = check_commit(&m, &counts, now);
        prop_assert!(!advisory.allowed);
        prop_assert!(!commit.allowed);
        prop_assert_eq!(advisory.reason, Some(Rejection::AlreadyCompleted));
    }

    /// The commit check is never more permissive than the advisory one.
    #[test]
    fn commit_at_least_as_strict(
        max_total in proptest::option::of(0u32..20),
        max_day in proptest::option::of(0u32..20),
        max_user in proptest::option::of(0u32..5),
        total in 0u32..25,
        today in 0u32..25,
        completed in 0u32..5,
        pending in 0u32..5,
    ) {
        let m = mission(ParticipationCapConfig {
            max_total_participants: max_total,
            max_participants_per_day: max_day,
            max_participations_per_user: max_user,
            ..ParticipationCapConfig::unbounded()
        });
        let counts = ParticipationCounts {
            total_active: total,
            today,
            user_completed: completed,
            user_active: completed + pending,
            last_completion: None,
        };
        let now = Timestamp::new(0);
        if check_commit(&m, &counts, now).allowed {
            prop_assert!(check_advisory(&m, &counts, now).allowed);
        }
        if let Some(max) = max_total {
            if total >= max {
                prop_assert!(!check_commit(&m, &counts, now).allowed);
            }
        }
    }
}
