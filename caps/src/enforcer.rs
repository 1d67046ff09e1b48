use crate::ParticipationCounts;
use fluzio_types::{Mission, ParticipationCapConfig, ReasonCode, Rejection, Timestamp, SECS_PER_DAY};
use serde::{Deserialize, Serialize};

/// Result of a cap check: `{allowed, reason?}`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CapCheck {
    pub allowed: bool,
    pub reason: Option<Rejection>,
}

impl CapCheck {
    fn allow() -> Self {
        Self {
            allowed: true,
            reason: None,
        }
    }

    fn deny(reason: Rejection) -> Self {
        Self {
            allowed: false,
            reason: Some(reason),
        }
    }

    pub fn into_result(self) -> Result<(), Rejection> {
        match self.reason {
            Some(r) if !self.allowed => Err(r),
            _ => Ok(()),
        }
    }
}

fn mission_open(mission: &Mission, now: Timestamp) -> Result<(), Rejection> {
    if !mission.active {
        return Err(Rejection::MissionInactive(ReasonCode::MissionInactive));
    }
    if !mission.is_open(now) {
        return Err(Rejection::MissionInactive(ReasonCode::MissionEnded));
    }
    Ok(())
}

fn cooldown(caps: &ParticipationCapConfig, counts: &ParticipationCounts, now: Timestamp) -> Result<(), Rejection> {
    if caps.cooldown_period_days == 0 {
        return Ok(());
    }
    let Some(last) = counts.last_completion else {
        return Ok(());
    };
    let unlock_at = last.plus_days(caps.cooldown_period_days);
    if now < unlock_at {
        let remaining = unlock_at.as_secs() - now.as_secs();
        return Err(Rejection::CooldownActive {
            unlock_at,
            remaining_days: remaining.div_ceil(SECS_PER_DAY),
        });
    }
    Ok(())
}

fn global_caps(caps: &ParticipationCapConfig, counts: &ParticipationCounts) -> Result<(), Rejection> {
    if caps.max_total_participants.is_some_and(|max| counts.total_active >= max) {
        return Err(Rejection::CapacityExceeded(ReasonCode::CapacityReached));
    }
    if caps.max_participants_per_day.is_some_and(|max| counts.today >= max) {
        return Err(Rejection::CapacityExceeded(ReasonCode::DailyLimitReached));
    }
    Ok(())
}

/// Advisory check, steps in order, short-circuiting on the first failure:
/// mission open, total, daily, one-time, per-user, cooldown.
pub fn check_advisory(mission: &Mission, counts: &ParticipationCounts, now: Timestamp) -> CapCheck {
    let caps = mission.effective_caps();
    let result = mission_open(mission, now)
        .and_then(|()| global_caps(&caps, counts))
        .and_then(|()| {
            if caps.is_one_time_only && counts.user_completed >= 1 {
                return Err(Rejection::AlreadyCompleted);
            }
            if caps
                .max_participations_per_user
                .is_some_and(|max| counts.user_completed >= max)
            {
                return Err(Rejection::CapacityExceeded(ReasonCode::ParticipationLimitReached));
            }
            Ok(())
        })
        .and_then(|()| cooldown(&caps, counts, now));
    match result {
        Ok(()) => CapCheck::allow(),
        Err(r) => CapCheck::deny(r),
    }
}

/// Authoritative check at commit time.
///
/// Same order as the advisory check, but the per-user ceiling also counts
/// the user's own in-flight participations so two concurrent submissions
/// cannot both take the last per-user slot.
pub fn check_commit(mission: &Mission, counts: &ParticipationCounts, now: Timestamp) -> CapCheck {
    let caps = mission.effective_caps();
    let result = mission_open(mission, now)
        .and_then(|()| global_caps(&caps, counts))
        .and_then(|()| {
            if caps.is_one_time_only && counts.user_completed >= 1 {
                return Err(Rejection::AlreadyCompleted);
            }
            if caps
                .effective_per_user_limit()
                .is_some_and(|max| counts.user_active >= max)
            {
                return Err(Rejection::CapacityExceeded(ReasonCode::ParticipationLimitReached));
            }
            Ok(())
        })
        .and_then(|()| cooldown(&caps, counts, now));
    match result {
        Ok(()) => CapCheck::allow(),
        Err(r) => CapCheck::deny(r),
    }
}

/// Remaining slots and cooldown for one `(mission, user)` pair.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entitlement {
    pub allowed: bool,
    pub reason: Option<ReasonCode>,
    /// `None` means unbounded.
    pub remaining_total: Option<u32>,
    pub remaining_today: Option<u32>,
    pub remaining_for_user: Option<u32>,
    pub cooldown_until: Option<Timestamp>,
}

pub fn entitlement(mission: &Mission, counts: &ParticipationCounts, now: Timestamp) -> Entitlement {
    let caps = mission.effective_caps();
    let check = check_advisory(mission, counts, now);
    let cooldown_until = match &check.reason {
        Some(Rejection::CooldownActive { unlock_at, .. }) => Some(*unlock_at),
        _ => None,
    };
    Entitlement {
        allowed: check.allowed,
        reason: check.reason.as_ref().map(Rejection::reason_code),
        remaining_total: caps
            .max_total_participants
            .map(|max| max.saturating_sub(counts.total_active)),
        remaining_today: caps
            .max_participants_per_day
            .map(|max| max.saturating_sub(counts.today)),
        remaining_for_user: caps
            .effective_per_user_limit()
            .map(|max| max.saturating_sub(counts.user_completed)),
        cooldown_until,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fluzio_types::{BusinessId, MissionId, ProofType, RewardPoints};

    fn mission(caps: ParticipationCapConfig) -> Mission {
        Mission {
            id: MissionId::new("m1"),
            business_id: BusinessId::new("b1"),
            proof_type: ProofType::PaymentWebhook,
            reward_points: RewardPoints::new(100),
            min_purchase_cents: 0,
            min_duration_secs: 0,
            caps: Some(caps),
            cap_tier: None,
            active: true,
            ends_at: None,
            location: None,
        }
    }

    fn reason(check: CapCheck) -> ReasonCode {
        check.reason.map(|r| r.reason_code()).unwrap_or(ReasonCode::Verified)
    }

    #[test]
    fn inactive_mission_checked_first() {
        let mut m = mission(ParticipationCapConfig {
            max_total_participants: Some(0),
            ..ParticipationCapConfig::unbounded()
        });
        m.active = false;
        let check = check_advisory(&m, &ParticipationCounts::default(), Timestamp::new(0));
        assert_eq!(reason(check), ReasonCode::MissionInactive);
    }

    #[test]
    fn ended_mission_refused() {
        let mut m = mission(ParticipationCapConfig::unbounded());
        m.ends_at = Some(Timestamp::new(100));
        let counts = ParticipationCounts::default();
        assert!(check_advisory(&m, &counts, Timestamp::new(99)).allowed);
        assert_eq!(
            reason(check_advisory(&m, &counts, Timestamp::new(100))),
            ReasonCode::MissionEnded
        );
    }

    #[test]
    fn total_before_daily() {
        let m = mission(ParticipationCapConfig {
            max_total_participants: Some(5),
            max_participants_per_day: Some(2),
            ..ParticipationCapConfig::unbounded()
        });
        let counts = ParticipationCounts {
            total_active: 5,
            today: 2,
            ..Default::default()
        };
        assert_eq!(reason(check_advisory(&m, &counts, Timestamp::new(0))), ReasonCode::CapacityReached);
        let counts = ParticipationCounts {
            total_active: 4,
            today: 2,
            ..Default::default()
        };
        assert_eq!(reason(check_advisory(&m, &counts, Timestamp::new(0))), ReasonCode::DailyLimitReached);
    }

    #[test]
    fn one_time_reports_already_completed() {
        let m = mission(ParticipationCapConfig {
            is_one_time_only: true,
            max_participations_per_user: Some(1),
            ..ParticipationCapConfig::unbounded()
        });
        let counts = ParticipationCounts {
            user_completed: 1,
            user_active: 1,
            total_active: 1,
            ..Default::default()
        };
        assert_eq!(check_advisory(&m, &counts, Timestamp::new(0)).reason, Some(Rejection::AlreadyCompleted));
        assert_eq!(check_commit(&m, &counts, Timestamp::new(0)).reason, Some(Rejection::AlreadyCompleted));
    }

    #[test]
    fn commit_counts_pending_against_per_user_limit() {
        let m = mission(ParticipationCapConfig {
            max_participations_per_user: Some(2),
            ..ParticipationCapConfig::unbounded()
        });
        let counts = ParticipationCounts {
            user_completed: 1,
            user_active: 2,
            total_active: 2,
            ..Default::default()
        };
        assert!(check_advisory(&m, &counts, Timestamp::new(0)).allowed);
        assert_eq!(
            reason(check_commit(&m, &counts, Timestamp::new(0))),
            ReasonCode::ParticipationLimitReached
        );
    }

    #[test]
    fn cooldown_reports_unlock_instant() {
        let m = mission(ParticipationCapConfig {
            cooldown_period_days: 7,
            ..ParticipationCapConfig::unbounded()
        });
        let last = Timestamp::new(1_000 * SECS_PER_DAY);
        let counts = ParticipationCounts {
            user_completed: 1,
            last_completion: Some(last),
            ..Default::default()
        };
        let check = check_advisory(&m, &counts, last.plus_secs(SECS_PER_DAY + 1));
        assert_eq!(
            check.reason,
            Some(Rejection::CooldownActive {
                unlock_at: last.plus_days(7),
                remaining_days: 6,
            })
        );
        assert!(check_advisory(&m, &counts, last.plus_days(7)).allowed);
    }

    #[test]
    fn entitlement_reports_remaining() {
        let m = mission(ParticipationCapConfig {
            max_total_participants: Some(10),
            max_participations_per_user: Some(3),
            ..ParticipationCapConfig::unbounded()
        });
        let counts = ParticipationCounts {
            total_active: 4,
            user_completed: 1,
            user_active: 1,
            ..Default::default()
        };
        let e = entitlement(&m, &counts, Timestamp::new(0));
        assert!(e.allowed);
        assert_eq!(e.remaining_total, Some(6));
        assert_eq!(e.remaining_today, None);
        assert_eq!(e.remaining_for_user, Some(2));
        assert_eq!(e.cooldown_until, None);
    }
}
