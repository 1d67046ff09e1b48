//! Trust records and the read-only trust context handed to verifiers.

use crate::geo::GeoPoint;
use crate::ids::{DeviceId, IpAddress, UserId};
use crate::time::{Timestamp, SECS_PER_DAY};
use serde::{Deserialize, Serialize};

/// Where and when a user last scanned a QR code.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScanRecord {
    pub location: GeoPoint,
    pub at: Timestamp,
}

/// The contributing factors of a trust score.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustFactors {
    pub account_age_days: u32,
    /// Completions / decided participations, in basis points.
    pub completion_rate_bps: u32,
    /// Rejections / decided participations, in basis points.
    pub rejection_rate_bps: u32,
    pub fraud_flag_count: u32,
    pub business_report_count: u32,
}

/// Per-user trust state. Written only through the trust ledger.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrustRecord {
    pub user_id: UserId,
    pub first_seen: Timestamp,
    #[serde(default)]
    pub submissions: u32,
    #[serde(default)]
    pub completions: u32,
    #[serde(default)]
    pub rejections: u32,
    #[serde(default)]
    pub fraud_flag_count: u32,
    #[serde(default)]
    pub business_report_count: u32,
    #[serde(default)]
    pub revocation_count: u32,
    /// Booking no-shows, oldest first.
    #[serde(default)]
    pub no_shows: Vec<Timestamp>,
    #[serde(default)]
    pub blacklisted_until: Option<Timestamp>,
    #[serde(default)]
    pub suspended: bool,
    #[serde(default)]
    pub known_devices: Vec<DeviceId>,
    #[serde(default)]
    pub last_scan: Option<ScanRecord>,
}

impl TrustRecord {
    pub fn new(user_id: UserId, now: Timestamp) -> Self {
        Self {
            user_id,
            first_seen: now,
            submissions: 0,
            completions: 0,
            rejections: 0,
            fraud_flag_count: 0,
            business_report_count: 0,
            revocation_count: 0,
            no_shows: Vec::new(),
            blacklisted_until: None,
            suspended: false,
            known_devices: Vec::new(),
            last_scan: None,
        }
    }

    pub fn factors(&self, now: Timestamp) -> TrustFactors {
        let decided = self.completions + self.rejections;
        let rate = |n: u32| {
            if decided == 0 {
                0
            } else {
                (n as u64 * 10_000 / decided as u64) as u32
            }
        };
        TrustFactors {
            account_age_days: (self.first_seen.elapsed_since(now) / SECS_PER_DAY) as u32,
            completion_rate_bps: rate(self.completions),
            rejection_rate_bps: rate(self.rejections),
            fraud_flag_count: self.fraud_flag_count,
            business_report_count: self.business_report_count,
        }
    }

    /// Rolling 0–100 reputation derived from the factors.
    pub fn score(&self, now: Timestamp) -> u8 {
        let f = self.factors(now);
        let mut score: i64 = 50;
        score += (f.account_age_days as i64 / 10).min(20);
        score += f.completion_rate_bps as i64 * 20 / 10_000;
        score -= f.rejection_rate_bps as i64 * 30 / 10_000;
        score -= f.fraud_flag_count as i64 * 15;
        score -= f.business_report_count as i64 * 10;
        score.clamp(0, 100) as u8
    }

    /// Suspended, or inside a blacklist window.
    pub fn is_blocked(&self, now: Timestamp) -> bool {
        self.suspended || self.blacklisted_until.is_some_and(|until| now < until)
    }
}

/// Read-only snapshot of a user's standing, given to every verifier.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrustContext {
    pub user_id: UserId,
    pub score: u8,
    pub factors: TrustFactors,
    pub completed_count: u32,
    pub known_devices: Vec<DeviceId>,
    pub last_scan: Option<ScanRecord>,
    /// Highest submission count today across the user/device/IP windows.
    pub submissions_today: u32,
}

impl TrustContext {
    pub fn is_first_time_user(&self) -> bool {
        self.completed_count == 0
    }
}

/// Partition key for rate-limit windows.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum RateLimitKey {
    User(UserId),
    Device(DeviceId),
    Ip(IpAddress),
}

impl RateLimitKey {
    pub fn as_key(&self) -> String {
        match self {
            Self::User(u) => format!("user:{u}"),
            Self::Device(d) => format!("device:{d}"),
            Self::Ip(ip) => format!("ip:{ip}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_user_scores_fifty() {
        let r = TrustRecord::new(UserId::new("u"), Timestamp::new(0));
        assert_eq!(r.score(Timestamp::new(0)), 50);
    }

    #[test]
    fn fraud_flags_drag_score_down() {
        let mut r = TrustRecord::new(UserId::new("u"), Timestamp::new(0));
        r.fraud_flag_count = 2;
        assert_eq!(r.score(Timestamp::new(0)), 20);
        r.fraud_flag_count = 10;
        assert_eq!(r.score(Timestamp::new(0)), 0);
    }

    #[test]
    fn history_and_age_raise_score() {
        let mut r = TrustRecord::new(UserId::new("u"), Timestamp::new(0));
        r.completions = 9;
        r.rejections = 1;
        // 50 + 20 (age cap) + 18 - 3
        assert_eq!(r.score(Timestamp::new(400 * SECS_PER_DAY)), 85);
    }

    #[test]
    fn blacklist_expires() {
        let mut r = TrustRecord::new(UserId::new("u"), Timestamp::new(0));
        r.blacklisted_until = Some(Timestamp::new(100));
        assert!(r.is_blocked(Timestamp::new(99)));
        assert!(!r.is_blocked(Timestamp::new(100)));
    }
}
