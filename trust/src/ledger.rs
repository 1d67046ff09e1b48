use crate::TrustError;
use fluzio_store::{RateLimitStore, TrustStore};
use fluzio_types::{
    EngineParams, MissionId, RateLimitKey, ScanRecord, SubmitterIdentity, Timestamp, TrustContext,
    TrustRecord, UserId, SECS_PER_DAY,
};
use std::sync::Arc;

/// Per-user trust state plus per-key submission windows.
pub struct TrustLedger<S> {
    store: Arc<S>,
    params: EngineParams,
}

impl<S: TrustStore + RateLimitStore> TrustLedger<S> {
    pub fn new(store: Arc<S>, params: EngineParams) -> Self {
        Self { store, params }
    }

    /// The user's record, or a fresh one first seen at `now` (not persisted).
    pub fn record(&self, user: &UserId, now: Timestamp) -> Result<TrustRecord, TrustError> {
        Ok(self
            .store
            .get_trust(user)?
            .unwrap_or_else(|| TrustRecord::new(user.clone(), now)))
    }

    pub fn score(&self, user: &UserId, now: Timestamp) -> Result<u8, TrustError> {
        Ok(self.record(user, now)?.score(now))
    }

    /// Refuse suspended or blacklisted users.
    pub fn check_standing(&self, user: &UserId, now: Timestamp) -> Result<(), TrustError> {
        let record = self.record(user, now)?;
        if record.suspended {
            return Err(TrustError::Blocked {
                user: user.clone(),
                until: Timestamp::MAX,
            });
        }
        match record.blacklisted_until {
            Some(until) if now < until => Err(TrustError::Blocked {
                user: user.clone(),
                until,
            }),
            _ => Ok(()),
        }
    }

    fn keys(identity: &SubmitterIdentity) -> [RateLimitKey; 3] {
        [
            RateLimitKey::User(identity.user_id.clone()),
            RateLimitKey::Device(identity.device_id.clone()),
            RateLimitKey::Ip(identity.ip.clone()),
        ]
    }

    /// Count this submission in every window and refuse it if any window
    /// is over the daily limit.
    ///
    /// The attempt is counted even when refused, so hammering a mission
    /// keeps the key limited.
    pub fn admit_submission(
        &self,
        identity: &SubmitterIdentity,
        mission: &MissionId,
        now: Timestamp,
    ) -> Result<u32, TrustError> {
        let day = now.day_index();
        let mut worst: Option<(String, u32)> = None;
        for key in Self::keys(identity) {
            let count = self.store.increment_window(&key, mission, day)?;
            if worst.as_ref().map_or(true, |(_, c)| count > *c) {
                worst = Some((key.as_key(), count));
            }
        }
        let (key, count) = worst.unwrap_or_default();
        if count > self.params.max_submissions_per_key_per_day {
            tracing::warn!(key = %key, mission = %mission, count, "rate limit exceeded");
            return Err(TrustError::RateLimited { key, count });
        }
        Ok(count)
    }

    /// Read-only snapshot handed to verifiers.
    pub fn context(
        &self,
        identity: &SubmitterIdentity,
        mission: &MissionId,
        now: Timestamp,
    ) -> Result<TrustContext, TrustError> {
        let record = self.record(&identity.user_id, now)?;
        let day = now.day_index();
        let mut submissions_today = 0;
        for key in Self::keys(identity) {
            submissions_today = submissions_today.max(self.store.window_count(&key, mission, day)?);
        }
        Ok(TrustContext {
            user_id: identity.user_id.clone(),
            score: record.score(now),
            factors: record.factors(now),
            completed_count: record.completions,
            known_devices: record.known_devices.clone(),
            last_scan: record.last_scan,
            submissions_today,
        })
    }

    fn update(
        &self,
        user: &UserId,
        now: Timestamp,
        mut f: impl FnMut(&mut TrustRecord),
    ) -> Result<TrustRecord, TrustError> {
        Ok(self.store.update_trust(user, now, &mut f)?)
    }

    /// Count a committed submission and remember the device.
    pub fn record_submission(
        &self,
        identity: &SubmitterIdentity,
        now: Timestamp,
    ) -> Result<(), TrustError> {
        self.update(&identity.user_id, now, |r| {
            r.submissions = r.submissions.saturating_add(1);
            if !r.known_devices.contains(&identity.device_id) {
                r.known_devices.push(identity.device_id.clone());
            }
        })?;
        Ok(())
    }

    pub fn record_scan(&self, user: &UserId, scan: ScanRecord, now: Timestamp) -> Result<(), TrustError> {
        self.update(user, now, |r| r.last_scan = Some(scan))?;
        Ok(())
    }

    pub fn record_completion(&self, user: &UserId, now: Timestamp) -> Result<(), TrustError> {
        let record = self.update(user, now, |r| r.completions = r.completions.saturating_add(1))?;
        tracing::debug!(user = %user, score = record.score(now), "trust: completion");
        Ok(())
    }

    pub fn record_rejection(&self, user: &UserId, now: Timestamp) -> Result<(), TrustError> {
        let record = self.update(user, now, |r| r.rejections = r.rejections.saturating_add(1))?;
        tracing::debug!(user = %user, score = record.score(now), "trust: rejection");
        Ok(())
    }

    /// Record a booking no-show. Returns `true` when this no-show triggered
    /// a blacklist.
    pub fn record_no_show(&self, user: &UserId, now: Timestamp) -> Result<bool, TrustError> {
        let window = self.params.no_show_window_days as u64 * SECS_PER_DAY;
        let limit = self.params.no_show_limit as usize;
        let blacklist_days = self.params.blacklist_days;
        let mut triggered = false;
        self.update(user, now, |r| {
            r.no_shows.retain(|at| at.elapsed_since(now) < window);
            r.no_shows.push(now);
            if r.no_shows.len() >= limit {
                let until = now.plus_days(blacklist_days);
                if r.blacklisted_until.map_or(true, |cur| cur < until) {
                    r.blacklisted_until = Some(until);
                }
                triggered = true;
            }
        })?;
        if triggered {
            tracing::warn!(user = %user, days = blacklist_days, "no-show limit reached, user blacklisted");
        }
        Ok(triggered)
    }

    pub fn record_business_report(&self, user: &UserId, now: Timestamp) -> Result<(), TrustError> {
        self.update(user, now, |r| {
            r.business_report_count = r.business_report_count.saturating_add(1)
        })?;
        Ok(())
    }

    /// Flag the user for a revoked reward. Returns the total revocations.
    pub fn record_revocation(&self, user: &UserId, now: Timestamp) -> Result<u32, TrustError> {
        let record = self.update(user, now, |r| {
            r.fraud_flag_count = r.fraud_flag_count.saturating_add(1);
            r.revocation_count = r.revocation_count.saturating_add(1);
        })?;
        tracing::info!(
            user = %user,
            revocations = record.revocation_count,
            score = record.score(now),
            "trust: revocation flagged"
        );
        Ok(record.revocation_count)
    }

    /// A business reported fraud: report, fraud flag, suspension and blacklist.
    pub fn record_fraud_report(&self, user: &UserId, now: Timestamp) -> Result<(), TrustError> {
        let until = now.plus_days(self.params.blacklist_days);
        self.update(user, now, |r| {
            r.business_report_count = r.business_report_count.saturating_add(1);
            r.fraud_flag_count = r.fraud_flag_count.saturating_add(1);
            r.suspended = true;
            r.blacklisted_until = Some(until);
        })?;
        tracing::warn!(user = %user, "fraud reported, user suspended");
        Ok(())
    }

    pub fn suspend(&self, user: &UserId, now: Timestamp) -> Result<(), TrustError> {
        self.update(user, now, |r| r.suspended = true)?;
        tracing::warn!(user = %user, "user suspended");
        Ok(())
    }
}
