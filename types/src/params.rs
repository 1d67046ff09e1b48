//! Engine parameters: every numeric literal the verifiers, ledgers and
//! sweeper rely on, with the contract values as defaults.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ParamsError {
    /// A verifier, ledger or blacklist literal was changed from its fixed value.
    #[error("params.{0} is fixed and cannot be overridden")]
    Fixed(&'static str),

    #[error("params.{field}: {problem}")]
    OutOfRange {
        field: &'static str,
        problem: &'static str,
    },
}

/// All engine parameters.
///
/// Loaded from the `[params]` table of the engine config; any field left out
/// keeps its default. Only the operational knobs (velocity, reading count,
/// cluster and AI thresholds, rate limits, polling) may differ from the
/// defaults; see [`EngineParams::validate`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineParams {
    // ── QR ───────────────────────────────────────────────────────────────
    /// Age after which a QR code is expired. Default: 24 h.
    pub qr_max_age_secs: u64,

    /// Maximum distance between the scan and the business. Default: 100 m.
    pub qr_geofence_m: f64,

    /// Maximum reported GPS accuracy radius for any fix. Default: 50 m.
    pub max_gps_accuracy_m: f64,

    /// Maximum gap between the scan and its GPS fix. Default: 5 min.
    pub qr_gps_max_skew_secs: u64,

    /// Implied travel speed between two scans treated as anomalous. Default: 300 km/h.
    pub max_velocity_kmh: f64,

    // ── GPS dwell ────────────────────────────────────────────────────────
    /// Every reading must lie within this radius. Default: 100 m.
    pub gps_geofence_m: f64,

    /// The centroid of all readings must lie within this radius. Default: 50 m.
    pub gps_centroid_m: f64,

    pub gps_min_readings: usize,

    /// Allowed spacing between consecutive readings. Default: 30–60 s.
    pub gps_min_spacing_secs: u64,
    pub gps_max_spacing_secs: u64,

    // ── Booking ──────────────────────────────────────────────────────────
    /// Time after the scheduled slot within which the business must confirm.
    /// Default: 48 h.
    pub booking_confirmation_window_secs: u64,

    // ── Referral ─────────────────────────────────────────────────────────
    pub referral_conversion_window_days: u32,

    /// Clustering scores below this route the referral to review. Default: 90.
    pub referral_cluster_min_score: u8,

    // ── Media ────────────────────────────────────────────────────────────
    /// EXIF capture time older than this is suspicious. Default: 7 days.
    pub exif_max_age_days: u32,

    // ── AI and trust ─────────────────────────────────────────────────────
    /// AI confidence at or above which the wrapped verdict passes. Default: 90.
    pub ai_pass_threshold: u8,

    /// Trust scores below this add an inconclusive verdict. Default: 30.
    pub low_trust_threshold: u8,

    /// No-shows within `no_show_window_days` that trigger a blacklist.
    pub no_show_limit: u32,
    pub no_show_window_days: u32,
    pub blacklist_days: u32,

    /// Revocations after which suspension is recommended. Default: 3.
    pub suspension_revocation_threshold: u32,

    // ── Rate limits ──────────────────────────────────────────────────────
    /// Submissions per (user|device|ip, mission, day). Default: 20.
    pub max_submissions_per_key_per_day: u32,

    // ── Webhooks ─────────────────────────────────────────────────────────
    /// Payment webhooks older than this are stale. Default: 5 min.
    pub payment_webhook_max_age_secs: u64,

    /// Booking webhooks older than this are stale. Default: 24 h.
    pub booking_webhook_max_age_secs: u64,

    /// A submitted payment proof whose provider timestamp is further than
    /// this from now is stale. Default: 30 days.
    pub payment_proof_max_age_days: u32,

    // ── Lock delays (days) ───────────────────────────────────────────────
    /// QR.
    pub delay_instant_days: u32,
    /// GPS dwell, media upload, booking.
    pub delay_short_days: u32,
    /// Payment, screenshot.
    pub delay_medium_days: u32,
    /// Referral, high-value, first purchase.
    pub delay_long_days: u32,

    // ── External review polling ──────────────────────────────────────────
    pub poll_max_attempts: u32,
    pub poll_interval_ms: u64,
}

impl Default for EngineParams {
    fn default() -> Self {
        Self {
            qr_max_age_secs: 24 * 3600,
            qr_geofence_m: 100.0,
            max_gps_accuracy_m: 50.0,
            qr_gps_max_skew_secs: 5 * 60,
            max_velocity_kmh: 300.0,

            gps_geofence_m: 100.0,
            gps_centroid_m: 50.0,
            gps_min_readings: 2,
            gps_min_spacing_secs: 30,
            gps_max_spacing_secs: 60,

            booking_confirmation_window_secs: 48 * 3600,

            referral_conversion_window_days: 30,
            referral_cluster_min_score: 90,

            exif_max_age_days: 7,

            ai_pass_threshold: 90,
            low_trust_threshold: 30,
            no_show_limit: 3,
            no_show_window_days: 30,
            blacklist_days: 30,
            suspension_revocation_threshold: 3,

            max_submissions_per_key_per_day: 20,

            payment_webhook_max_age_secs: 5 * 60,
            booking_webhook_max_age_secs: 24 * 3600,
            payment_proof_max_age_days: 30,

            delay_instant_days: 0,
            delay_short_days: 3,
            delay_medium_days: 7,
            delay_long_days: 14,

            poll_max_attempts: 10,
            poll_interval_ms: 3_000,
        }
    }
}

impl EngineParams {
    /// Refuse overrides of fixed literals and out-of-range operational values.
    pub fn validate(&self) -> Result<(), ParamsError> {
        let fixed = Self::default();
        let changed = [
            ("qr_max_age_secs", self.qr_max_age_secs != fixed.qr_max_age_secs),
            ("qr_geofence_m", self.qr_geofence_m != fixed.qr_geofence_m),
            ("max_gps_accuracy_m", self.max_gps_accuracy_m != fixed.max_gps_accuracy_m),
            ("qr_gps_max_skew_secs", self.qr_gps_max_skew_secs != fixed.qr_gps_max_skew_secs),
            ("gps_geofence_m", self.gps_geofence_m != fixed.gps_geofence_m),
            ("gps_centroid_m", self.gps_centroid_m != fixed.gps_centroid_m),
            ("gps_min_spacing_secs", self.gps_min_spacing_secs != fixed.gps_min_spacing_secs),
            ("gps_max_spacing_secs", self.gps_max_spacing_secs != fixed.gps_max_spacing_secs),
            (
                "booking_confirmation_window_secs",
                self.booking_confirmation_window_secs != fixed.booking_confirmation_window_secs,
            ),
            (
                "referral_conversion_window_days",
                self.referral_conversion_window_days != fixed.referral_conversion_window_days,
            ),
            ("no_show_limit", self.no_show_limit != fixed.no_show_limit),
            ("no_show_window_days", self.no_show_window_days != fixed.no_show_window_days),
            ("blacklist_days", self.blacklist_days != fixed.blacklist_days),
            (
                "suspension_revocation_threshold",
                self.suspension_revocation_threshold != fixed.suspension_revocation_threshold,
            ),
            (
                "payment_webhook_max_age_secs",
                self.payment_webhook_max_age_secs != fixed.payment_webhook_max_age_secs,
            ),
            ("delay_instant_days", self.delay_instant_days != fixed.delay_instant_days),
            ("delay_short_days", self.delay_short_days != fixed.delay_short_days),
            ("delay_medium_days", self.delay_medium_days != fixed.delay_medium_days),
            ("delay_long_days", self.delay_long_days != fixed.delay_long_days),
        ];
        if let Some((field, _)) = changed.iter().find(|(_, changed)| *changed) {
            return Err(ParamsError::Fixed(field));
        }

        let out_of_range = |field, problem| Err(ParamsError::OutOfRange { field, problem });
        if self.gps_min_readings == 0 {
            return out_of_range("gps_min_readings", "must be at least 1");
        }
        if !(self.max_velocity_kmh.is_finite() && self.max_velocity_kmh > 0.0) {
            return out_of_range("max_velocity_kmh", "must be positive");
        }
        if self.referral_cluster_min_score > 100 {
            return out_of_range("referral_cluster_min_score", "must be at most 100");
        }
        if self.ai_pass_threshold > 100 {
            return out_of_range("ai_pass_threshold", "must be at most 100");
        }
        if self.low_trust_threshold > 100 {
            return out_of_range("low_trust_threshold", "must be at most 100");
        }
        if self.max_submissions_per_key_per_day == 0 {
            return out_of_range("max_submissions_per_key_per_day", "must be at least 1");
        }
        if self.payment_proof_max_age_days == 0 {
            return out_of_range("payment_proof_max_age_days", "must be at least 1");
        }
        if self.poll_max_attempts == 0 {
            return out_of_range("poll_max_attempts", "must be at least 1");
        }
        Ok(())
    }
}
