//! Stable reason codes.
//!
//! Every verdict, rejection, and revocation carries one of these codes so
//! downstream consumers can present consistent messaging. The wire form is
//! SCREAMING_SNAKE_CASE and must never change for an existing code.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReasonCode {
    Verified,
    AutoApproved,
    MissionNotFound,
    MissionInactive,
    MissionEnded,
    ProofTypeMismatch,
    CapacityReached,
    DailyLimitReached,
    AlreadyCompleted,
    ParticipationLimitReached,
    CooldownActive,
    RateLimited,
    UserBlacklisted,
    SignatureInvalid,
    QrExpired,
    QrMismatch,
    GeofenceViolation,
    GpsAccuracyInsufficient,
    TimestampSkew,
    VelocityAnomaly,
    DeviceFingerprintAnomaly,
    InsufficientReadings,
    CentroidOutsideGeofence,
    InsufficientDwell,
    IrregularReadingSpacing,
    SensorDataMissing,
    MockLocationDetected,
    OrderNotPaid,
    AmountBelowMinimum,
    CustomerMismatch,
    DuplicateProof,
    StaleWebhook,
    WrongBusiness,
    BookingNotScheduled,
    BookingNoShow,
    BookingCancelled,
    BookingNotCompleted,
    AwaitingBusinessConfirmation,
    ConfirmationWindowElapsed,
    SelfReferral,
    ReferredUserNotNew,
    ConversionWindowExpired,
    UnsupportedConversion,
    ReferralClusterRisk,
    HistoryUnavailable,
    MissingExif,
    StaleExif,
    StockImageDetected,
    AiGeneratedDetected,
    AiConfidenceHigh,
    AiConfidenceModerate,
    AiConfidenceLow,
    LowTrustScore,
    ExternalReviewFound,
    ExternalReviewRejected,
    TimedOut,
    InsufficientConfidence,
    ManualReviewRequired,
    HighValueReview,
    BusinessApproved,
    BusinessRejected,
    FraudReported,
    Refund,
    Chargeback,
    ContentDeleted,
    FraudDetected,
    Revoked,
}

impl ReasonCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Verified => "VERIFIED",
            Self::AutoApproved => "AUTO_APPROVED",
            Self::MissionNotFound => "MISSION_NOT_FOUND",
            Self::MissionInactive => "MISSION_INACTIVE",
            Self::MissionEnded => "MISSION_ENDED",
            Self::ProofTypeMismatch => "PROOF_TYPE_MISMATCH",
            Self::CapacityReached => "CAPACITY_REACHED",
            Self::DailyLimitReached => "DAILY_LIMIT_REACHED",
            Self::AlreadyCompleted => "ALREADY_COMPLETED",
            Self::ParticipationLimitReached => "PARTICIPATION_LIMIT_REACHED",
            Self::CooldownActive => "COOLDOWN_ACTIVE",
            Self::RateLimited => "RATE_LIMITED",
            Self::UserBlacklisted => "USER_BLACKLISTED",
            Self::SignatureInvalid => "SIGNATURE_INVALID",
            Self::QrExpired => "QR_EXPIRED",
            Self::QrMismatch => "QR_MISMATCH",
            Self::GeofenceViolation => "GEOFENCE_VIOLATION",
            Self::GpsAccuracyInsufficient => "GPS_ACCURACY_INSUFFICIENT",
            Self::TimestampSkew => "TIMESTAMP_SKEW",
            Self::VelocityAnomaly => "VELOCITY_ANOMALY",
            Self::DeviceFingerprintAnomaly => "DEVICE_FINGERPRINT_ANOMALY",
            Self::InsufficientReadings => "INSUFFICIENT_READINGS",
            Self::CentroidOutsideGeofence => "CENTROID_OUTSIDE_GEOFENCE",
            Self::InsufficientDwell => "INSUFFICIENT_DWELL",
            Self::IrregularReadingSpacing => "IRREGULAR_READING_SPACING",
            Self::SensorDataMissing => "SENSOR_DATA_MISSING",
            Self::MockLocationDetected => "MOCK_LOCATION_DETECTED",
            Self::OrderNotPaid => "ORDER_NOT_PAID",
            Self::AmountBelowMinimum => "AMOUNT_BELOW_MINIMUM",
            Self::CustomerMismatch => "CUSTOMER_MISMATCH",
            Self::DuplicateProof => "DUPLICATE_PROOF",
            Self::StaleWebhook => "STALE_WEBHOOK",
            Self::WrongBusiness => "WRONG_BUSINESS",
            Self::BookingNotScheduled => "BOOKING_NOT_SCHEDULED",
            Self::BookingNoShow => "BOOKING_NO_SHOW",
            Self::BookingCancelled => "BOOKING_CANCELLED",
            Self::BookingNotCompleted => "BOOKING_NOT_COMPLETED",
            Self::AwaitingBusinessConfirmation => "AWAITING_BUSINESS_CONFIRMATION",
            Self::ConfirmationWindowElapsed => "CONFIRMATION_WINDOW_ELAPSED",
            Self::SelfReferral => "SELF_REFERRAL",
            Self::ReferredUserNotNew => "REFERRED_USER_NOT_NEW",
            Self::ConversionWindowExpired => "CONVERSION_WINDOW_EXPIRED",
            Self::UnsupportedConversion => "UNSUPPORTED_CONVERSION",
            Self::ReferralClusterRisk => "REFERRAL_CLUSTER_RISK",
            Self::HistoryUnavailable => "HISTORY_UNAVAILABLE",
            Self::MissingExif => "MISSING_EXIF",
            Self::StaleExif => "STALE_EXIF",
            Self::StockImageDetected => "STOCK_IMAGE_DETECTED",
            Self::AiGeneratedDetected => "AI_GENERATED_DETECTED",
            Self::AiConfidenceHigh => "AI_CONFIDENCE_HIGH",
            Self::AiConfidenceModerate => "AI_CONFIDENCE_MODERATE",
            Self::AiConfidenceLow => "AI_CONFIDENCE_LOW",
            Self::LowTrustScore => "LOW_TRUST_SCORE",
            Self::ExternalReviewFound => "EXTERNAL_REVIEW_FOUND",
            Self::ExternalReviewRejected => "EXTERNAL_REVIEW_REJECTED",
            Self::TimedOut => "TIMED_OUT",
            Self::InsufficientConfidence => "INSUFFICIENT_CONFIDENCE",
            Self::ManualReviewRequired => "MANUAL_REVIEW_REQUIRED",
            Self::HighValueReview => "HIGH_VALUE_REVIEW",
            Self::BusinessApproved => "BUSINESS_APPROVED",
            Self::BusinessRejected => "BUSINESS_REJECTED",
            Self::FraudReported => "FRAUD_REPORTED",
            Self::Refund => "REFUND",
            Self::Chargeback => "CHARGEBACK",
            Self::ContentDeleted => "CONTENT_DELETED",
            Self::FraudDetected => "FRAUD_DETECTED",
            Self::Revoked => "REVOKED",
        }
    }
}

impl fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_form_matches_as_str() {
        for code in [
            ReasonCode::GeofenceViolation,
            ReasonCode::AmountBelowMinimum,
            ReasonCode::SelfReferral,
            ReasonCode::AiConfidenceHigh,
        ] {
            let json = serde_json::to_string(&code).unwrap();
            assert_eq!(json, format!("\"{}\"", code.as_str()));
        }
    }
}
