//! Proof payloads: a tagged union with one variant per proof type.
//!
//! The `type` discriminant selects the verifier; each payload struct carries
//! exactly the evidence that verifier needs.

use crate::geo::GeoPoint;
use crate::ids::{BusinessId, DeviceId, IpAddress, MissionId, UserId};
use crate::time::Timestamp;
use crate::verdict::AiConfidenceScore;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of evidence a mission accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProofType {
    Qr,
    GpsDwell,
    PaymentWebhook,
    BookingWebhook,
    Referral,
    Screenshot,
    MediaUpload,
}

impl ProofType {
    pub const ALL: [ProofType; 7] = [
        ProofType::Qr,
        ProofType::GpsDwell,
        ProofType::PaymentWebhook,
        ProofType::BookingWebhook,
        ProofType::Referral,
        ProofType::Screenshot,
        ProofType::MediaUpload,
    ];

    /// Policy category used by the decision engine (before the first-time-user override).
    pub fn category(&self) -> ProofCategory {
        match self {
            Self::Qr => ProofCategory::Qr,
            Self::GpsDwell => ProofCategory::GpsDwell,
            Self::PaymentWebhook => ProofCategory::PaymentWebhook,
            Self::BookingWebhook => ProofCategory::BookingWebhook,
            Self::Referral => ProofCategory::Referral,
            Self::Screenshot => ProofCategory::Screenshot,
            Self::MediaUpload => ProofCategory::Media,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Qr => "qr",
            Self::GpsDwell => "gps_dwell",
            Self::PaymentWebhook => "payment_webhook",
            Self::BookingWebhook => "booking_webhook",
            Self::Referral => "referral",
            Self::Screenshot => "screenshot",
            Self::MediaUpload => "media_upload",
        }
    }
}

impl fmt::Display for ProofType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category a proof is judged under by the decision policy table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProofCategory {
    Qr,
    GpsDwell,
    PaymentWebhook,
    BookingWebhook,
    Referral,
    Screenshot,
    Media,
    /// Any proof from a user with no completed participation yet.
    FirstTimeUser,
}

// ── QR ───────────────────────────────────────────────────────────────────

/// The content encoded in a business's QR code.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QrCode {
    pub business_id: BusinessId,
    pub mission_id: MissionId,
    pub issued_at: Timestamp,
    pub nonce: String,
}

impl QrCode {
    /// Canonical message covered by the QR's HMAC.
    pub fn signing_message(&self) -> String {
        format!(
            "{}|{}|{}|{}",
            self.business_id,
            self.mission_id,
            self.issued_at.as_secs(),
            self.nonce
        )
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QrProof {
    pub code: QrCode,
    /// Hex HMAC-SHA256 over [`QrCode::signing_message`].
    pub signature: String,
    pub scan_location: GeoPoint,
    pub gps_accuracy_m: f64,
    pub scanned_at: Timestamp,
    pub gps_fix_at: Timestamp,
}

// ── GPS dwell ────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GpsReading {
    pub location: GeoPoint,
    pub accuracy_m: f64,
    pub recorded_at: Timestamp,
    #[serde(default)]
    pub accelerometer: Option<[f64; 3]>,
    #[serde(default)]
    pub gyroscope: Option<[f64; 3]>,
    /// Set by the client OS when the fix came from a mock location provider.
    #[serde(default)]
    pub mock_location: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GpsDwellProof {
    pub readings: Vec<GpsReading>,
}

// ── Payment webhook ──────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Paid,
    Refunded,
    Chargeback,
    Disputed,
    Resolved,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Refunded => "refunded",
            Self::Chargeback => "chargeback",
            Self::Disputed => "disputed",
            Self::Resolved => "resolved",
            Self::Cancelled => "cancelled",
        }
    }
}

/// A signed order notification from a payment provider.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentProof {
    pub provider: String,
    pub order_id: String,
    pub status: OrderStatus,
    pub amount_cents: u64,
    /// The customer identity as resolved by the provider integration.
    pub customer_id: UserId,
    pub timestamp: Timestamp,
    /// Hex HMAC-SHA256 over [`PaymentProof::signing_message`] with the provider secret.
    pub signature: String,
    #[serde(default)]
    pub first_purchase: bool,
}

impl PaymentProof {
    /// Covers every field a verdict or lock delay depends on.
    pub fn signing_message(&self) -> String {
        format!(
            "{}|{}|{}|{}|{}|{}",
            self.order_id,
            self.status.as_str(),
            self.amount_cents,
            self.customer_id,
            self.timestamp.as_secs(),
            u8::from(self.first_purchase)
        )
    }
}

// ── Booking webhook ──────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Scheduled,
    Confirmed,
    Completed,
    NoShow,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Confirmed => "confirmed",
            Self::Completed => "completed",
            Self::NoShow => "no_show",
            Self::Cancelled => "cancelled",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingProof {
    pub provider: String,
    pub booking_id: String,
    pub business_id: BusinessId,
    pub customer_id: UserId,
    /// Status recorded when the booking was created.
    pub status_at_creation: BookingStatus,
    pub status: BookingStatus,
    pub created_at: Timestamp,
    pub scheduled_for: Timestamp,
    /// When the business confirmed the visit, if it has.
    #[serde(default)]
    pub business_confirmed_at: Option<Timestamp>,
    pub signature: String,
}

impl BookingProof {
    /// An unconfirmed booking signs an empty confirmation field.
    pub fn signing_message(&self) -> String {
        let confirmed = self
            .business_confirmed_at
            .map(|at| at.as_secs().to_string())
            .unwrap_or_default();
        format!(
            "{}|{}|{}|{}|{}|{}|{}|{}",
            self.booking_id,
            self.business_id,
            self.customer_id,
            self.status_at_creation.as_str(),
            self.status.as_str(),
            self.created_at.as_secs(),
            self.scheduled_for.as_secs(),
            confirmed
        )
    }
}

// ── Referral ─────────────────────────────────────────────────────────────

/// Identity facts about one side of a referral.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferralParty {
    pub user_id: UserId,
    pub device_id: DeviceId,
    pub ip: IpAddress,
    pub user_agent: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReferralProof {
    pub referrer: ReferralParty,
    pub referred: ReferralParty,
    pub clicked_at: Timestamp,
    pub converted_at: Timestamp,
    /// Evidence of the referred user's conversion, verified by its own verifier.
    pub conversion: Box<ProofPayload>,
    /// External fraud-farm / clustering model score (confidence the referral is organic).
    #[serde(default)]
    pub cluster_score: Option<AiConfidenceScore>,
}

// ── Screenshot / media ───────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExifInfo {
    #[serde(default)]
    pub captured_at: Option<Timestamp>,
    #[serde(default)]
    pub camera_model: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaProof {
    /// Hex content hash computed by the upload pipeline.
    pub content_hash: String,
    #[serde(default)]
    pub exif: Option<ExifInfo>,
    #[serde(default)]
    pub stock_image_detected: bool,
    #[serde(default)]
    pub ai_generated_detected: bool,
    /// Reference to a review on an external platform that can be polled.
    #[serde(default)]
    pub external_review_ref: Option<String>,
}

// ── Tagged union ─────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProofPayload {
    Qr(QrProof),
    GpsDwell(GpsDwellProof),
    PaymentWebhook(PaymentProof),
    BookingWebhook(BookingProof),
    Referral(ReferralProof),
    Screenshot(MediaProof),
    MediaUpload(MediaProof),
}

impl ProofPayload {
    pub fn proof_type(&self) -> ProofType {
        match self {
            Self::Qr(_) => ProofType::Qr,
            Self::GpsDwell(_) => ProofType::GpsDwell,
            Self::PaymentWebhook(_) => ProofType::PaymentWebhook,
            Self::BookingWebhook(_) => ProofType::BookingWebhook,
            Self::Referral(_) => ProofType::Referral,
            Self::Screenshot(_) => ProofType::Screenshot,
            Self::MediaUpload(_) => ProofType::MediaUpload,
        }
    }

    /// Provider-side reference that later webhooks use to find this proof.
    pub fn external_ref(&self) -> Option<String> {
        match self {
            Self::PaymentWebhook(p) => Some(order_ref(&p.provider, &p.order_id)),
            Self::BookingWebhook(b) => Some(order_ref(&b.provider, &b.booking_id)),
            Self::Referral(r) => r.conversion.external_ref(),
            _ => None,
        }
    }

    /// Whether this proof is a user's first purchase (longer lock).
    pub fn is_first_purchase(&self) -> bool {
        match self {
            Self::PaymentWebhook(p) => p.first_purchase,
            Self::Referral(r) => r.conversion.is_first_purchase(),
            _ => false,
        }
    }
}

/// Key under which provider-issued ids are indexed.
pub fn order_ref(provider: &str, id: &str) -> String {
    format!("{provider}:{id}")
}
