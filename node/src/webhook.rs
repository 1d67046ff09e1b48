//! Webhook authentication and parsing.
//!
//! The signature covers the raw request body and is checked before a single
//! field is parsed. Routing the authenticated event to the reward ledger or
//! trust ledger happens in the engine.

use fluzio_crypto::SecretBook;
use fluzio_rewards::RevocationOutcome;
use fluzio_types::proof::{order_ref, BookingStatus, OrderStatus};
use fluzio_types::{EngineParams, ParticipationId, ReasonCode, Rejection, Timestamp, UserId};
use serde::{Deserialize, Serialize};

use crate::NodeError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WebhookEvent {
    Payment {
        order_id: String,
        status: OrderStatus,
        #[serde(default)]
        amount_cents: u64,
        timestamp: Timestamp,
    },
    Booking {
        booking_id: String,
        status: BookingStatus,
        timestamp: Timestamp,
    },
}

impl WebhookEvent {
    pub fn timestamp(&self) -> Timestamp {
        match self {
            Self::Payment { timestamp, .. } | Self::Booking { timestamp, .. } => *timestamp,
        }
    }

    /// Key of the participation this event refers to.
    pub fn reference(&self, provider: &str) -> String {
        match self {
            Self::Payment { order_id, .. } => order_ref(provider, order_id),
            Self::Booking { booking_id, .. } => order_ref(provider, booking_id),
        }
    }

    fn max_age_secs(&self, params: &EngineParams) -> u64 {
        match self {
            Self::Payment { .. } => params.payment_webhook_max_age_secs,
            Self::Booking { .. } => params.booking_webhook_max_age_secs,
        }
    }
}

/// What the engine did with an authenticated event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum WebhookAction {
    Revoked {
        participation_id: ParticipationId,
        outcome: RevocationOutcome,
    },
    HoldPlaced {
        participation_id: ParticipationId,
    },
    HoldLifted {
        participation_id: ParticipationId,
    },
    NoShowRecorded {
        user_id: UserId,
        blacklisted: bool,
    },
    /// No participation carries the event's reference.
    UnknownReference,
    /// Authenticated, nothing to do.
    Acknowledged,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct WebhookAck {
    pub provider: String,
    pub reference: String,
    #[serde(flatten)]
    pub action: WebhookAction,
}

/// Verify the HMAC over `body`, then parse and check staleness.
///
/// Timestamps too far in the future are refused like stale ones.
pub fn authenticate(
    secrets: &SecretBook,
    params: &EngineParams,
    provider: &str,
    body: &[u8],
    signature: &str,
    now: Timestamp,
) -> Result<WebhookEvent, NodeError> {
    if !secrets.has_provider(provider) {
        return Err(NodeError::UnknownProvider(provider.to_string()));
    }
    if !secrets.verify_provider(provider, body, signature) {
        return Err(Rejection::SignatureInvalid.into());
    }
    let event: WebhookEvent =
        serde_json::from_slice(body).map_err(|e| NodeError::Malformed(e.to_string()))?;
    if event.timestamp().abs_diff(now) > event.max_age_secs(params) {
        return Err(Rejection::VerificationFailed(ReasonCode::StaleWebhook).into());
    }
    Ok(event)
}
