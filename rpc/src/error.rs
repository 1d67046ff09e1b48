//! RPC error types and their HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use fluzio_node::NodeError;
use fluzio_types::{ReasonCode, Rejection};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RpcError {
    #[error(transparent)]
    Node(#[from] NodeError),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("missing signature header")]
    MissingSignature,

    #[error("server error: {0}")]
    Server(String),
}

/// JSON body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
}

fn rejection_status(rejection: &Rejection) -> StatusCode {
    match rejection {
        Rejection::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        Rejection::CapacityExceeded(_)
        | Rejection::CooldownActive { .. }
        | Rejection::AlreadyCompleted => StatusCode::CONFLICT,
        Rejection::SignatureInvalid => StatusCode::UNAUTHORIZED,
        Rejection::Blacklisted => StatusCode::FORBIDDEN,
        Rejection::MissionInactive(ReasonCode::MissionNotFound) => StatusCode::NOT_FOUND,
        _ => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

impl RpcError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Node(e) => match e {
                NodeError::Rejected(r) => rejection_status(r),
                NodeError::MissionNotFound(_) | NodeError::ParticipationNotFound(_) => {
                    StatusCode::NOT_FOUND
                }
                NodeError::UnknownProvider(_) => StatusCode::NOT_FOUND,
                NodeError::WrongBusiness { .. } => StatusCode::FORBIDDEN,
                NodeError::InvalidState { .. } => StatusCode::CONFLICT,
                NodeError::Malformed(_) => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::MissingSignature => StatusCode::UNAUTHORIZED,
            Self::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable reason code, when the error carries one.
    pub fn reason(&self) -> Option<ReasonCode> {
        match self {
            Self::Node(NodeError::Rejected(r)) => Some(r.reason_code()),
            Self::Node(NodeError::MissionNotFound(_)) => Some(ReasonCode::MissionNotFound),
            _ => None,
        }
    }
}

impl IntoResponse for RpcError {
    fn into_response(self) -> Response {
        let status = self.status();
        // Internal detail stays in the log.
        let error = if status.is_server_error() {
            tracing::error!(error = %self, "internal error");
            "internal error".to_string()
        } else {
            tracing::debug!(error = %self, status = %status, "request refused");
            self.to_string()
        };
        let body = ErrorBody {
            error,
            reason: self.reason().map(|r| r.as_str()),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fluzio_types::{MissionId, ParticipationId, ParticipationStatus};

    #[test]
    fn rejections_map_by_kind() {
        let status = |r: Rejection| RpcError::from(NodeError::Rejected(r)).status();
        assert_eq!(status(Rejection::RateLimited), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(status(Rejection::AlreadyCompleted), StatusCode::CONFLICT);
        assert_eq!(status(Rejection::SignatureInvalid), StatusCode::UNAUTHORIZED);
        assert_eq!(status(Rejection::Blacklisted), StatusCode::FORBIDDEN);
        assert_eq!(
            status(Rejection::VerificationFailed(ReasonCode::ProofTypeMismatch)),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn lookup_and_state_errors() {
        let missing = RpcError::from(NodeError::MissionNotFound(MissionId::new("m")));
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
        assert_eq!(missing.reason(), Some(ReasonCode::MissionNotFound));

        let state = RpcError::from(NodeError::InvalidState {
            participation: ParticipationId::new(1),
            status: ParticipationStatus::Completed,
        });
        assert_eq!(state.status(), StatusCode::CONFLICT);
        assert_eq!(state.reason(), None);
    }

    #[test]
    fn store_failures_are_internal() {
        let err = RpcError::from(NodeError::Config("boom".into()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
