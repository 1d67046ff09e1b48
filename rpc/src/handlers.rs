//! RPC request handlers.
//!
//! Every handler is generic over the engine's store so the same router
//! serves the in-memory store in tests and in the daemon.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use fluzio_node::{
    BusinessDecision, ParticipationOutcome, ParticipationView, ProofEngine, ReviewAlert,
    ReviewItem, RevocationReport, SubmitProof, WebhookAck,
};
use fluzio_store::EngineStore;
use fluzio_types::{
    BusinessId, MissionId, ParticipationId, RevocationReason, UserBalance, UserId,
};

use crate::error::RpcError;

/// Header carrying the provider's hex HMAC over the raw webhook body.
pub const SIGNATURE_HEADER: &str = "x-fluzio-signature";

pub type EngineState<S> = State<Arc<ProofEngine<S>>>;

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, RpcError> {
    body.map(|Json(v)| v)
        .map_err(|e| RpcError::InvalidRequest(e.body_text()))
}

// ── Submission ───────────────────────────────────────────────────────────

pub async fn submit_proof<S: EngineStore + 'static>(
    State(engine): EngineState<S>,
    body: Result<Json<SubmitProof>, JsonRejection>,
) -> Result<Json<ParticipationOutcome>, RpcError> {
    let request = json_body(body)?;
    Ok(Json(engine.submit(request).await?))
}

// ── Webhooks ─────────────────────────────────────────────────────────────

pub async fn ingest_webhook<S: EngineStore + 'static>(
    State(engine): EngineState<S>,
    Path(provider): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookAck>, RpcError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or(RpcError::MissingSignature)?;
    Ok(Json(engine.ingest_webhook(&provider, &body, signature).await?))
}

// ── Business review ──────────────────────────────────────────────────────

pub async fn business_decision<S: EngineStore + 'static>(
    State(engine): EngineState<S>,
    Path(id): Path<u64>,
    body: Result<Json<BusinessDecision>, JsonRejection>,
) -> Result<Json<ParticipationOutcome>, RpcError> {
    let request = json_body(body)?;
    Ok(Json(
        engine
            .business_decision(ParticipationId::new(id), request)
            .await?,
    ))
}

#[derive(Debug, Deserialize, Serialize)]
pub struct RevocationRequest {
    pub reason: RevocationReason,
}

pub async fn revoke<S: EngineStore + 'static>(
    State(engine): EngineState<S>,
    Path(id): Path<u64>,
    body: Result<Json<RevocationRequest>, JsonRejection>,
) -> Result<Json<RevocationReport>, RpcError> {
    let request = json_body(body)?;
    Ok(Json(
        engine
            .revoke(ParticipationId::new(id), request.reason)
            .await?,
    ))
}

#[derive(Debug, Serialize)]
pub struct ReviewQueueResponse {
    pub business_id: BusinessId,
    pub items: Vec<ReviewItem>,
    pub alerts: Vec<ReviewAlert>,
}

pub async fn reviews<S: EngineStore + 'static>(
    State(engine): EngineState<S>,
    Path(business): Path<String>,
) -> Json<ReviewQueueResponse> {
    let business_id = BusinessId::new(&business);
    Json(ReviewQueueResponse {
        items: engine.reviews(&business_id),
        alerts: engine.alerts(&business_id),
        business_id,
    })
}

// ── Queries ──────────────────────────────────────────────────────────────

pub async fn entitlement<S: EngineStore + 'static>(
    State(engine): EngineState<S>,
    Path((mission, user)): Path<(String, String)>,
) -> Result<impl IntoResponse, RpcError> {
    let entitlement = engine.entitlement(&MissionId::new(&mission), &UserId::new(&user))?;
    Ok(Json(entitlement))
}

pub async fn participation<S: EngineStore + 'static>(
    State(engine): EngineState<S>,
    Path(id): Path<u64>,
) -> Result<Json<ParticipationView>, RpcError> {
    Ok(Json(engine.participation(ParticipationId::new(id))?))
}

#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub user_id: UserId,
    #[serde(flatten)]
    pub balance: UserBalance,
    pub trust_score: u8,
}

pub async fn balance<S: EngineStore + 'static>(
    State(engine): EngineState<S>,
    Path(user): Path<String>,
) -> Result<Json<BalanceResponse>, RpcError> {
    let user_id = UserId::new(&user);
    Ok(Json(BalanceResponse {
        balance: engine.balance(&user_id)?,
        trust_score: engine.trust_score(&user_id)?,
        user_id,
    }))
}

// ── Telemetry ────────────────────────────────────────────────────────────

pub async fn metrics<S: EngineStore + 'static>(
    State(engine): EngineState<S>,
) -> Result<impl IntoResponse, RpcError> {
    let text = engine
        .metrics()
        .encode()
        .map_err(|e| RpcError::Server(e.to_string()))?;
    Ok(([(CONTENT_TYPE, "text/plain; version=0.0.4")], text))
}

pub async fn health() -> &'static str {
    "ok"
}
