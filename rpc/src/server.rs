//! Axum-based RPC server.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use fluzio_node::{ProofEngine, ShutdownSignal};
use fluzio_store::EngineStore;
use tower_http::trace::TraceLayer;

use crate::error::RpcError;
use crate::handlers;

/// Every route the engine serves, with the engine as shared state.
pub fn router<S: EngineStore + 'static>(engine: Arc<ProofEngine<S>>, enable_metrics: bool) -> Router {
    let mut app = Router::new()
        .route("/health", get(handlers::health))
        .route("/v1/proofs", post(handlers::submit_proof::<S>))
        .route("/v1/webhooks/:provider", post(handlers::ingest_webhook::<S>))
        .route("/v1/participations/:id", get(handlers::participation::<S>))
        .route(
            "/v1/participations/:id/decision",
            post(handlers::business_decision::<S>),
        )
        .route(
            "/v1/participations/:id/revocation",
            post(handlers::revoke::<S>),
        )
        .route(
            "/v1/missions/:mission/entitlements/:user",
            get(handlers::entitlement::<S>),
        )
        .route("/v1/businesses/:business/reviews", get(handlers::reviews::<S>))
        .route("/v1/users/:user/balance", get(handlers::balance::<S>));
    if enable_metrics {
        app = app.route("/metrics", get(handlers::metrics::<S>));
    }
    app.layer(TraceLayer::new_for_http()).with_state(engine)
}

pub struct RpcServer {
    pub port: u16,
    pub enable_metrics: bool,
}

impl RpcServer {
    pub fn new(port: u16, enable_metrics: bool) -> Self {
        Self {
            port,
            enable_metrics,
        }
    }

    /// Bind and serve until `shutdown` fires.
    pub async fn serve<S: EngineStore + 'static>(
        &self,
        engine: Arc<ProofEngine<S>>,
        mut shutdown: ShutdownSignal,
    ) -> Result<(), RpcError> {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| RpcError::Server(format!("bind {addr}: {e}")))?;
        tracing::info!(%addr, metrics = self.enable_metrics, "RPC server listening");
        axum::serve(listener, router(engine, self.enable_metrics))
            .with_graceful_shutdown(async move {
                let cause = shutdown.recv().await;
                tracing::info!(%cause, "RPC server shutting down");
            })
            .await
            .map_err(|e| RpcError::Server(e.to_string()))
    }
}
