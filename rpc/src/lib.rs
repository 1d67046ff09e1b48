//! HTTP/JSON server for the Fluzio proof engine.
//!
//! Provides endpoints for:
//! - Proof submission
//! - Provider webhooks (payment and booking)
//! - Business decisions and revocation signals
//! - Entitlement, participation and review-queue queries
//! - Prometheus metrics

pub mod error;
pub mod handlers;
pub mod server;

pub use error::RpcError;
pub use server::{router, RpcServer};
