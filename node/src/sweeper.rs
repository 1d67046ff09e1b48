//! Periodic unlock sweep.

use std::sync::Arc;
use std::time::Duration;

use fluzio_store::EngineStore;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::engine::ProofEngine;
use crate::shutdown::ShutdownSignal;

/// Run [`ProofEngine::sweep`] every `interval` until shutdown.
///
/// A failed sweep is logged and retried on the next tick; releases are
/// idempotent so an overlapping or repeated tick is harmless.
pub fn spawn_sweeper<S: EngineStore + 'static>(
    engine: Arc<ProofEngine<S>>,
    interval: Duration,
    mut shutdown: ShutdownSignal,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match engine.sweep() {
                        Ok(report) if !report.released.is_empty() => {
                            tracing::debug!(released = report.released.len(), "sweep tick");
                        }
                        Ok(_) => {}
                        Err(e) => tracing::warn!(error = %e, "unlock sweep failed"),
                    }
                    engine.cleanup_locks().await;
                }
                cause = shutdown.recv() => {
                    tracing::info!(%cause, "unlock sweeper stopped");
                    break;
                }
            }
        }
    })
}
