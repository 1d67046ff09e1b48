//! Daemon shutdown.
//!
//! One [`ShutdownController`] is shared by the daemon's subsystems: the
//! unlock sweeper and the RPC server each hold a [`ShutdownSignal`], and the
//! snapshot writer runs once both have stopped. Shutdown is triggered by
//! SIGINT/SIGTERM or by a subsystem that failed on its own (e.g. the RPC
//! port could not be bound).

use std::fmt;
use std::sync::Arc;

use tokio::signal;
use tokio::sync::watch;

/// Why the daemon is stopping. The first cause recorded wins.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShutdownCause {
    Interrupt,
    Terminate,
    /// Triggered from code, e.g. by a test.
    Requested,
    /// The named subsystem stopped unexpectedly.
    Fault(&'static str),
}

impl fmt::Display for ShutdownCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Interrupt => f.write_str("SIGINT"),
            Self::Terminate => f.write_str("SIGTERM"),
            Self::Requested => f.write_str("requested"),
            Self::Fault(subsystem) => write!(f, "{subsystem} failed"),
        }
    }
}

#[derive(Clone)]
pub struct ShutdownController {
    tx: Arc<watch::Sender<Option<ShutdownCause>>>,
}

/// A subsystem's view of the controller.
///
/// Unlike a broadcast receiver, a signal taken after shutdown was
/// triggered still resolves.
pub struct ShutdownSignal {
    rx: watch::Receiver<Option<ShutdownCause>>,
}

impl ShutdownSignal {
    /// Resolve once shutdown is triggered. A dropped controller counts as
    /// a request to stop.
    pub async fn recv(&mut self) -> ShutdownCause {
        match self.rx.wait_for(Option::is_some).await {
            Ok(cause) => (*cause).unwrap_or(ShutdownCause::Requested),
            Err(_) => ShutdownCause::Requested,
        }
    }
}

impl ShutdownController {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    pub fn subscribe(&self) -> ShutdownSignal {
        ShutdownSignal {
            rx: self.tx.subscribe(),
        }
    }

    /// Record `cause` and wake every subsystem. Later causes are ignored.
    pub fn shutdown(&self, cause: ShutdownCause) {
        let first = self.tx.send_if_modified(|current| {
            if current.is_some() {
                return false;
            }
            *current = Some(cause);
            true
        });
        if first {
            tracing::info!(%cause, "stopping sweeper and RPC server");
        }
    }

    pub fn cause(&self) -> Option<ShutdownCause> {
        *self.tx.borrow()
    }

    /// Wait for SIGINT, SIGTERM or an internal fault, trigger shutdown and
    /// return the cause that won.
    pub async fn wait_for_signal(&self) -> ShutdownCause {
        #[cfg(unix)]
        let terminate = async {
            match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                Ok(mut sig) => {
                    sig.recv().await;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "SIGTERM handler unavailable; waiting for SIGINT only");
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        let mut internal = self.subscribe();
        let cause = tokio::select! {
            _ = signal::ctrl_c() => ShutdownCause::Interrupt,
            _ = terminate => ShutdownCause::Terminate,
            cause = internal.recv() => cause,
        };
        self.shutdown(cause);
        self.cause().unwrap_or(cause)
    }
}

impl Default for ShutdownController {
    fn default() -> Self {
        Self::new()
    }
}
