//! Bounded polling of an external review API.
//!
//! A fixed number of attempts at a fixed interval, with an explicit
//! cancellation channel. There is no open-ended retry: when the budget runs
//! out the caller falls back to asking for manual proof.

use crate::VerificationError;
use fluzio_types::EngineParams;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tokio::sync::watch;

/// What the external platform says about a review.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReviewStatus {
    Pending,
    Confirmed,
    Rejected,
}

pub type ProbeFuture<'a> =
    Pin<Box<dyn Future<Output = Result<ReviewStatus, VerificationError>> + Send + 'a>>;

/// A source of external confirmation, e.g. an HTTP review API.
pub trait ExternalProbe: Send + Sync {
    fn check<'a>(&'a self, reference: &'a str) -> ProbeFuture<'a>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PollBudget {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl PollBudget {
    pub fn from_params(params: &EngineParams) -> Self {
        Self {
            max_attempts: params.poll_max_attempts.max(1),
            interval: Duration::from_millis(params.poll_interval_ms),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PollOutcome {
    Confirmed { attempts: u32 },
    Rejected { attempts: u32 },
    TimedOut { attempts: u32 },
    /// A business decision or revocation arrived first.
    Cancelled,
}

/// Poll `probe` until it gives a definite answer, the budget runs out, or
/// `cancel` flips to `true`.
///
/// Probe errors count as an attempt that returned nothing.
pub async fn poll_until_confirmed(
    probe: &dyn ExternalProbe,
    reference: &str,
    budget: PollBudget,
    cancel: &mut watch::Receiver<bool>,
) -> PollOutcome {
    for attempt in 1..=budget.max_attempts {
        if *cancel.borrow() {
            return PollOutcome::Cancelled;
        }
        match probe.check(reference).await {
            Ok(ReviewStatus::Confirmed) => return PollOutcome::Confirmed { attempts: attempt },
            Ok(ReviewStatus::Rejected) => return PollOutcome::Rejected { attempts: attempt },
            Ok(ReviewStatus::Pending) => {
                tracing::debug!(reference, attempt, "external review still pending");
            }
            Err(e) => {
                tracing::warn!(reference, attempt, error = %e, "external review probe failed");
            }
        }
        if attempt == budget.max_attempts {
            break;
        }
        tokio::select! {
            _ = tokio::time::sleep(budget.interval) => {}
            changed = cancel.changed() => {
                if changed.is_err() {
                    // Sender gone: nobody can cancel any more.
                    tokio::time::sleep(budget.interval).await;
                }
            }
        }
    }
    if *cancel.borrow() {
        return PollOutcome::Cancelled;
    }
    PollOutcome::TimedOut {
        attempts: budget.max_attempts,
    }
}
