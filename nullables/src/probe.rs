//! Nullable review probe: scripted answers, recorded calls.

use fluzio_verification::{ExternalProbe, ProbeFuture, ReviewStatus, VerificationError};
use std::collections::VecDeque;
use std::sync::Mutex;

/// Answers come from a script in order; once it runs dry every call returns
/// the fallback (`Pending` unless changed).
pub struct NullProbe {
    script: Mutex<VecDeque<Result<ReviewStatus, String>>>,
    fallback: ReviewStatus,
    calls: Mutex<Vec<String>>,
}

impl NullProbe {
    pub fn new() -> Self {
        Self::answering(ReviewStatus::Pending)
    }

    /// A probe that always returns `status`.
    pub fn answering(status: ReviewStatus) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: status,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Queue an answer for the next unanswered call.
    pub fn then(self, status: ReviewStatus) -> Self {
        if let Ok(mut script) = self.script.lock() {
            script.push_back(Ok(status));
        }
        self
    }

    /// Queue a probe failure.
    pub fn then_fail(self, message: &str) -> Self {
        if let Ok(mut script) = self.script.lock() {
            script.push_back(Err(message.to_string()));
        }
        self
    }

    /// References passed to `check`, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl Default for NullProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl ExternalProbe for NullProbe {
    fn check<'a>(&'a self, reference: &'a str) -> ProbeFuture<'a> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(reference.to_string());
        }
        let next = self
            .script
            .lock()
            .ok()
            .and_then(|mut s| s.pop_front())
            .unwrap_or(Ok(self.fallback));
        Box::pin(async move { next.map_err(VerificationError::Probe) })
    }
}
