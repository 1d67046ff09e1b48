//! HTTP client for the external review platform.

use fluzio_verification::{ExternalProbe, ProbeFuture, ReviewStatus, VerificationError};
use serde::Deserialize;
use std::time::Duration;

use crate::config::ReviewApiConfig;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum WireStatus {
    Pending,
    Confirmed,
    Rejected,
}

#[derive(Debug, Deserialize)]
struct ReviewResponse {
    status: WireStatus,
}

/// Asks `GET {base_url}/reviews/{reference}` whether a review exists.
///
/// A 404 means the review has not shown up yet and counts as pending.
pub struct HttpReviewProbe {
    client: reqwest::Client,
    base_url: String,
}

impl HttpReviewProbe {
    pub fn new(config: &ReviewApiConfig) -> Result<Self, VerificationError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| VerificationError::Probe(e.to_string()))?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn url_for(&self, reference: &str) -> String {
        format!("{}/reviews/{}", self.base_url, reference)
    }

    async fn fetch(&self, reference: &str) -> Result<ReviewStatus, VerificationError> {
        let response = self
            .client
            .get(self.url_for(reference))
            .send()
            .await
            .map_err(|e| VerificationError::Probe(e.to_string()))?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(ReviewStatus::Pending);
        }
        let body: ReviewResponse = response
            .error_for_status()
            .map_err(|e| VerificationError::Probe(e.to_string()))?
            .json()
            .await
            .map_err(|e| VerificationError::Probe(e.to_string()))?;
        Ok(match body.status {
            WireStatus::Pending => ReviewStatus::Pending,
            WireStatus::Confirmed => ReviewStatus::Confirmed,
            WireStatus::Rejected => ReviewStatus::Rejected,
        })
    }
}

impl ExternalProbe for HttpReviewProbe {
    fn check<'a>(&'a self, reference: &'a str) -> ProbeFuture<'a> {
        Box::pin(self.fetch(reference))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_review_url_without_double_slash() {
        let probe = HttpReviewProbe::new(&ReviewApiConfig {
            base_url: "https://reviews.example.com/api/".into(),
            timeout_ms: 1_000,
        })
        .unwrap();
        assert_eq!(
            probe.url_for("gm-123"),
            "https://reviews.example.com/api/reviews/gm-123"
        );
    }

    #[tokio::test]
    async fn unreachable_api_is_a_probe_error() {
        let probe = HttpReviewProbe::new(&ReviewApiConfig {
            base_url: "http://127.0.0.1:9".into(),
            timeout_ms: 200,
        })
        .unwrap();
        assert!(matches!(
            probe.check("r1").await,
            Err(VerificationError::Probe(_))
        ));
    }
}
