//! Prometheus metrics for the engine.
//!
//! [`EngineMetrics`] owns a dedicated [`Registry`] that the RPC `/metrics`
//! endpoint encodes into the text exposition format.

use prometheus::{
    register_int_counter_vec_with_registry, register_int_counter_with_registry,
    register_int_gauge_with_registry, Encoder, IntCounter, IntCounterVec, IntGauge, Opts,
    Registry, TextEncoder,
};

pub struct EngineMetrics {
    pub registry: Registry,

    // ── Counters ────────────────────────────────────────────────────────
    /// Proof submissions received, before any gate.
    pub submissions: IntCounter,
    /// Submissions refused at a gate, labelled by reason code.
    pub submission_rejections: IntCounterVec,
    /// Decisions, labelled by outcome.
    pub decisions: IntCounterVec,
    pub rewards_locked: IntCounter,
    pub rewards_released: IntCounter,
    pub rewards_revoked: IntCounter,
    /// Webhooks refused before routing (bad signature, stale, unknown provider).
    pub webhook_rejections: IntCounter,

    // ── Gauges ──────────────────────────────────────────────────────────
    /// Reward entries currently LOCKED.
    pub locked_rewards: IntGauge,
    /// Participations waiting for a business decision.
    pub review_queue_depth: IntGauge,
}

impl EngineMetrics {
    /// Create a fresh set of metrics registered under a new [`Registry`].
    ///
    /// # Panics
    ///
    /// Panics only if two metrics share a name, which is a programming error.
    pub fn new() -> Self {
        let registry = Registry::new();

        let submissions = register_int_counter_with_registry!(
            Opts::new("fluzio_submissions_total", "Proof submissions received"),
            registry
        )
        .expect("failed to register submissions counter");

        let submission_rejections = register_int_counter_vec_with_registry!(
            Opts::new(
                "fluzio_submission_rejections_total",
                "Submissions refused before verification"
            ),
            &["reason"],
            registry
        )
        .expect("failed to register submission_rejections counter");

        let decisions = register_int_counter_vec_with_registry!(
            Opts::new("fluzio_decisions_total", "Decisions by outcome"),
            &["outcome"],
            registry
        )
        .expect("failed to register decisions counter");

        let rewards_locked = register_int_counter_with_registry!(
            Opts::new("fluzio_rewards_locked_total", "Reward entries locked"),
            registry
        )
        .expect("failed to register rewards_locked counter");

        let rewards_released = register_int_counter_with_registry!(
            Opts::new("fluzio_rewards_released_total", "Reward entries released"),
            registry
        )
        .expect("failed to register rewards_released counter");

        let rewards_revoked = register_int_counter_with_registry!(
            Opts::new("fluzio_rewards_revoked_total", "Reward entries revoked"),
            registry
        )
        .expect("failed to register rewards_revoked counter");

        let webhook_rejections = register_int_counter_with_registry!(
            Opts::new(
                "fluzio_webhook_rejections_total",
                "Webhooks refused before routing"
            ),
            registry
        )
        .expect("failed to register webhook_rejections counter");

        let locked_rewards = register_int_gauge_with_registry!(
            Opts::new("fluzio_locked_rewards", "Reward entries currently locked"),
            registry
        )
        .expect("failed to register locked_rewards gauge");

        let review_queue_depth = register_int_gauge_with_registry!(
            Opts::new(
                "fluzio_review_queue_depth",
                "Participations awaiting a business decision"
            ),
            registry
        )
        .expect("failed to register review_queue_depth gauge");

        Self {
            registry,
            submissions,
            submission_rejections,
            decisions,
            rewards_locked,
            rewards_released,
            rewards_revoked,
            webhook_rejections,
            locked_rewards,
            review_queue_depth,
        }
    }

    /// Encode every metric in the Prometheus text exposition format.
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let mut buf = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buf)?;
        String::from_utf8(buf).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

impl Default for EngineMetrics {
    fn default() -> Self {
        Self::new()
    }
}
