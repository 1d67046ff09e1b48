//! The proof engine: wires the ledgers, verifiers and decision policy into
//! the submission pipeline and the post-decision event handlers.
//!
//! Every write to a participation happens under its mission's commit lock.
//! Reward transitions are serialized by the reward ledger itself.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use fluzio_caps::{check_advisory, check_commit, Entitlement, ParticipationCounts};
use fluzio_crypto::{proof_fingerprint, SecretBook};
use fluzio_decision::{Decision, DecisionPolicy};
use fluzio_rewards::{RevocationOutcome, RewardLedger, SweepReport};
use fluzio_store::{EngineStore, StoreError, TransitionKind};
use fluzio_trust::{TrustError, TrustLedger};
use fluzio_types::proof::{BookingStatus, OrderStatus};
use fluzio_types::{
    AiConfidenceScore, BusinessId, Clock, DecisionOutcome, EngineParams, Mission, MissionId,
    Participation, ParticipationId, ParticipationStatus, ProofCategory, ProofPayload,
    ReasonCode, Rejection, RevocationReason, ReviewPriority, RewardLedgerEntry, ScanRecord,
    SignalVerdict, SubmitterIdentity, Timestamp, TrustContext, UserBalance, UserId,
};
use fluzio_verification::{
    poll_until_confirmed, ExternalProbe, PollBudget, PollOutcome, VerificationContext,
    VerifierRegistry,
};

use crate::config::EngineConfig;
use crate::history::StoreHistory;
use crate::metrics::EngineMetrics;
use crate::mission_locks::MissionLocks;
use crate::review_queue::{ReviewAlert, ReviewItem, ReviewQueue};
use crate::webhook::{self, WebhookAck, WebhookAction, WebhookEvent};
use crate::NodeError;

const EXTERNAL_REVIEW: &str = "external_review";

// ── Requests and responses ──────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SubmitProof {
    pub mission_id: MissionId,
    #[serde(flatten)]
    pub submitter: SubmitterIdentity,
    pub proof: ProofPayload,
    #[serde(default)]
    pub ai_confidence: Option<AiConfidenceScore>,
}

/// Where a participation stands after an engine operation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParticipationOutcome {
    pub participation_id: ParticipationId,
    pub status: ParticipationStatus,
    pub decision: Option<DecisionOutcome>,
    pub reason: Option<ReasonCode>,
    pub verdicts: Vec<SignalVerdict>,
    pub reward: Option<RewardLedgerEntry>,
}

impl ParticipationOutcome {
    fn new(p: &Participation, reward: Option<RewardLedgerEntry>) -> Self {
        Self {
            participation_id: p.id,
            status: p.status,
            decision: p.decision,
            reason: p.reason,
            verdicts: p.verdicts.clone(),
            reward,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BusinessVerdict {
    Approve,
    Reject,
    ReportFraud,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessDecision {
    pub business_id: BusinessId,
    pub decision: BusinessVerdict,
    #[serde(default)]
    pub notes: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RevocationReport {
    pub participation_id: ParticipationId,
    pub status: ParticipationStatus,
    pub ledger: RevocationOutcome,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ParticipationView {
    pub participation: Participation,
    pub reward: Option<RewardLedgerEntry>,
}

struct Admitted {
    mission: Mission,
    participation: Participation,
    trust: TrustContext,
}

// ── Engine ──────────────────────────────────────────────────────────────

pub struct ProofEngine<S> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
    params: EngineParams,
    policy: DecisionPolicy,
    secrets: SecretBook,
    registry: VerifierRegistry,
    trust: Arc<TrustLedger<S>>,
    rewards: RewardLedger<S>,
    locks: MissionLocks,
    queue: ReviewQueue,
    metrics: Arc<EngineMetrics>,
    probe: Option<Arc<dyn ExternalProbe>>,
    polls: Mutex<HashMap<ParticipationId, watch::Sender<bool>>>,
}

/// Map a trust-ledger refusal to the caller-facing rejection.
fn gate_error(e: TrustError) -> NodeError {
    match e {
        TrustError::RateLimited { .. } => Rejection::RateLimited.into(),
        TrustError::Blocked { .. } => Rejection::Blacklisted.into(),
        other => other.into(),
    }
}

fn external_review_ref(payload: &ProofPayload) -> Option<&str> {
    match payload {
        ProofPayload::Screenshot(m) => m.external_review_ref.as_deref(),
        _ => None,
    }
}

impl<S: EngineStore + 'static> ProofEngine<S> {
    /// Build an engine over `store`, registering the configured missions and
    /// rebuilding the review queue from flagged participations.
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>, config: &EngineConfig) -> Result<Self, NodeError> {
        config.validate()?;
        for mission in &config.missions {
            store.put_mission(mission)?;
        }
        let trust = Arc::new(TrustLedger::new(store.clone(), config.params.clone()));
        let rewards = RewardLedger::new(store.clone(), trust.clone(), config.params.clone());
        let engine = Self {
            store,
            clock,
            params: config.params.clone(),
            policy: config.policy.clone(),
            secrets: config.secret_book(),
            registry: VerifierRegistry::standard(),
            trust,
            rewards,
            locks: MissionLocks::new(),
            queue: ReviewQueue::new(),
            metrics: Arc::new(EngineMetrics::new()),
            probe: None,
            polls: Mutex::new(HashMap::new()),
        };
        engine.rebuild_review_queue()?;
        engine.refresh_gauges();
        Ok(engine)
    }

    pub fn with_probe(mut self, probe: Arc<dyn ExternalProbe>) -> Self {
        self.probe = Some(probe);
        self
    }

    pub fn with_registry(mut self, registry: VerifierRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn metrics(&self) -> &Arc<EngineMetrics> {
        &self.metrics
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn trust(&self) -> &Arc<TrustLedger<S>> {
        &self.trust
    }

    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    fn polls(&self) -> MutexGuard<'_, HashMap<ParticipationId, watch::Sender<bool>>> {
        self.polls.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn refresh_gauges(&self) {
        if let Ok(n) = self.rewards.locked_count() {
            self.metrics.locked_rewards.set(n as i64);
        }
        self.metrics.review_queue_depth.set(self.queue.len() as i64);
    }

    fn rebuild_review_queue(&self) -> Result<(), NodeError> {
        for mission in self.store.list_missions()? {
            for p in self.store.mission_participations(&mission.id)? {
                if p.status != ParticipationStatus::Flagged {
                    continue;
                }
                let priority = if self.policy.is_high_value(mission.reward_points) {
                    ReviewPriority::High
                } else {
                    ReviewPriority::Normal
                };
                self.queue.push(self.review_item(&mission, &p, priority, p.created_at));
            }
        }
        Ok(())
    }

    fn review_item(
        &self,
        mission: &Mission,
        p: &Participation,
        priority: ReviewPriority,
        at: Timestamp,
    ) -> ReviewItem {
        ReviewItem {
            participation_id: p.id,
            business_id: mission.business_id.clone(),
            mission_id: mission.id.clone(),
            user_id: p.user_id.clone(),
            priority,
            reason: p.reason.unwrap_or(ReasonCode::ManualReviewRequired),
            reward_points: mission.reward_points,
            flagged_at: at,
        }
    }

    fn load_participation(&self, id: ParticipationId) -> Result<Participation, NodeError> {
        match self.store.get_participation(id) {
            Ok(p) => Ok(p),
            Err(StoreError::NotFound(_)) => Err(NodeError::ParticipationNotFound(id)),
            Err(e) => Err(e.into()),
        }
    }

    fn load_mission(&self, id: &MissionId) -> Result<Mission, NodeError> {
        match self.store.get_mission(id) {
            Ok(m) => Ok(m),
            Err(StoreError::NotFound(_)) => Err(NodeError::MissionNotFound(id.clone())),
            Err(e) => Err(e.into()),
        }
    }

    fn tally(&self, mission: &Mission, user: &UserId, now: Timestamp) -> Result<ParticipationCounts, NodeError> {
        let all = self.store.mission_participations(&mission.id)?;
        Ok(ParticipationCounts::tally(&all, user, now))
    }

    fn outcome(&self, p: &Participation) -> Result<ParticipationOutcome, NodeError> {
        Ok(ParticipationOutcome::new(p, self.rewards.entry(p.id)?))
    }

    /// Register or replace a mission definition.
    pub fn register_mission(&self, mission: &Mission) -> Result<(), NodeError> {
        mission
            .validate()
            .map_err(|e| NodeError::Config(e.to_string()))?;
        self.store.put_mission(mission)?;
        tracing::info!(mission = %mission.id, business = %mission.business_id, "mission registered");
        Ok(())
    }

    // ── Submission ──────────────────────────────────────────────────────

    /// Run a proof through the whole pipeline.
    ///
    /// Refusals before a participation exists (unknown mission, standing,
    /// rate limit, caps) are `Err(NodeError::Rejected)` and leave nothing
    /// behind. Once committed, the participation's fate is the `Ok` outcome.
    pub async fn submit(&self, request: SubmitProof) -> Result<ParticipationOutcome, NodeError> {
        self.metrics.submissions.inc();
        match self.admit(&request).await {
            Ok(admitted) => self.verify_and_decide(request, admitted).await,
            Err(NodeError::Rejected(rejection)) => {
                let code = rejection.reason_code();
                self.metrics
                    .submission_rejections
                    .with_label_values(&[code.as_str()])
                    .inc();
                tracing::warn!(
                    mission = %request.mission_id,
                    user = %request.submitter.user_id,
                    reason = %code,
                    "submission refused"
                );
                Err(rejection.into())
            }
            Err(e) => Err(e),
        }
    }

    async fn admit(&self, request: &SubmitProof) -> Result<Admitted, NodeError> {
        let now = self.clock.now();
        let user = &request.submitter.user_id;
        let mission = match self.load_mission(&request.mission_id) {
            Err(NodeError::MissionNotFound(_)) => {
                return Err(Rejection::MissionInactive(ReasonCode::MissionNotFound).into())
            }
            other => other?,
        };
        let proof_type = request.proof.proof_type();
        if proof_type != mission.proof_type || !self.registry.supports(proof_type) {
            return Err(Rejection::VerificationFailed(ReasonCode::ProofTypeMismatch).into());
        }

        self.trust.check_standing(user, now).map_err(gate_error)?;
        self.trust
            .admit_submission(&request.submitter, &mission.id, now)
            .map_err(gate_error)?;
        check_advisory(&mission, &self.tally(&mission, user, now)?, now).into_result()?;

        // Before record_submission, so a new device is still unknown to verifiers.
        let trust = self.trust.context(&request.submitter, &mission.id, now)?;

        let participation = {
            let _commit = self.locks.lock(&mission.id).await;
            check_commit(&mission, &self.tally(&mission, user, now)?, now).into_result()?;
            let p = Participation {
                id: self.store.next_participation_id()?,
                mission_id: mission.id.clone(),
                user_id: user.clone(),
                device_id: request.submitter.device_id.clone(),
                ip: request.submitter.ip.clone(),
                proof_type,
                status: ParticipationStatus::PendingVerification,
                created_at: now,
                completed_at: None,
                payload: request.proof.clone(),
                ai_confidence: request.ai_confidence.clone(),
                verdicts: Vec::new(),
                decision: None,
                reason: None,
                external_ref: request.proof.external_ref(),
                fingerprint: Some(proof_fingerprint(&request.proof)),
                revoked_at: None,
            };
            self.store.put_participation(&p)?;
            p
        };
        self.trust.record_submission(&request.submitter, now)?;
        tracing::info!(
            participation = %participation.id,
            mission = %mission.id,
            user = %user,
            proof_type = %proof_type,
            "participation committed"
        );
        Ok(Admitted {
            mission,
            participation,
            trust,
        })
    }

    async fn verify_and_decide(
        &self,
        request: SubmitProof,
        admitted: Admitted,
    ) -> Result<ParticipationOutcome, NodeError> {
        let Admitted {
            mission,
            participation,
            trust,
        } = admitted;
        let now = self.clock.now();

        let verified = {
            let history = StoreHistory::new(self.store.as_ref(), participation.id);
            let ctx = VerificationContext {
                now,
                submitter: &request.submitter,
                trust: &trust,
                history: &history,
                secrets: &self.secrets,
                params: &self.params,
                ai: request.ai_confidence.as_ref(),
            };
            self.registry.verify(&participation.payload, &mission, &ctx)
        };
        let mut verdicts = match verified {
            Ok(v) => v,
            Err(e) => {
                self.settle(&mission, participation.id, |p| {
                    p.status = ParticipationStatus::Rejected;
                    p.reason = Some(ReasonCode::ProofTypeMismatch);
                })
                .await?;
                return Err(e.into());
            }
        };

        if let (Some(reference), Some(probe)) =
            (external_review_ref(&participation.payload), self.probe.clone())
        {
            if !verdicts.iter().any(SignalVerdict::is_fail) {
                match self.poll_review(participation.id, probe.as_ref(), reference).await {
                    PollOutcome::Confirmed { .. } => verdicts.push(SignalVerdict {
                        reason: ReasonCode::ExternalReviewFound,
                        ..SignalVerdict::pass(EXTERNAL_REVIEW)
                    }),
                    PollOutcome::Rejected { .. } => verdicts.push(SignalVerdict::fail(
                        EXTERNAL_REVIEW,
                        ReasonCode::ExternalReviewRejected,
                    )),
                    PollOutcome::TimedOut { attempts } => {
                        tracing::info!(
                            participation = %participation.id,
                            attempts,
                            "external review not found; manual proof needed"
                        );
                        return self
                            .settle(&mission, participation.id, |p| {
                                p.status = ParticipationStatus::InProgress;
                                p.reason = Some(ReasonCode::TimedOut);
                                p.verdicts = verdicts;
                            })
                            .await;
                    }
                    PollOutcome::Cancelled => {
                        return self.outcome(&self.load_participation(participation.id)?);
                    }
                }
            }
        }

        let category = if trust.is_first_time_user() {
            ProofCategory::FirstTimeUser
        } else {
            mission.proof_type.category()
        };
        let decision = self.policy.decide(
            &verdicts,
            request.ai_confidence.as_ref(),
            mission.reward_points,
            category,
        );
        let outcome_label = decision.outcome.to_string();
        self.metrics
            .decisions
            .with_label_values(&[outcome_label.as_str()])
            .inc();
        tracing::info!(
            participation = %participation.id,
            mission = %mission.id,
            outcome = %decision.outcome,
            reason = %decision.reason,
            category = ?category,
            "decision"
        );

        if let (ProofPayload::Qr(qr), false) =
            (&participation.payload, decision.outcome == DecisionOutcome::AutoReject)
        {
            let scan = ScanRecord {
                location: qr.scan_location,
                at: qr.scanned_at,
            };
            self.trust.record_scan(&participation.user_id, scan, now)?;
        }

        self.apply_decision(&mission, participation.id, verdicts, decision, now)
            .await
    }

    async fn poll_review(
        &self,
        participation: ParticipationId,
        probe: &dyn ExternalProbe,
        reference: &str,
    ) -> PollOutcome {
        let (tx, mut rx) = watch::channel(false);
        self.polls().insert(participation, tx);
        let outcome = poll_until_confirmed(
            probe,
            reference,
            PollBudget::from_params(&self.params),
            &mut rx,
        )
        .await;
        self.polls().remove(&participation);
        outcome
    }

    fn cancel_poll(&self, participation: ParticipationId) {
        if let Some(tx) = self.polls().get(&participation) {
            let _ = tx.send(true);
            tracing::debug!(participation = %participation, "pending review poll cancelled");
        }
    }

    /// Apply `f` to a participation still pending verification. If another
    /// event already moved it on, leave it alone and report where it is.
    async fn settle(
        &self,
        mission: &Mission,
        id: ParticipationId,
        f: impl FnOnce(&mut Participation),
    ) -> Result<ParticipationOutcome, NodeError> {
        let _commit = self.locks.lock(&mission.id).await;
        let mut p = self.load_participation(id)?;
        if p.status == ParticipationStatus::PendingVerification {
            f(&mut p);
            self.store.put_participation(&p)?;
        }
        self.outcome(&p)
    }

    async fn apply_decision(
        &self,
        mission: &Mission,
        id: ParticipationId,
        verdicts: Vec<SignalVerdict>,
        decision: Decision,
        now: Timestamp,
    ) -> Result<ParticipationOutcome, NodeError> {
        let _commit = self.locks.lock(&mission.id).await;
        let mut p = self.load_participation(id)?;
        if p.status != ParticipationStatus::PendingVerification {
            tracing::info!(participation = %id, status = %p.status, "decided elsewhere; automated decision dropped");
            return self.outcome(&p);
        }
        p.verdicts = verdicts;
        p.decision = Some(decision.outcome);
        p.reason = Some(decision.reason);

        match decision.outcome {
            DecisionOutcome::AutoReject => {
                p.status = ParticipationStatus::Rejected;
                self.store.put_participation(&p)?;
                self.trust.record_rejection(&p.user_id, now)?;
                self.outcome(&p)
            }
            DecisionOutcome::FlagForReview => {
                p.status = ParticipationStatus::Flagged;
                self.store.put_participation(&p)?;
                let priority = decision.priority.unwrap_or(ReviewPriority::Normal);
                self.queue.push(self.review_item(mission, &p, priority, now));
                self.refresh_gauges();
                self.outcome(&p)
            }
            DecisionOutcome::AutoApprove => {
                let (p, entry) = self.approve_and_lock(p, mission, decision.reason, now)?;
                Ok(ParticipationOutcome::new(&p, Some(entry)))
            }
        }
    }

    /// APPROVED, then the reward lock, then COMPLETED. Caller holds the
    /// mission lock.
    fn approve_and_lock(
        &self,
        mut p: Participation,
        mission: &Mission,
        reason: ReasonCode,
        now: Timestamp,
    ) -> Result<(Participation, RewardLedgerEntry), NodeError> {
        p.status = ParticipationStatus::Approved;
        p.reason = Some(reason);
        self.store.put_participation(&p)?;

        let high_value = self.policy.is_high_value(mission.reward_points);
        let entry = self.rewards.lock(&p, mission.reward_points, high_value, now)?;

        p.status = ParticipationStatus::Completed;
        p.completed_at = Some(now);
        self.store.put_participation(&p)?;
        self.trust.record_completion(&p.user_id, now)?;
        self.metrics.rewards_locked.inc();
        self.refresh_gauges();
        Ok((p, entry))
    }

    // ── Business decision ───────────────────────────────────────────────

    /// The owning business resolves a participation waiting on it.
    ///
    /// Applies to FLAGGED participations, and to ones still polling for an
    /// external review or waiting for manual proof.
    pub async fn business_decision(
        &self,
        id: ParticipationId,
        request: BusinessDecision,
    ) -> Result<ParticipationOutcome, NodeError> {
        let now = self.clock.now();
        let p = self.load_participation(id)?;
        let mission = self.load_mission(&p.mission_id)?;
        if mission.business_id != request.business_id {
            return Err(NodeError::WrongBusiness {
                business: request.business_id.to_string(),
                participation: id,
            });
        }
        self.cancel_poll(id);

        let _commit = self.locks.lock(&mission.id).await;
        let mut p = self.load_participation(id)?;
        if !matches!(
            p.status,
            ParticipationStatus::Flagged
                | ParticipationStatus::PendingVerification
                | ParticipationStatus::InProgress
        ) {
            return Err(NodeError::InvalidState {
                participation: id,
                status: p.status,
            });
        }
        tracing::info!(
            participation = %id,
            business = %request.business_id,
            decision = ?request.decision,
            notes = %request.notes,
            "business decision"
        );

        let outcome = match request.decision {
            BusinessVerdict::Approve => {
                if p.status == ParticipationStatus::InProgress {
                    // Holds no slot while waiting for manual proof.
                    check_commit(&mission, &self.tally(&mission, &p.user_id, now)?, now)
                        .into_result()?;
                }
                let (p, entry) = self.approve_and_lock(p, &mission, ReasonCode::BusinessApproved, now)?;
                ParticipationOutcome::new(&p, Some(entry))
            }
            BusinessVerdict::Reject => {
                p.status = ParticipationStatus::Rejected;
                p.reason = Some(ReasonCode::BusinessRejected);
                self.store.put_participation(&p)?;
                self.trust.record_rejection(&p.user_id, now)?;
                self.outcome(&p)?
            }
            BusinessVerdict::ReportFraud => {
                p.status = ParticipationStatus::Rejected;
                p.reason = Some(ReasonCode::FraudReported);
                self.store.put_participation(&p)?;
                self.trust.record_fraud_report(&p.user_id, now)?;
                self.queue.alert(ReviewAlert::FraudReported {
                    business_id: mission.business_id.clone(),
                    user_id: p.user_id.clone(),
                    participation_id: id,
                    at: now,
                });
                self.outcome(&p)?
            }
        };
        self.queue.remove(id);
        self.refresh_gauges();
        Ok(outcome)
    }

    // ── Revocation ──────────────────────────────────────────────────────

    /// An external refund, chargeback, content deletion or fraud signal.
    ///
    /// A participation that never reached the ledger is rejected instead;
    /// the ledger outcome is then `NotFound`.
    pub async fn revoke(
        &self,
        id: ParticipationId,
        reason: RevocationReason,
    ) -> Result<RevocationReport, NodeError> {
        let now = self.clock.now();
        self.cancel_poll(id);
        let p = self.load_participation(id)?;
        let mission = self.load_mission(&p.mission_id)?;

        let _commit = self.locks.lock(&mission.id).await;
        let mut p = self.load_participation(id)?;
        if !p.status.is_final() && p.status != ParticipationStatus::Approved {
            p.status = ParticipationStatus::Rejected;
            p.reason = Some(reason.reason_code());
            self.store.put_participation(&p)?;
            self.queue.remove(id);
            self.refresh_gauges();
            tracing::info!(participation = %id, reason = %reason, "revoked before reward lock");
            return Ok(RevocationReport {
                participation_id: id,
                status: p.status,
                ledger: RevocationOutcome::NotFound,
            });
        }

        let ledger = self.rewards.revoke(id, reason, now)?;
        if let RevocationOutcome::Revoked {
            revocations,
            suspension_recommended,
            ..
        } = &ledger
        {
            p.revoked_at = Some(now);
            self.store.put_participation(&p)?;
            self.metrics.rewards_revoked.inc();
            if *suspension_recommended {
                self.queue.alert(ReviewAlert::SuspensionRecommended {
                    business_id: mission.business_id.clone(),
                    user_id: p.user_id.clone(),
                    revocations: *revocations,
                    at: now,
                });
            }
            self.refresh_gauges();
        }
        Ok(RevocationReport {
            participation_id: id,
            status: p.status,
            ledger,
        })
    }

    // ── Webhooks ────────────────────────────────────────────────────────

    /// Authenticate a provider webhook and route it.
    pub async fn ingest_webhook(
        &self,
        provider: &str,
        body: &[u8],
        signature: &str,
    ) -> Result<WebhookAck, NodeError> {
        let now = self.clock.now();
        let event = match webhook::authenticate(&self.secrets, &self.params, provider, body, signature, now) {
            Ok(event) => event,
            Err(e) => {
                self.metrics.webhook_rejections.inc();
                tracing::warn!(provider, error = %e, "webhook refused");
                return Err(e);
            }
        };
        let reference = event.reference(provider);
        let ack = |action| WebhookAck {
            provider: provider.to_string(),
            reference: reference.clone(),
            action,
        };
        let Some(p) = self.store.find_by_external_ref(&reference)? else {
            tracing::info!(provider, reference = %reference, "webhook for unknown reference");
            return Ok(ack(WebhookAction::UnknownReference));
        };

        let action = match event {
            WebhookEvent::Payment { status, .. } => match status {
                OrderStatus::Refunded | OrderStatus::Chargeback => {
                    let reason = if status == OrderStatus::Refunded {
                        RevocationReason::Refund
                    } else {
                        RevocationReason::Chargeback
                    };
                    let report = self.revoke(p.id, reason).await?;
                    WebhookAction::Revoked {
                        participation_id: p.id,
                        outcome: report.ledger,
                    }
                }
                OrderStatus::Disputed => {
                    if self.rewards.hold(p.id)? {
                        WebhookAction::HoldPlaced {
                            participation_id: p.id,
                        }
                    } else {
                        WebhookAction::Acknowledged
                    }
                }
                OrderStatus::Resolved => {
                    if self.rewards.clear_hold(p.id)? {
                        WebhookAction::HoldLifted {
                            participation_id: p.id,
                        }
                    } else {
                        WebhookAction::Acknowledged
                    }
                }
                _ => WebhookAction::Acknowledged,
            },
            WebhookEvent::Booking {
                status: BookingStatus::NoShow,
                ..
            } => self.record_no_show(&p, now).await?,
            WebhookEvent::Booking { .. } => WebhookAction::Acknowledged,
        };
        tracing::info!(provider, reference = %reference, action = ?action, "webhook routed");
        Ok(ack(action))
    }

    /// Count a no-show once per participation and settle a participation
    /// that was still waiting on the booking.
    async fn record_no_show(&self, p: &Participation, now: Timestamp) -> Result<WebhookAction, NodeError> {
        if !self.store.record_transition(p.id, TransitionKind::NoShow)? {
            return Ok(WebhookAction::Acknowledged);
        }
        let blacklisted = self.trust.record_no_show(&p.user_id, now)?;
        self.cancel_poll(p.id);

        let mission = self.load_mission(&p.mission_id)?;
        let _commit = self.locks.lock(&mission.id).await;
        let mut current = self.load_participation(p.id)?;
        if matches!(
            current.status,
            ParticipationStatus::PendingVerification
                | ParticipationStatus::Flagged
                | ParticipationStatus::InProgress
        ) {
            current.status = ParticipationStatus::Rejected;
            current.reason = Some(ReasonCode::BookingNoShow);
            self.store.put_participation(&current)?;
            self.queue.remove(p.id);
            self.refresh_gauges();
        }
        Ok(WebhookAction::NoShowRecorded {
            user_id: p.user_id.clone(),
            blacklisted,
        })
    }

    // ── Sweep and queries ───────────────────────────────────────────────

    /// Release every due reward.
    pub fn sweep(&self) -> Result<SweepReport, NodeError> {
        let report = self.rewards.sweep(self.clock.now())?;
        self.metrics
            .rewards_released
            .inc_by(report.released.len() as u64);
        self.refresh_gauges();
        Ok(report)
    }

    /// Drop per-mission locks nobody holds.
    pub async fn cleanup_locks(&self) {
        self.locks.cleanup().await;
    }

    pub fn entitlement(&self, mission: &MissionId, user: &UserId) -> Result<Entitlement, NodeError> {
        let now = self.clock.now();
        let mission = self.load_mission(mission)?;
        let counts = self.tally(&mission, user, now)?;
        Ok(fluzio_caps::entitlement(&mission, &counts, now))
    }

    pub fn participation(&self, id: ParticipationId) -> Result<ParticipationView, NodeError> {
        let participation = self.load_participation(id)?;
        let reward = self.rewards.entry(id)?;
        Ok(ParticipationView {
            participation,
            reward,
        })
    }

    pub fn reviews(&self, business: &BusinessId) -> Vec<ReviewItem> {
        self.queue.list(business)
    }

    pub fn alerts(&self, business: &BusinessId) -> Vec<ReviewAlert> {
        self.queue.alerts(business)
    }

    pub fn balance(&self, user: &UserId) -> Result<UserBalance, NodeError> {
        Ok(self.rewards.balance(user)?)
    }

    pub fn trust_score(&self, user: &UserId) -> Result<u8, NodeError> {
        Ok(self.trust.score(user, self.clock.now())?)
    }
}
