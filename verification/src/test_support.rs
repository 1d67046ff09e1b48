use crate::{ProofHistory, VerificationContext, VerificationError};
use fluzio_crypto::{sign_hmac_hex, SecretBook};
use fluzio_types::{
    BusinessId, DeviceId, EngineParams, GeoPoint, IpAddress, Mission, MissionId, ProofType,
    RewardPoints, SubmitterIdentity, Timestamp, TrustContext, TrustFactors, UserId, VerdictOutcome,
    SignalVerdict, ReasonCode,
};
use std::collections::HashSet;

pub const NOW: u64 = 1_700_000_000;
pub const QR_SECRET: &str = "qr-secret";
pub const PROVIDER_SECRET: &str = "whsec";

#[derive(Default)]
pub struct FakeHistory {
    pub refs: HashSet<String>,
    pub hashes: HashSet<String>,
    pub fingerprints: HashSet<String>,
    pub active_users: HashSet<UserId>,
    /// Every lookup fails, as if the store were down.
    pub unavailable: bool,
}

impl FakeHistory {
    fn lookup(&self, hit: bool) -> Result<bool, VerificationError> {
        if self.unavailable {
            return Err(VerificationError::History("store offline".into()));
        }
        Ok(hit)
    }
}

impl ProofHistory for FakeHistory {
    fn external_ref_seen(&self, external_ref: &str) -> Result<bool, VerificationError> {
        self.lookup(self.refs.contains(external_ref))
    }
    fn media_hash_seen(&self, _mission: &MissionId, content_hash: &str) -> Result<bool, VerificationError> {
        self.lookup(self.hashes.contains(content_hash))
    }
    fn fingerprint_seen(&self, _mission: &MissionId, fingerprint: &str) -> Result<bool, VerificationError> {
        self.lookup(self.fingerprints.contains(fingerprint))
    }
    fn user_has_activity(&self, user: &UserId) -> Result<bool, VerificationError> {
        self.lookup(self.active_users.contains(user))
    }
}

pub struct Fixture {
    pub submitter: SubmitterIdentity,
    pub trust: TrustContext,
    pub history: FakeHistory,
    pub secrets: SecretBook,
    pub params: EngineParams,
    pub now: Timestamp,
}

impl Fixture {
    pub fn new() -> Self {
        let submitter = SubmitterIdentity {
            user_id: UserId::new("u1"),
            device_id: DeviceId::new("d1"),
            ip: IpAddress::new("10.0.0.1"),
            user_agent: "ua/1".into(),
        };
        Self {
            trust: TrustContext {
                user_id: submitter.user_id.clone(),
                score: 70,
                factors: TrustFactors::default(),
                completed_count: 3,
                known_devices: vec![submitter.device_id.clone()],
                last_scan: None,
                submissions_today: 1,
            },
            submitter,
            history: FakeHistory::default(),
            secrets: SecretBook::new()
                .with_business(BusinessId::new("b1"), QR_SECRET)
                .with_provider("stripe", PROVIDER_SECRET)
                .with_provider("calendly", PROVIDER_SECRET),
            params: EngineParams::default(),
            now: Timestamp::new(NOW),
        }
    }

    pub fn ctx(&self) -> VerificationContext<'_> {
        VerificationContext {
            now: self.now,
            submitter: &self.submitter,
            trust: &self.trust,
            history: &self.history,
            secrets: &self.secrets,
            params: &self.params,
            ai: None,
        }
    }
}

pub fn shop() -> GeoPoint {
    GeoPoint::new(52.52, 13.405)
}

pub fn mission(proof_type: ProofType) -> Mission {
    Mission {
        id: MissionId::new("m1"),
        business_id: BusinessId::new("b1"),
        proof_type,
        reward_points: RewardPoints::new(100),
        min_purchase_cents: 1_000,
        min_duration_secs: 300,
        caps: None,
        cap_tier: None,
        active: true,
        ends_at: None,
        location: Some(shop()),
    }
}

pub fn sign(message: &str) -> String {
    sign_hmac_hex(PROVIDER_SECRET.as_bytes(), message.as_bytes())
}

pub fn reasons(verdicts: &[SignalVerdict], outcome: VerdictOutcome) -> Vec<ReasonCode> {
    verdicts
        .iter()
        .filter(|v| v.outcome == outcome)
        .map(|v| v.reason)
        .collect()
}
