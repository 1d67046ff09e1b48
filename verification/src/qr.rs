//! QR scan verifier.
//!
//! Hard checks (signature, mission binding, expiry, geofence, GPS accuracy,
//! scan/fix skew) are AND'ed and each failure is a FAIL. Velocity and device
//! anomalies are only INCONCLUSIVE.

use crate::method::{conclude, SignalVerifier};
use crate::VerificationContext;
use fluzio_types::proof::QrProof;
use fluzio_types::{Mission, ProofPayload, ProofType, ReasonCode, SignalVerdict};

pub struct QrVerifier;

impl QrVerifier {
    pub const NAME: &'static str = "qr";

    pub(crate) fn check(
        &self,
        name: &str,
        qr: &QrProof,
        mission: &Mission,
        ctx: &VerificationContext<'_>,
    ) -> Vec<SignalVerdict> {
        let params = ctx.params;
        let mut findings = Vec::new();

        let message = qr.code.signing_message();
        if !ctx.secrets.verify_qr(&qr.code.business_id, &message, &qr.signature) {
            // Nothing else in the payload can be trusted.
            return vec![SignalVerdict::fail(name, ReasonCode::SignatureInvalid)];
        }
        if qr.code.business_id != mission.business_id || qr.code.mission_id != mission.id {
            findings.push(SignalVerdict::fail(name, ReasonCode::QrMismatch));
        }
        if qr.code.issued_at.has_expired(params.qr_max_age_secs, ctx.now) {
            findings.push(SignalVerdict::fail(name, ReasonCode::QrExpired));
        }
        match mission.location {
            Some(business) if qr.scan_location.distance_m(&business) <= params.qr_geofence_m => {}
            _ => findings.push(SignalVerdict::fail(name, ReasonCode::GeofenceViolation)),
        }
        if qr.gps_accuracy_m > params.max_gps_accuracy_m {
            findings.push(SignalVerdict::fail(name, ReasonCode::GpsAccuracyInsufficient));
        }
        if qr.scanned_at.abs_diff(qr.gps_fix_at) > params.qr_gps_max_skew_secs {
            findings.push(SignalVerdict::fail(name, ReasonCode::TimestampSkew));
        }

        if let Some(last) = ctx.trust.last_scan {
            let metres = last.location.distance_m(&qr.scan_location);
            let secs = qr.scanned_at.abs_diff(last.at);
            let anomalous = if secs == 0 {
                metres > params.qr_geofence_m
            } else {
                (metres / 1000.0) / (secs as f64 / 3600.0) > params.max_velocity_kmh
            };
            if anomalous {
                findings.push(SignalVerdict::inconclusive(name, ReasonCode::VelocityAnomaly));
            }
        }
        let known = &ctx.trust.known_devices;
        if !known.is_empty() && !known.contains(&ctx.submitter.device_id) {
            findings.push(SignalVerdict::inconclusive(
                name,
                ReasonCode::DeviceFingerprintAnomaly,
            ));
        }

        conclude(name, findings)
    }
}

impl SignalVerifier for QrVerifier {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn proof_types(&self) -> &'static [ProofType] {
        &[ProofType::Qr]
    }

    fn verify(
        &self,
        proof: &ProofPayload,
        mission: &Mission,
        ctx: &VerificationContext<'_>,
    ) -> Vec<SignalVerdict> {
        match proof {
            ProofPayload::Qr(qr) => self.check(Self::NAME, qr, mission, ctx),
            _ => vec![SignalVerdict::fail(Self::NAME, ReasonCode::ProofTypeMismatch)],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;
    use fluzio_crypto::sign_hmac_hex;
    use fluzio_types::proof::QrCode;
    use fluzio_types::{BusinessId, DeviceId, MissionId, ScanRecord, Timestamp, VerdictOutcome};

    fn qr_proof(fx: &Fixture, metres_from_shop: f64) -> ProofPayload {
        let code = QrCode {
            business_id: BusinessId::new("b1"),
            mission_id: MissionId::new("m1"),
            issued_at: fx.now.minus_secs(600),
            nonce: "n-1".into(),
        };
        let signature = sign_hmac_hex(QR_SECRET.as_bytes(), code.signing_message().as_bytes());
        ProofPayload::Qr(QrProof {
            code,
            signature,
            scan_location: shop().offset_north(metres_from_shop),
            gps_accuracy_m: 10.0,
            scanned_at: fx.now,
            gps_fix_at: fx.now.minus_secs(20),
        })
    }

    fn run(fx: &Fixture, proof: &ProofPayload) -> Vec<SignalVerdict> {
        QrVerifier.verify(proof, &mission(ProofType::Qr), &fx.ctx())
    }

    #[test]
    fn valid_scan_passes() {
        let fx = Fixture::new();
        let verdicts = run(&fx, &qr_proof(&fx, 20.0));
        assert_eq!(verdicts, vec![SignalVerdict::pass("qr")]);
    }

    #[test]
    fn scan_150m_away_is_geofence_violation() {
        let fx = Fixture::new();
        let verdicts = run(&fx, &qr_proof(&fx, 150.0));
        assert_eq!(reasons(&verdicts, VerdictOutcome::Fail), vec![ReasonCode::GeofenceViolation]);
    }

    #[test]
    fn tampered_signature_short_circuits() {
        let fx = Fixture::new();
        let ProofPayload::Qr(mut qr) = qr_proof(&fx, 500.0) else { unreachable!() };
        qr.code.nonce = "n-2".into();
        let verdicts = run(&fx, &ProofPayload::Qr(qr));
        assert_eq!(verdicts, vec![SignalVerdict::fail("qr", ReasonCode::SignatureInvalid)]);
    }

    #[test]
    fn expired_inaccurate_and_skewed_all_reported() {
        let fx = Fixture::new();
        let code = QrCode {
            business_id: BusinessId::new("b1"),
            mission_id: MissionId::new("m1"),
            issued_at: fx.now.minus_secs(25 * 3600),
            nonce: "n".into(),
        };
        let signature = sign_hmac_hex(QR_SECRET.as_bytes(), code.signing_message().as_bytes());
        let proof = ProofPayload::Qr(QrProof {
            code,
            signature,
            scan_location: shop(),
            gps_accuracy_m: 80.0,
            scanned_at: fx.now,
            gps_fix_at: fx.now.minus_secs(301),
        });
        let fails = reasons(&run(&fx, &proof), VerdictOutcome::Fail);
        assert_eq!(
            fails,
            vec![
                ReasonCode::QrExpired,
                ReasonCode::GpsAccuracyInsufficient,
                ReasonCode::TimestampSkew
            ]
        );
    }

    #[test]
    fn qr_for_other_mission_mismatches() {
        let fx = Fixture::new();
        let mut m = mission(ProofType::Qr);
        m.id = MissionId::new("m2");
        let verdicts = QrVerifier.verify(&qr_proof(&fx, 0.0), &m, &fx.ctx());
        assert_eq!(reasons(&verdicts, VerdictOutcome::Fail), vec![ReasonCode::QrMismatch]);
    }

    #[test]
    fn teleporting_user_is_inconclusive_not_failed() {
        let mut fx = Fixture::new();
        // 50 km away one minute ago.
        fx.trust.last_scan = Some(ScanRecord {
            location: shop().offset_north(50_000.0),
            at: fx.now.minus_secs(60),
        });
        fx.trust.known_devices = vec![DeviceId::new("other")];
        let verdicts = run(&fx, &qr_proof(&fx, 0.0));
        assert!(reasons(&verdicts, VerdictOutcome::Fail).is_empty());
        assert_eq!(
            reasons(&verdicts, VerdictOutcome::Inconclusive),
            vec![ReasonCode::VelocityAnomaly, ReasonCode::DeviceFingerprintAnomaly]
        );
    }

    #[test]
    fn plausible_travel_is_fine() {
        let mut fx = Fixture::new();
        fx.trust.last_scan = Some(ScanRecord {
            location: shop().offset_north(10_000.0),
            at: Timestamp::new(NOW - 3600),
        });
        let verdicts = run(&fx, &qr_proof(&fx, 0.0));
        assert_eq!(verdicts, vec![SignalVerdict::pass("qr")]);
    }
}
