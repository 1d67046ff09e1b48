//! GPS dwell verifier.
//!
//! Mock-location markers and missing motion sensor data are a hard
//! anti-spoofing gate: they FAIL regardless of any AI score.

use crate::method::{conclude, SignalVerifier};
use crate::VerificationContext;
use fluzio_types::proof::GpsDwellProof;
use fluzio_types::{GeoPoint, Mission, ProofPayload, ProofType, ReasonCode, SignalVerdict};

pub struct GpsDwellVerifier;

impl GpsDwellVerifier {
    pub const NAME: &'static str = "gps_dwell";

    pub(crate) fn check(
        &self,
        name: &str,
        proof: &GpsDwellProof,
        mission: &Mission,
        ctx: &VerificationContext<'_>,
    ) -> Vec<SignalVerdict> {
        let params = ctx.params;
        let readings = &proof.readings;
        let (Some(first), Some(last)) = (readings.first(), readings.last()) else {
            return vec![SignalVerdict::fail(name, ReasonCode::InsufficientReadings)];
        };
        if readings.len() < params.gps_min_readings {
            return vec![SignalVerdict::fail(name, ReasonCode::InsufficientReadings)];
        }
        let Some(business) = mission.location else {
            return vec![SignalVerdict::fail(name, ReasonCode::GeofenceViolation)];
        };

        let mut findings = Vec::new();
        let mut fail = |code| {
            if !findings.iter().any(|v: &SignalVerdict| v.reason == code) {
                findings.push(SignalVerdict::fail(name, code));
            }
        };

        for r in readings {
            if r.mock_location {
                fail(ReasonCode::MockLocationDetected);
            }
            if r.accelerometer.is_none() || r.gyroscope.is_none() {
                fail(ReasonCode::SensorDataMissing);
            }
            if r.accuracy_m > params.max_gps_accuracy_m {
                fail(ReasonCode::GpsAccuracyInsufficient);
            }
            if r.location.distance_m(&business) > params.gps_geofence_m {
                fail(ReasonCode::GeofenceViolation);
            }
        }

        let points: Vec<GeoPoint> = readings.iter().map(|r| r.location).collect();
        if GeoPoint::centroid(&points).map_or(true, |c| c.distance_m(&business) > params.gps_centroid_m) {
            fail(ReasonCode::CentroidOutsideGeofence);
        }

        let spacing_ok = readings.windows(2).all(|pair| {
            let (a, b) = (pair[0].recorded_at, pair[1].recorded_at);
            let gap = a.elapsed_since(b);
            b > a && gap >= params.gps_min_spacing_secs && gap <= params.gps_max_spacing_secs
        });
        if !spacing_ok {
            fail(ReasonCode::IrregularReadingSpacing);
        }

        if first.recorded_at.elapsed_since(last.recorded_at) < mission.min_duration_secs {
            fail(ReasonCode::InsufficientDwell);
        }

        conclude(name, findings)
    }
}

impl SignalVerifier for GpsDwellVerifier {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn proof_types(&self) -> &'static [ProofType] {
        &[ProofType::GpsDwell]
    }

    fn verify(
        &self,
        proof: &ProofPayload,
        mission: &Mission,
        ctx: &VerificationContext<'_>,
    ) -> Vec<SignalVerdict> {
        match proof {
            ProofPayload::GpsDwell(gps) => self.check(Self::NAME, gps, mission, ctx),
            _ => vec![SignalVerdict::fail(Self::NAME, ReasonCode::ProofTypeMismatch)],
        }
    }
}
