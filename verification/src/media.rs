//! Screenshot and media-upload verifier.
//!
//! Only a duplicate content hash fails. Every other finding is
//! INCONCLUSIVE; the decision policy keeps these categories out of
//! automatic approval whatever the verdicts say.

use crate::context::history_finding;
use crate::method::{conclude, SignalVerifier};
use crate::VerificationContext;
use fluzio_types::proof::MediaProof;
use fluzio_types::{Mission, ProofPayload, ProofType, ReasonCode, SignalVerdict, SECS_PER_DAY};

pub struct MediaVerifier {
    name: &'static str,
    proof_types: &'static [ProofType],
}

impl MediaVerifier {
    pub fn screenshot() -> Self {
        Self {
            name: "screenshot",
            proof_types: &[ProofType::Screenshot],
        }
    }

    pub fn media_upload() -> Self {
        Self {
            name: "media_upload",
            proof_types: &[ProofType::MediaUpload],
        }
    }

    fn check(&self, media: &MediaProof, mission: &Mission, ctx: &VerificationContext<'_>) -> Vec<SignalVerdict> {
        let name = self.name;
        let lookup = ctx.history.media_hash_seen(&mission.id, &media.content_hash);
        let mut findings: Vec<SignalVerdict> =
            history_finding(name, lookup, ReasonCode::DuplicateProof).into_iter().collect();
        if media.stock_image_detected {
            findings.push(SignalVerdict::inconclusive(name, ReasonCode::StockImageDetected));
        }
        if media.ai_generated_detected {
            findings.push(SignalVerdict::inconclusive(name, ReasonCode::AiGeneratedDetected));
        }
        match media.exif.as_ref().and_then(|e| e.captured_at) {
            None => findings.push(SignalVerdict::inconclusive(name, ReasonCode::MissingExif)),
            Some(at) if at.elapsed_since(ctx.now) > ctx.params.exif_max_age_days as u64 * SECS_PER_DAY => {
                findings.push(SignalVerdict::inconclusive(name, ReasonCode::StaleExif))
            }
            Some(_) => {}
        }
        conclude(name, findings)
    }
}

impl SignalVerifier for MediaVerifier {
    fn name(&self) -> &'static str {
        self.name
    }

    fn proof_types(&self) -> &'static [ProofType] {
        self.proof_types
    }

    fn verify(
        &self,
        proof: &ProofPayload,
        mission: &Mission,
        ctx: &VerificationContext<'_>,
    ) -> Vec<SignalVerdict> {
        match proof {
            ProofPayload::Screenshot(m) | ProofPayload::MediaUpload(m) => self.check(m, mission, ctx),
            _ => vec![SignalVerdict::fail(self.name, ReasonCode::ProofTypeMismatch)],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;
    use fluzio_types::proof::ExifInfo;
    use fluzio_types::{Timestamp, VerdictOutcome};

    fn photo(captured_days_ago: Option<u64>) -> ProofPayload {
        ProofPayload::MediaUpload(MediaProof {
            content_hash: "c0ffee".into(),
            exif: captured_days_ago.map(|d| ExifInfo {
                captured_at: Some(Timestamp::new(NOW - d * SECS_PER_DAY)),
                camera_model: Some("Pixel".into()),
            }),
            stock_image_detected: false,
            ai_generated_detected: false,
            external_review_ref: None,
        })
    }

    fn run(fx: &Fixture, proof: &ProofPayload) -> Vec<SignalVerdict> {
        MediaVerifier::media_upload().verify(proof, &mission(ProofType::MediaUpload), &fx.ctx())
    }

    #[test]
    fn fresh_original_photo_passes() {
        let fx = Fixture::new();
        assert_eq!(run(&fx, &photo(Some(1))), vec![SignalVerdict::pass("media_upload")]);
    }

    #[test]
    fn duplicate_hash_fails() {
        let mut fx = Fixture::new();
        fx.history.hashes.insert("c0ffee".into());
        assert_eq!(
            reasons(&run(&fx, &photo(Some(1))), VerdictOutcome::Fail),
            vec![ReasonCode::DuplicateProof]
        );
    }

    #[test]
    fn exif_problems_are_inconclusive() {
        let fx = Fixture::new();
        assert_eq!(
            reasons(&run(&fx, &photo(None)), VerdictOutcome::Inconclusive),
            vec![ReasonCode::MissingExif]
        );
        assert_eq!(
            reasons(&run(&fx, &photo(Some(8))), VerdictOutcome::Inconclusive),
            vec![ReasonCode::StaleExif]
        );
    }

    #[test]
    fn detectors_never_fail() {
        let fx = Fixture::new();
        let proof = ProofPayload::Screenshot(MediaProof {
            content_hash: "ab".into(),
            exif: None,
            stock_image_detected: true,
            ai_generated_detected: true,
            external_review_ref: None,
        });
        let verdicts = MediaVerifier::screenshot().verify(&proof, &mission(ProofType::Screenshot), &fx.ctx());
        assert!(reasons(&verdicts, VerdictOutcome::Fail).is_empty());
        assert_eq!(verdicts[0], SignalVerdict::pass("screenshot"));
        assert_eq!(verdicts.len(), 4);
    }

    #[test]
    fn unavailable_history_routes_to_review() {
        let mut fx = Fixture::new();
        fx.history.unavailable = true;
        let verdicts = run(&fx, &photo(Some(1)));
        assert!(reasons(&verdicts, VerdictOutcome::Fail).is_empty());
        assert_eq!(
            reasons(&verdicts, VerdictOutcome::Inconclusive),
            vec![ReasonCode::HistoryUnavailable]
        );
    }
}
