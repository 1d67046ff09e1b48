//! Blake2b hashing and proof fingerprints.

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use fluzio_types::ProofPayload;

type Blake2b256 = Blake2b<U32>;

/// Compute a 256-bit Blake2b hash of arbitrary data.
pub fn blake2b_256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Blake2b256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

/// Hash multiple byte slices in sequence (avoids concatenation allocation).
pub fn blake2b_256_multi(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Blake2b256::new();
    for part in parts {
        hasher.update(part);
    }
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

/// Hex fingerprint identifying the evidence behind a proof.
///
/// Only the identifying part of each payload is hashed, so resubmitting the
/// same QR nonce, order, booking, referred user or media file collides even
/// when incidental fields (scan position, timestamps) differ.
pub fn proof_fingerprint(payload: &ProofPayload) -> String {
    let tag = payload.proof_type().as_str().as_bytes();
    let digest = match payload {
        ProofPayload::Qr(q) => blake2b_256_multi(&[tag, q.code.signing_message().as_bytes()]),
        ProofPayload::GpsDwell(g) => {
            let encoded = bincode::serialize(&g.readings).unwrap_or_default();
            blake2b_256_multi(&[tag, &encoded])
        }
        ProofPayload::PaymentWebhook(_) | ProofPayload::BookingWebhook(_) => {
            let reference = payload.external_ref().unwrap_or_default();
            blake2b_256_multi(&[tag, reference.as_bytes()])
        }
        ProofPayload::Referral(r) => blake2b_256_multi(&[
            tag,
            r.referred.user_id.as_str().as_bytes(),
            proof_fingerprint(&r.conversion).as_bytes(),
        ]),
        ProofPayload::Screenshot(m) | ProofPayload::MediaUpload(m) => {
            blake2b_256_multi(&[tag, m.content_hash.as_bytes()])
        }
    };
    hex::encode(digest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fluzio_types::proof::MediaProof;

    fn media(hash: &str, stock: bool) -> ProofPayload {
        ProofPayload::MediaUpload(MediaProof {
            content_hash: hash.into(),
            exif: None,
            stock_image_detected: stock,
            ai_generated_detected: false,
            external_review_ref: None,
        })
    }

    #[test]
    fn blake2b_deterministic() {
        assert_eq!(blake2b_256(b"hello fluzio"), blake2b_256(b"hello fluzio"));
    }

    #[test]
    fn blake2b_different_inputs() {
        assert_ne!(blake2b_256(b"hello"), blake2b_256(b"world"));
    }

    #[test]
    fn blake2b_multi_equivalent() {
        let single = blake2b_256(b"helloworld");
        let multi = blake2b_256_multi(&[b"hello", b"world"]);
        assert_eq!(single, multi);
    }

    #[test]
    fn fingerprint_ignores_incidental_fields() {
        assert_eq!(proof_fingerprint(&media("aa", false)), proof_fingerprint(&media("aa", true)));
        assert_ne!(proof_fingerprint(&media("aa", false)), proof_fingerprint(&media("bb", false)));
    }

    #[test]
    fn fingerprint_separates_proof_types() {
        let screenshot = ProofPayload::Screenshot(MediaProof {
            content_hash: "aa".into(),
            exif: None,
            stock_image_detected: false,
            ai_generated_detected: false,
            external_review_ref: None,
        });
        assert_ne!(proof_fingerprint(&screenshot), proof_fingerprint(&media("aa", false)));
    }
}
