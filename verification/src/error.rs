use fluzio_types::ProofType;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VerificationError {
    #[error("no verifier registered for proof type {0}")]
    NoVerifier(ProofType),

    #[error("external probe failed: {0}")]
    Probe(String),

    #[error("proof history lookup failed: {0}")]
    History(String),
}
