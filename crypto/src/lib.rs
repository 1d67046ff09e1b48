//! Cryptographic primitives for the Fluzio proof engine.
//!
//! - **HMAC-SHA256** for QR codes and provider webhooks (hex-encoded)
//! - **Blake2b** for proof fingerprints used by unique-proof missions
//! - A [`SecretBook`] holding the per-business and per-provider keys

pub mod hash;
pub mod secrets;
pub mod sign;

pub use hash::{blake2b_256, blake2b_256_multi, proof_fingerprint};
pub use secrets::SecretBook;
pub use sign::{sign_hmac_hex, verify_hmac_hex};
