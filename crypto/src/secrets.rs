//! Shared secrets for QR codes and webhook providers.

use crate::sign::verify_hmac_hex;
use fluzio_types::BusinessId;
use std::collections::HashMap;

/// Per-business QR secrets and per-provider webhook secrets.
///
/// A missing secret never verifies: signature checks are unconditional.
#[derive(Clone, Debug, Default)]
pub struct SecretBook {
    business_qr: HashMap<BusinessId, Vec<u8>>,
    providers: HashMap<String, Vec<u8>>,
}

impl SecretBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_business(mut self, business: BusinessId, secret: &str) -> Self {
        self.business_qr.insert(business, secret.as_bytes().to_vec());
        self
    }

    pub fn with_provider(mut self, provider: &str, secret: &str) -> Self {
        self.providers
            .insert(provider.to_string(), secret.as_bytes().to_vec());
        self
    }

    pub fn has_provider(&self, provider: &str) -> bool {
        self.providers.contains_key(provider)
    }

    pub fn verify_qr(&self, business: &BusinessId, message: &str, signature_hex: &str) -> bool {
        self.business_qr
            .get(business)
            .is_some_and(|secret| verify_hmac_hex(secret, message.as_bytes(), signature_hex))
    }

    pub fn verify_provider(&self, provider: &str, message: &[u8], signature_hex: &str) -> bool {
        self.providers
            .get(provider)
            .is_some_and(|secret| verify_hmac_hex(secret, message, signature_hex))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sign::sign_hmac_hex;

    #[test]
    fn unknown_provider_never_verifies() {
        let book = SecretBook::new().with_provider("stripe", "whsec");
        let sig = sign_hmac_hex(b"whsec", b"body");
        assert!(book.verify_provider("stripe", b"body", &sig));
        assert!(!book.verify_provider("square", b"body", &sig));
    }

    #[test]
    fn qr_secret_is_per_business() {
        let book = SecretBook::new()
            .with_business(BusinessId::new("b1"), "k1")
            .with_business(BusinessId::new("b2"), "k2");
        let sig = sign_hmac_hex(b"k1", b"b1|m1|0|n");
        assert!(book.verify_qr(&BusinessId::new("b1"), "b1|m1|0|n", &sig));
        assert!(!book.verify_qr(&BusinessId::new("b2"), "b1|m1|0|n", &sig));
    }
}
