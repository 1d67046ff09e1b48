//! Lock delay table.

use fluzio_types::{EngineParams, ProofType};

/// Days a reward stays locked, sized by how easily the proof type is forged.
///
/// High-value rewards and first purchases take the long delay when it is
/// longer than the type's own.
pub fn lock_delay_days(
    params: &EngineParams,
    proof_type: ProofType,
    high_value: bool,
    first_purchase: bool,
) -> u32 {
    let base = match proof_type {
        ProofType::Qr => params.delay_instant_days,
        ProofType::GpsDwell | ProofType::MediaUpload | ProofType::BookingWebhook => {
            params.delay_short_days
        }
        ProofType::PaymentWebhook | ProofType::Screenshot => params.delay_medium_days,
        ProofType::Referral => params.delay_long_days,
    };
    if high_value || first_purchase {
        base.max(params.delay_long_days)
    } else {
        base
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_matches_risk_tiers() {
        let p = EngineParams::default();
        let cases = [
            (ProofType::Qr, 0),
            (ProofType::GpsDwell, 3),
            (ProofType::MediaUpload, 3),
            (ProofType::BookingWebhook, 3),
            (ProofType::PaymentWebhook, 7),
            (ProofType::Screenshot, 7),
            (ProofType::Referral, 14),
        ];
        for (proof_type, days) in cases {
            assert_eq!(lock_delay_days(&p, proof_type, false, false), days, "{proof_type}");
        }
    }

    #[test]
    fn high_value_and_first_purchase_take_long_delay() {
        let p = EngineParams::default();
        assert_eq!(lock_delay_days(&p, ProofType::Qr, true, false), 14);
        assert_eq!(lock_delay_days(&p, ProofType::PaymentWebhook, false, true), 14);
    }
}
