//! Missions and their participation caps.

use crate::amount::RewardPoints;
use crate::geo::GeoPoint;
use crate::ids::{BusinessId, MissionId};
use crate::proof::ProofType;
use crate::time::Timestamp;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MissionConfigError {
    #[error("mission {mission}: one-time-only missions allow at most 1 participation per user, got {max}")]
    OneTimeWithMultipleParticipations { mission: String, max: u32 },

    #[error("mission {0}: proof type requires a business location")]
    MissingLocation(String),
}

/// Ceilings on participation that protect a business's reward budget.
///
/// `None` means unbounded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipationCapConfig {
    #[serde(default)]
    pub max_total_participants: Option<u32>,
    #[serde(default)]
    pub max_participants_per_day: Option<u32>,
    #[serde(default)]
    pub max_participations_per_user: Option<u32>,
    #[serde(default)]
    pub cooldown_period_days: u32,
    #[serde(default)]
    pub is_one_time_only: bool,
    #[serde(default)]
    pub requires_unique_proof: bool,
}

impl ParticipationCapConfig {
    /// No ceilings at all.
    pub fn unbounded() -> Self {
        Self {
            max_total_participants: None,
            max_participants_per_day: None,
            max_participations_per_user: None,
            cooldown_period_days: 0,
            is_one_time_only: false,
            requires_unique_proof: false,
        }
    }

    /// Enforce `is_one_time_only ⇒ max_participations_per_user ≤ 1`.
    pub fn validate(&self, mission: &MissionId) -> Result<(), MissionConfigError> {
        if self.is_one_time_only {
            if let Some(max) = self.max_participations_per_user {
                if max > 1 {
                    return Err(MissionConfigError::OneTimeWithMultipleParticipations {
                        mission: mission.to_string(),
                        max,
                    });
                }
            }
        }
        Ok(())
    }

    /// Per-user ceiling after folding in the one-time flag.
    pub fn effective_per_user_limit(&self) -> Option<u32> {
        match (self.is_one_time_only, self.max_participations_per_user) {
            (true, Some(max)) => Some(max.min(1)),
            (true, None) => Some(1),
            (false, max) => max,
        }
    }
}

impl Default for ParticipationCapConfig {
    fn default() -> Self {
        Self::unbounded()
    }
}

/// Default cap bundles a business can pick instead of configuring caps by hand.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapTier {
    Starter,
    Standard,
    Premium,
}

impl CapTier {
    pub fn defaults(&self) -> ParticipationCapConfig {
        match self {
            Self::Starter => ParticipationCapConfig {
                max_total_participants: Some(50),
                max_participants_per_day: Some(10),
                max_participations_per_user: Some(1),
                cooldown_period_days: 0,
                is_one_time_only: true,
                requires_unique_proof: true,
            },
            Self::Standard => ParticipationCapConfig {
                max_total_participants: Some(500),
                max_participants_per_day: Some(50),
                max_participations_per_user: Some(5),
                cooldown_period_days: 7,
                is_one_time_only: false,
                requires_unique_proof: true,
            },
            Self::Premium => ParticipationCapConfig {
                max_total_participants: None,
                max_participants_per_day: Some(200),
                max_participations_per_user: Some(10),
                cooldown_period_days: 1,
                is_one_time_only: false,
                requires_unique_proof: false,
            },
        }
    }
}

fn default_true() -> bool {
    true
}

/// A mission as configured by its owning business.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Mission {
    pub id: MissionId,
    pub business_id: BusinessId,
    pub proof_type: ProofType,
    pub reward_points: RewardPoints,
    /// Minimum order value for payment proofs, in cents.
    #[serde(default)]
    pub min_purchase_cents: u64,
    /// Minimum dwell time for GPS proofs, in seconds.
    #[serde(default)]
    pub min_duration_secs: u64,
    /// Explicit caps; always take precedence over `cap_tier`.
    #[serde(default)]
    pub caps: Option<ParticipationCapConfig>,
    #[serde(default)]
    pub cap_tier: Option<CapTier>,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    pub ends_at: Option<Timestamp>,
    /// Business coordinate for QR and GPS proofs.
    #[serde(default)]
    pub location: Option<GeoPoint>,
}

impl Mission {
    /// Caps in force: explicit config, else tier default, else unbounded.
    pub fn effective_caps(&self) -> ParticipationCapConfig {
        match (&self.caps, self.cap_tier) {
            (Some(explicit), _) => explicit.clone(),
            (None, Some(tier)) => tier.defaults(),
            (None, None) => ParticipationCapConfig::unbounded(),
        }
    }

    pub fn validate(&self) -> Result<(), MissionConfigError> {
        self.effective_caps().validate(&self.id)?;
        if matches!(self.proof_type, ProofType::Qr | ProofType::GpsDwell) && self.location.is_none() {
            return Err(MissionConfigError::MissingLocation(self.id.to_string()));
        }
        Ok(())
    }

    /// Active and not past its end window.
    pub fn is_open(&self, now: Timestamp) -> bool {
        self.active && self.ends_at.map_or(true, |end| now < end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mission(caps: Option<ParticipationCapConfig>, tier: Option<CapTier>) -> Mission {
        Mission {
            id: MissionId::new("m1"),
            business_id: BusinessId::new("b1"),
            proof_type: ProofType::MediaUpload,
            reward_points: RewardPoints::new(50),
            min_purchase_cents: 0,
            min_duration_secs: 0,
            caps,
            cap_tier: tier,
            active: true,
            ends_at: None,
            location: None,
        }
    }

    #[test]
    fn explicit_caps_override_tier() {
        let explicit = ParticipationCapConfig {
            max_total_participants: Some(3),
            ..ParticipationCapConfig::unbounded()
        };
        let m = mission(Some(explicit.clone()), Some(CapTier::Premium));
        assert_eq!(m.effective_caps(), explicit);
    }

    #[test]
    fn tier_applies_without_explicit_caps() {
        let m = mission(None, Some(CapTier::Starter));
        assert_eq!(m.effective_caps(), CapTier::Starter.defaults());
        assert_eq!(mission(None, None).effective_caps(), ParticipationCapConfig::unbounded());
    }

    #[test]
    fn one_time_with_multiple_participations_is_invalid() {
        let caps = ParticipationCapConfig {
            is_one_time_only: true,
            max_participations_per_user: Some(2),
            ..ParticipationCapConfig::unbounded()
        };
        assert!(mission(Some(caps), None).validate().is_err());
    }

    #[test]
    fn one_time_without_explicit_limit_means_one() {
        let caps = ParticipationCapConfig {
            is_one_time_only: true,
            ..ParticipationCapConfig::unbounded()
        };
        assert_eq!(caps.effective_per_user_limit(), Some(1));
    }

    #[test]
    fn qr_mission_needs_location() {
        let mut m = mission(None, None);
        m.proof_type = ProofType::Qr;
        assert!(matches!(m.validate(), Err(MissionConfigError::MissingLocation(_))));
    }

    #[test]
    fn mission_closes_at_end_window() {
        let mut m = mission(None, None);
        m.ends_at = Some(Timestamp::new(100));
        assert!(m.is_open(Timestamp::new(99)));
        assert!(!m.is_open(Timestamp::new(100)));
        m.ends_at = None;
        m.active = false;
        assert!(!m.is_open(Timestamp::new(0)));
    }
}
