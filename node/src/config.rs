//! Engine configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use fluzio_crypto::SecretBook;
use fluzio_decision::DecisionPolicy;
use fluzio_types::{BusinessId, EngineParams, Mission};

use crate::NodeError;

/// Webhook signing secret for one provider (`stripe`, `calendly`, ...).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProviderSecret {
    pub name: String,
    pub secret: String,
}

/// QR signing secret for one business.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BusinessSecret {
    pub id: BusinessId,
    pub qr_secret: String,
}

/// External review platform that screenshot proofs may reference.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReviewApiConfig {
    pub base_url: String,
    #[serde(default = "default_review_timeout_ms")]
    pub timeout_ms: u64,
}

/// Configuration for a Fluzio engine.
///
/// Can be loaded from a TOML file via [`EngineConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "default_rpc_port")]
    pub rpc_port: u16,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Seconds between unlock sweeps.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,

    /// JSON snapshot restored on start and written on shutdown.
    #[serde(default)]
    pub snapshot_path: Option<PathBuf>,

    #[serde(default = "default_true")]
    pub enable_metrics: bool,

    #[serde(default)]
    pub params: EngineParams,

    #[serde(default)]
    pub policy: DecisionPolicy,

    #[serde(default)]
    pub providers: Vec<ProviderSecret>,

    #[serde(default)]
    pub businesses: Vec<BusinessSecret>,

    #[serde(default)]
    pub missions: Vec<Mission>,

    #[serde(default)]
    pub review_api: Option<ReviewApiConfig>,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_rpc_port() -> u16 {
    7080
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_sweep_interval_secs() -> u64 {
    60
}

fn default_review_timeout_ms() -> u64 {
    5_000
}

fn default_true() -> bool {
    true
}

// ── Impl ───────────────────────────────────────────────────────────────

impl EngineConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &str) -> Result<Self, NodeError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| NodeError::Config(format!("{path}: {e}")))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string and validate every mission.
    pub fn from_toml_str(s: &str) -> Result<Self, NodeError> {
        let config: Self = toml::from_str(s).map_err(|e| NodeError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), NodeError> {
        for mission in &self.missions {
            mission
                .validate()
                .map_err(|e| NodeError::Config(e.to_string()))?;
        }
        if self.sweep_interval_secs == 0 {
            return Err(NodeError::Config("sweep_interval_secs must be > 0".into()));
        }
        self.params
            .validate()
            .map_err(|e| NodeError::Config(e.to_string()))?;
        self.policy
            .validate()
            .map_err(|e| NodeError::Config(e.to_string()))?;
        Ok(())
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, NodeError> {
        toml::to_string_pretty(self).map_err(|e| NodeError::Config(e.to_string()))
    }

    /// The QR and webhook secrets as a lookup table.
    pub fn secret_book(&self) -> SecretBook {
        let book = self
            .providers
            .iter()
            .fold(SecretBook::new(), |book, p| book.with_provider(&p.name, &p.secret));
        self.businesses
            .iter()
            .fold(book, |book, b| book.with_business(b.id.clone(), &b.qr_secret))
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            rpc_port: default_rpc_port(),
            log_format: default_log_format(),
            log_level: default_log_level(),
            sweep_interval_secs: default_sweep_interval_secs(),
            snapshot_path: None,
            enable_metrics: default_true(),
            params: EngineParams::default(),
            policy: DecisionPolicy::default(),
            providers: Vec::new(),
            businesses: Vec::new(),
            missions: Vec::new(),
            review_api: None,
        }
    }
}
