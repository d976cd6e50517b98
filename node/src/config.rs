//! Node configuration with TOML file support.

use serde::{Deserialize, Serialize};

use driplet_types::{FaucetParams, LedgerAddress};

use crate::NodeError;

/// Configuration for a driplet node.
///
/// Can be loaded from a TOML file via [`NodeConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Operator-controlled source account all payouts come from.
    #[serde(default = "default_source_address")]
    pub source_address: LedgerAddress,

    /// Base URL of the payment gateway.
    #[serde(default = "default_gateway_url")]
    pub gateway_url: String,

    /// Base URL of the hosted sign-in service.
    #[serde(default = "default_signin_api_url")]
    pub signin_api_url: String,

    /// Sign-in service credentials.
    #[serde(default)]
    pub signin_api_key: String,
    #[serde(default)]
    pub signin_api_secret: String,

    /// Seconds between sign-in status polls.
    #[serde(default = "default_signin_poll_secs")]
    pub signin_poll_secs: u64,

    /// Seconds before a pending sign-in times out.
    #[serde(default = "default_signin_max_wait_secs")]
    pub signin_max_wait_secs: u64,

    /// Seconds between expired-challenge sweeps.
    #[serde(default = "default_sweep_secs")]
    pub challenge_sweep_secs: u64,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Reward and cooldown parameters. Kept last so the TOML table
    /// serializes after the top-level values.
    #[serde(default)]
    pub faucet: FaucetParams,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_source_address() -> LedgerAddress {
    // The all-zero dev placeholder account. Operators must override this.
    LedgerAddress::parse("rrrrrrrrrrrrrrrrrrrrrhoLvTp")
        .expect("placeholder address is valid")
}

fn default_gateway_url() -> String {
    "http://localhost:7801".to_string()
}

fn default_signin_api_url() -> String {
    "https://xumm.app/api/v1/platform".to_string()
}

fn default_signin_poll_secs() -> u64 {
    5
}

fn default_signin_max_wait_secs() -> u64 {
    300
}

fn default_sweep_secs() -> u64 {
    60
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl NodeConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &str) -> Result<Self, NodeError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| NodeError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, NodeError> {
        let config: Self = toml::from_str(s).map_err(|e| NodeError::Config(e.to_string()))?;
        config
            .faucet
            .validate()
            .map_err(|e| NodeError::Config(e.to_string()))?;
        Ok(config)
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> String {
        toml::to_string_pretty(self).expect("NodeConfig is always serializable to TOML")
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            source_address: default_source_address(),
            gateway_url: default_gateway_url(),
            signin_api_url: default_signin_api_url(),
            signin_api_key: String::new(),
            signin_api_secret: String::new(),
            signin_poll_secs: default_signin_poll_secs(),
            signin_max_wait_secs: default_signin_max_wait_secs(),
            challenge_sweep_secs: default_sweep_secs(),
            log_format: default_log_format(),
            log_level: default_log_level(),
            faucet: FaucetParams::default(),
        }
    }
}
