//! YAML configuration for the CLI.
//!
//! Every field has a default, so a file only needs the values it changes:
//!
//! ```yaml
//! backend_url: https://backend.example
//! network: testnet
//! protocol_params:
//!   minimum_utxo_value: 1000000
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use legacy_transfer::config::DEFAULT_ADDRESS_BATCH_SIZE;
use legacy_transfer::{Network, ProtocolParams};

/// Settings for talking to the backend and building transactions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    /// Base URL of the wallet backend.
    pub backend_url: String,
    /// Sent as the `yoroi-version` header.
    pub client_version: String,
    /// Sent as the `yoroi-locale` header.
    pub locale: String,
    pub network: Network,
    /// Addresses per UTXO lookup request.
    pub batch_size: usize,
    pub protocol_params: ProtocolParams,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            backend_url: "http://127.0.0.1:8080".to_string(),
            client_version: env!("CARGO_PKG_VERSION").to_string(),
            locale: "en-US".to_string(),
            network: Network::Mainnet,
            batch_size: DEFAULT_ADDRESS_BATCH_SIZE,
            protocol_params: ProtocolParams::default(),
        }
    }
}

impl SweepConfig {
    /// Load from `path`, or return the defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        serde_yaml::from_str(&raw)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }
}
