//! Cooperative configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use cbank_types::{Address, GovernorSettings, InterestRateModel};

use crate::NodeError;

/// Configuration for bootstrapping a cooperative.
///
/// Can be loaded from a TOML file via [`CoopConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CoopConfig {
    /// Account that deploys the components and mints the genesis credentials.
    #[serde(default = "default_deployer")]
    pub deployer: Address,

    /// Members admitted at bootstrap, bypassing governance.
    #[serde(default)]
    pub genesis_members: Vec<Address>,

    #[serde(default = "default_registry_address")]
    pub registry_address: Address,

    #[serde(default = "default_pool_address")]
    pub pool_address: Address,

    #[serde(default = "default_governor_address")]
    pub governor_address: Address,

    /// Display name of the pool's position token.
    #[serde(default = "default_pool_name")]
    pub pool_name: String,

    #[serde(default = "default_pool_symbol")]
    pub pool_symbol: String,

    /// Symbol of the base asset the pool lends.
    #[serde(default = "default_asset_symbol")]
    pub asset_symbol: String,

    /// Base asset minted to the pool at bootstrap, in raw units.
    #[serde(default)]
    pub initial_reserves: u64,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub governor: GovernorSettings,

    #[serde(default)]
    pub interest_rate_model: InterestRateModel,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_deployer() -> Address {
    Address::new("cb_deployer")
}

fn default_registry_address() -> Address {
    Address::new("cb_registry")
}

fn default_pool_address() -> Address {
    Address::new("cb_pool")
}

fn default_governor_address() -> Address {
    Address::new("cb_governor")
}

fn default_pool_name() -> String {
    "DAI Pool".to_string()
}

fn default_pool_symbol() -> String {
    "pDAI".to_string()
}

fn default_asset_symbol() -> String {
    "DAI".to_string()
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl CoopConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, NodeError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| NodeError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, NodeError> {
        toml::from_str(s).map_err(|e| NodeError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, NodeError> {
        toml::to_string_pretty(self).map_err(|e| NodeError::Config(e.to_string()))
    }

    /// Check the configuration before it is used to bootstrap.
    pub fn validate(&self) -> Result<(), NodeError> {
        let components = [
            &self.deployer,
            &self.registry_address,
            &self.pool_address,
            &self.governor_address,
        ];
        for address in components.iter().copied().chain(&self.genesis_members) {
            if !address.is_valid() {
                return Err(NodeError::Config(format!("invalid address: {address}")));
            }
        }
        let distinct: HashSet<&Address> = components.iter().copied().collect();
        if distinct.len() != components.len() {
            return Err(NodeError::Config(
                "deployer, registry, pool and governor addresses must differ".to_string(),
            ));
        }
        let mut seen = HashSet::new();
        for member in &self.genesis_members {
            if !seen.insert(member) {
                return Err(NodeError::Config(format!("duplicate genesis member: {member}")));
            }
            if distinct.contains(member) && member != &self.deployer {
                return Err(NodeError::Config(format!(
                    "genesis member {member} is a component address"
                )));
            }
        }
        if !self.interest_rate_model.is_valid() {
            return Err(NodeError::Config(
                "interest_rate_model.term_secs must be greater than zero".to_string(),
            ));
        }
        if self.governor.voting_period_secs == 0 {
            return Err(NodeError::Config(
                "governor.voting_period_secs must be greater than zero".to_string(),
            ));
        }
        if u128::from(self.governor.quorum_bps) > cbank_types::BPS_DENOMINATOR {
            return Err(NodeError::Config(
                "governor.quorum_bps cannot exceed 10000".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for CoopConfig {
    fn default() -> Self {
        Self {
            deployer: default_deployer(),
            genesis_members: Vec::new(),
            registry_address: default_registry_address(),
            pool_address: default_pool_address(),
            governor_address: default_governor_address(),
            pool_name: default_pool_name(),
            pool_symbol: default_pool_symbol(),
            asset_symbol: default_asset_symbol(),
            initial_reserves: 0,
            log_format: default_log_format(),
            log_level: default_log_level(),
            governor: GovernorSettings::default(),
            interest_rate_model: InterestRateModel::default(),
        }
    }
}
