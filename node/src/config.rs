//! Node configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use dagcore_ledger::ChainConfig;

use crate::{LogFormat, NodeError};

/// Configuration for a dagcore node.
///
/// Can be loaded from a TOML file via [`NodeConfig::from_toml_file`] or
/// built programmatically (e.g. for tests). Consensus parameters live in the
/// nested `[chain]` table.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Directory holding the LMDB environment.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// LMDB map size in bytes.
    #[serde(default = "default_map_size")]
    pub map_size: usize,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Milliseconds between finalization checks.
    #[serde(default = "default_finalize_interval_ms")]
    pub finalize_interval_ms: u64,

    /// Most blocks parked while waiting for a missing link.
    #[serde(default = "default_unchecked_max_size")]
    pub unchecked_max_size: usize,

    /// Seconds a parked block may wait before it is discarded.
    #[serde(default = "default_unchecked_max_age_secs")]
    pub unchecked_max_age_secs: u64,

    #[serde(default)]
    pub chain: ChainConfig,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_data_dir() -> PathBuf {
    PathBuf::from("./dagcore_data")
}

fn default_map_size() -> usize {
    1 << 30
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_finalize_interval_ms() -> u64 {
    1000
}

fn default_unchecked_max_size() -> usize {
    65536
}

fn default_unchecked_max_age_secs() -> u64 {
    600
}

// ── Impl ───────────────────────────────────────────────────────────────

impl NodeConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, NodeError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| NodeError::Config(e.to_string()))?;
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

    pub fn log_format(&self) -> Result<LogFormat, NodeError> {
        self.log_format.parse()
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            map_size: default_map_size(),
            log_format: default_log_format(),
            log_level: default_log_level(),
            finalize_interval_ms: default_finalize_interval_ms(),
            unchecked_max_size: default_unchecked_max_size(),
            unchecked_max_age_secs: default_unchecked_max_age_secs(),
            chain: ChainConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dagcore_types::NetworkId;

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = NodeConfig {
            chain: ChainConfig::devnet(),
            ..NodeConfig::default()
        };
        let toml_str = config.to_toml_string().unwrap();
        let parsed = NodeConfig::from_toml_str(&toml_str).expect("should parse");
        assert_eq!(parsed.finalize_interval_ms, config.finalize_interval_ms);
        assert_eq!(parsed.map_size, config.map_size);
        assert_eq!(parsed.chain, config.chain);
    }

    #[test]
    fn empty_toml_uses_defaults() {
        let config = NodeConfig::from_toml_str("").expect("empty toml should use defaults");
        assert_eq!(config.finalize_interval_ms, 1000);
        assert_eq!(config.log_format().unwrap(), LogFormat::Human);
        assert_eq!(config.chain, ChainConfig::default());
    }

    #[test]
    fn chain_table_overrides() {
        let toml = r#"
            log_format = "json"
            unchecked_max_size = 16

            [chain]
            network = "devnet"
            max_extra_blocks = 4
        "#;
        let config = NodeConfig::from_toml_str(toml).expect("should parse");
        assert_eq!(config.log_format().unwrap(), LogFormat::Json);
        assert_eq!(config.unchecked_max_size, 16);
        assert_eq!(config.chain.network, NetworkId::Devnet);
        assert_eq!(config.chain.max_extra_blocks, 4);
        assert_eq!(config.chain.confirmation_delay, 2048);
    }

    #[test]
    fn missing_file_returns_config_error() {
        let err = NodeConfig::from_toml_file("/nonexistent/dagcore.toml").unwrap_err();
        assert!(matches!(err, NodeError::Config(_)));
    }
}
