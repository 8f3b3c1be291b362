//! Configuration for the verification engine
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, time::Duration};

use crate::error::{Error, Result};

/// Base trait for all configuration types
pub trait Configuration: Serialize + for<'de> Deserialize<'de> + Default {
    /// Validate the configuration
    fn validate(&self) -> Result<()>;

    /// Load configuration from a file
    fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::configuration(format!("Failed to read config file: {}", e)))?;

        Self::from_toml_str(&content)
    }

    /// Load configuration from a TOML string
    fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| Error::configuration(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a file
    fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::configuration(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, content)
            .map_err(|e| Error::configuration(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }
}

/// Endpoints of the chain oracles
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainConfig {
    #[serde(default = "default_ckb_rpc_url")]
    pub ckb_rpc_url: String,
    #[serde(default = "default_ckb_testnet_rpc_url")]
    pub ckb_testnet_rpc_url: String,
    #[serde(default = "default_bit_snapshot_url")]
    pub bit_snapshot_url: String,
    #[serde(default = "default_bit_testnet_snapshot_url")]
    pub bit_testnet_snapshot_url: String,
}

fn default_ckb_rpc_url() -> String {
    "https://mainnet.ckb.dev/rpc".to_string()
}

fn default_ckb_testnet_rpc_url() -> String {
    "https://testnet.ckb.dev/rpc".to_string()
}

fn default_bit_snapshot_url() -> String {
    "https://snapshot-api.did.id".to_string()
}

fn default_bit_testnet_snapshot_url() -> String {
    "https://test-snapshot-api.did.id".to_string()
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            ckb_rpc_url: default_ckb_rpc_url(),
            ckb_testnet_rpc_url: default_ckb_testnet_rpc_url(),
            bit_snapshot_url: default_bit_snapshot_url(),
            bit_testnet_snapshot_url: default_bit_testnet_snapshot_url(),
        }
    }
}

/// Verifier configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifierConfig {
    /// Maximum age of an authorship snapshot, inclusive
    #[serde(default = "default_staleness_window_secs")]
    pub staleness_window_secs: u64,

    /// Bound on concurrent leaf evaluations and snapshot fetches
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Timeout for each oracle or blob store call
    #[serde(default = "default_oracle_timeout_secs")]
    pub oracle_timeout_secs: u64,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Oracle endpoints
    #[serde(default)]
    pub chain: ChainConfig,
}

fn default_staleness_window_secs() -> u64 {
    30 * 60
}

fn default_max_concurrency() -> usize {
    5
}

fn default_oracle_timeout_secs() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            staleness_window_secs: default_staleness_window_secs(),
            max_concurrency: default_max_concurrency(),
            oracle_timeout_secs: default_oracle_timeout_secs(),
            log_level: default_log_level(),
            chain: ChainConfig::default(),
        }
    }
}

impl Configuration for VerifierConfig {
    fn validate(&self) -> Result<()> {
        if self.max_concurrency == 0 {
            return Err(Error::configuration("max_concurrency must be at least 1"));
        }

        if self.oracle_timeout_secs == 0 {
            return Err(Error::configuration("oracle_timeout_secs must be at least 1"));
        }

        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(Error::configuration(format!(
                    "Invalid log level: {}",
                    self.log_level
                )))
            }
        }

        Ok(())
    }
}

impl VerifierConfig {
    /// Load from `VOTY_CONFIG_FILE` if it exists, then apply `VOTY_*` overrides
    pub fn from_env() -> Result<Self> {
        let mut config = match std::env::var("VOTY_CONFIG_FILE") {
            Ok(path) if Path::new(&path).exists() => Self::from_file(&path)?,
            _ => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply `VOTY_*` overrides from a lookup function
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("VOTY_STALENESS_WINDOW_SECS") {
            self.staleness_window_secs = parse_override("VOTY_STALENESS_WINDOW_SECS", &value)?;
        }

        if let Some(value) = lookup("VOTY_MAX_CONCURRENCY") {
            self.max_concurrency = parse_override("VOTY_MAX_CONCURRENCY", &value)?;
        }

        if let Some(value) = lookup("VOTY_ORACLE_TIMEOUT_SECS") {
            self.oracle_timeout_secs = parse_override("VOTY_ORACLE_TIMEOUT_SECS", &value)?;
        }

        if let Some(level) = lookup("VOTY_LOG_LEVEL") {
            self.log_level = level;
        }

        if let Some(url) = lookup("VOTY_CKB_RPC_URL") {
            self.chain.ckb_rpc_url = url;
        }

        if let Some(url) = lookup("VOTY_BIT_SNAPSHOT_URL") {
            self.chain.bit_snapshot_url = url;
        }

        self.validate()
    }

    /// Staleness window as a chrono duration
    pub fn staleness_window(&self) -> chrono::Duration {
        let secs = i64::try_from(self.staleness_window_secs)
            .unwrap_or(i64::MAX)
            .min(i64::MAX / 1000);
        chrono::Duration::seconds(secs)
    }

    /// Per-call oracle timeout
    pub fn oracle_timeout(&self) -> Duration {
        Duration::from_secs(self.oracle_timeout_secs)
    }
}

fn parse_override<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::configuration(format!("Invalid value for {}: {}", key, value)))
}
