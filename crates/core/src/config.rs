// SPDX-License-Identifier: MIT

//! Typed configuration, handed to each component as an explicit value
//! rather than cached behind a process-wide singleton.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path:?}: {source}")]
    Read { path: String, #[source] source: std::io::Error },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

fn default_timeout_secs() -> u64 {
    5
}

fn default_weight() -> u32 {
    1
}

/// Connection parameters to the center, plus the agent's declared identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MicroConfig {
    pub endpoint: String,
    pub org_id: String,
    #[serde(default)]
    pub region: String,
    #[serde(default = "default_weight")]
    pub weight: u32,
}

/// Top-level agent configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Address this agent advertises to the registry; resolved to the
    /// machine's local ip when empty.
    #[serde(default)]
    pub address: String,
    pub micro: MicroConfig,
    #[serde(default)]
    pub projects: Vec<i64>,
    /// Interpreter used to run task commands; defaults to `["/bin/sh",
    /// "-c"]`, or `["cmd", "/C"]` on Windows.
    #[serde(default = "default_shell")]
    pub shell: Vec<String>,
    #[serde(default = "default_timeout_secs")]
    pub dial_timeout_secs: u64,
    #[serde(default)]
    pub log_level: String,
}

#[cfg(windows)]
fn default_shell() -> Vec<String> {
    vec!["cmd".to_string(), "/C".to_string()]
}

#[cfg(not(windows))]
fn default_shell() -> Vec<String> {
    vec!["/bin/sh".to_string(), "-c".to_string()]
}

impl AgentConfig {
    pub fn dial_timeout(&self) -> Duration {
        Duration::from_secs(self.dial_timeout_secs)
    }

    pub fn load(path: &std::path::Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.display().to_string(), source })?;
        Ok(toml::from_str(&text)?)
    }
}

/// Top-level center configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CenterConfig {
    pub listen_address: String,
    /// Organization this center instance serves; agents registering with
    /// a different value are still accepted (auth is out of scope) but
    /// the Dispatcher only ever looks up agents under this value.
    #[serde(default)]
    pub organization: String,
    #[serde(default = "default_timeout_secs")]
    pub dispatch_timeout_secs: u64,
    #[serde(default = "default_hash_interval_secs")]
    pub hash_reconcile_interval_secs: u64,
    #[serde(default = "default_lease_ttl_secs")]
    pub lease_ttl_secs: u64,
    #[serde(default)]
    pub log_level: String,
}

fn default_hash_interval_secs() -> u64 {
    60
}

fn default_lease_ttl_secs() -> u64 {
    180
}

impl CenterConfig {
    pub fn dispatch_timeout(&self) -> Duration {
        Duration::from_secs(self.dispatch_timeout_secs)
    }

    pub fn hash_reconcile_interval(&self) -> Duration {
        Duration::from_secs(self.hash_reconcile_interval_secs)
    }

    pub fn lease_ttl(&self) -> Duration {
        Duration::from_secs(self.lease_ttl_secs)
    }

    pub fn load(path: &std::path::Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.display().to_string(), source })?;
        Ok(toml::from_str(&text)?)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
