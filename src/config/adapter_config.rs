//! Client adapter configuration
//!
//! Loaded from YAML or assembled from CLI flags. Every field has a default,
//! so an empty document is a valid config.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::utils::{Result, SentinelError};

fn default_connect_timeout_ms() -> u64 {
    2000
}

fn default_io_timeout_ms() -> u64 {
    5000
}

/// Connection settings shared by the concrete adapters
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct AdapterConfig {
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    #[serde(default = "default_io_timeout_ms")]
    pub read_timeout_ms: u64,

    #[serde(default = "default_io_timeout_ms")]
    pub write_timeout_ms: u64,

    /// Password for AUTH
    #[serde(default)]
    pub password: Option<String>,

    /// ACL username (requires `password`)
    #[serde(default)]
    pub username: Option<String>,

    /// Database to SELECT after connecting
    #[serde(default)]
    pub db: Option<u32>,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: default_connect_timeout_ms(),
            read_timeout_ms: default_io_timeout_ms(),
            write_timeout_ms: default_io_timeout_ms(),
            password: None,
            username: None,
            db: None,
        }
    }
}

impl AdapterConfig {
    /// Parse and validate a YAML document
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: AdapterConfig = serde_yaml::from_str(yaml)
            .map_err(|e| SentinelError::Config(format!("Invalid adapter config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a YAML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    pub fn validate(&self) -> Result<()> {
        if self.connect_timeout_ms == 0 {
            return Err(SentinelError::Config(
                "connect_timeout_ms must be greater than zero".to_string(),
            ));
        }
        if self.username.is_some() && self.password.is_none() {
            return Err(SentinelError::Config(
                "username requires a password".to_string(),
            ));
        }
        Ok(())
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Zero disables the timeout
    pub fn read_timeout(&self) -> Option<Duration> {
        (self.read_timeout_ms > 0).then(|| Duration::from_millis(self.read_timeout_ms))
    }

    /// Zero disables the timeout
    pub fn write_timeout(&self) -> Option<Duration> {
        (self.write_timeout_ms > 0).then(|| Duration::from_millis(self.write_timeout_ms))
    }
}
