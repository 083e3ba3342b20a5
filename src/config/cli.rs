//! Command-line argument parsing for the sentinel-check binary

use std::path::PathBuf;

use clap::Parser;

use super::AdapterConfig;
use crate::utils::{Result, SentinelError};

/// Connect to Redis/Valkey Sentinel nodes and report which ones accept a connection
#[derive(Parser, Debug, Clone)]
#[command(name = "sentinel-check")]
#[command(version, about, long_about = None)]
pub struct CliArgs {
    /// Sentinel endpoint as ip:port, IPv6 as [addr]:port (repeatable)
    #[arg(short = 's', long = "sentinel", required = true, action = clap::ArgAction::Append)]
    pub sentinels: Vec<String>,

    /// Sentinel set the nodes belong to, shown as `name@` in the report
    #[arg(short = 'n', long = "name")]
    pub name: Option<String>,

    /// Adapter config file (YAML)
    #[arg(long = "config")]
    pub config: Option<PathBuf>,

    /// Password for AUTH command
    #[arg(short = 'a', long = "auth")]
    pub password: Option<String>,

    /// Username for ACL AUTH (requires --auth)
    #[arg(long = "user")]
    pub username: Option<String>,

    /// Database number to SELECT after connecting
    #[arg(long = "db")]
    pub db: Option<u32>,

    /// Connect timeout in milliseconds
    #[arg(long = "connect-timeout-ms")]
    pub connect_timeout_ms: Option<u64>,

    /// Use the built-in RESP adapter instead of the default backend
    #[arg(long = "raw")]
    pub raw: bool,

    /// Verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// Only print errors
    #[arg(short = 'q', long = "quiet")]
    pub quiet: bool,
}

impl CliArgs {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// File config (or defaults) overridden by any flags given
    pub fn adapter_config(&self) -> Result<AdapterConfig> {
        let mut config = match &self.config {
            Some(path) => AdapterConfig::from_file(path)?,
            None => AdapterConfig::default(),
        };

        if let Some(ref password) = self.password {
            config.password = Some(password.clone());
        }
        if let Some(ref username) = self.username {
            config.username = Some(username.clone());
        }
        if let Some(db) = self.db {
            config.db = Some(db);
        }
        if let Some(ms) = self.connect_timeout_ms {
            config.connect_timeout_ms = ms;
        }

        config.validate()?;
        Ok(config)
    }

    /// Split every `--sentinel` value into address and port
    pub fn endpoints(&self) -> Result<Vec<(String, i64)>> {
        self.sentinels.iter().map(|s| parse_endpoint(s)).collect()
    }
}

/// Parse `ip:port` or `[ipv6]:port`
///
/// Only the shape is checked here; address and port validity is left to
/// node construction.
pub fn parse_endpoint(s: &str) -> Result<(String, i64)> {
    let bad = || SentinelError::Config(format!("Invalid sentinel endpoint: {:?}", s));

    let (host, port) = s.rsplit_once(':').ok_or_else(bad)?;
    let host = host
        .strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host);
    let port: i64 = port.parse().map_err(|_| bad())?;

    Ok((host.to_string(), port))
}
