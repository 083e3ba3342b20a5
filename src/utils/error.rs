//! Error types for valkey-sentinel-node

use std::io;
use thiserror::Error;

/// Top-level error
#[derive(Error, Debug)]
pub enum SentinelError {
    #[error("Invalid property: {0}")]
    InvalidProperty(#[from] InvalidProperty),

    #[error("Connection error: {0}")]
    Connection(#[from] ConnectionError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Raised while constructing a sentinel node from invalid inputs
///
/// The rejected input is carried as text so it can be reported even when
/// it never fit the target type (e.g. a negative port).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidProperty {
    #[error("A sentinel node requires a valid IP address (got {0:?})")]
    IpAddress(String),

    #[error("A sentinel node requires a valid service port (got {0})")]
    Port(String),
}

/// Connection-related errors raised by client adapters
#[derive(Error, Debug)]
pub enum ConnectionError {
    #[error("Failed to connect to {host}:{port}: {source}")]
    ConnectFailed {
        host: String,
        port: u16,
        source: io::Error,
    },

    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    #[error("Handshake failed: {0}")]
    Handshake(String),

    #[error("Connection closed unexpectedly")]
    Closed,

    #[error("Connection timeout after {0}ms")]
    Timeout(u64),

    #[error("Adapter endpoint not configured")]
    NotConfigured,

    #[error("Node has no client adapter bound")]
    NoAdapter,

    #[error("Client backend error: {0}")]
    Backend(String),
}

pub type Result<T> = std::result::Result<T, SentinelError>;
