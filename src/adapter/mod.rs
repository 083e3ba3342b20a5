//! Client adapter capability
//!
//! A sentinel node never talks to a Redis client library directly. It owns
//! one `ClientAdapter`, pushes its endpoint into it once at construction,
//! and forwards `connect` / `is_connected` to it.
//!
//! Implementations:
//! - `RedisRsAdapter`: wraps the redis-rs blocking client (feature `redis-rs`,
//!   the default backend when enabled)
//! - `RawAdapter`: built-in TCP/RESP connection, the default without `redis-rs`
//! - `MockAdapter`: scripted test double

pub mod mock;
pub mod raw;
#[cfg(feature = "redis-rs")]
pub mod redis_rs;

pub use mock::{MockAdapter, MockCall, MockHandle};
pub use raw::RawAdapter;
#[cfg(feature = "redis-rs")]
pub use redis_rs::RedisRsAdapter;

use crate::config::AdapterConfig;
use crate::utils::ConnectionError;

/// Connection capability bound to a single sentinel endpoint
///
/// `set_address` and `set_port` only record values; validating them is
/// the node's job. `Send` so a node can be moved to a probing thread.
pub trait ClientAdapter: Send {
    /// Record the target host
    fn set_address(&mut self, address: &str);

    /// Record the target port
    fn set_port(&mut self, port: u16);

    /// Open a connection to the configured endpoint
    ///
    /// Blocks on network I/O. On failure the adapter reports not connected.
    fn connect(&mut self) -> Result<(), ConnectionError>;

    /// Last known connection state
    ///
    /// No I/O is performed. If the remote end goes away silently this keeps
    /// returning `true` until the next `connect` attempt.
    fn is_connected(&self) -> bool;

    /// Short backend label for logs
    fn backend(&self) -> &'static str {
        "custom"
    }
}

impl<A: ClientAdapter + ?Sized> ClientAdapter for Box<A> {
    fn set_address(&mut self, address: &str) {
        (**self).set_address(address)
    }

    fn set_port(&mut self, port: u16) {
        (**self).set_port(port)
    }

    fn connect(&mut self) -> Result<(), ConnectionError> {
        (**self).connect()
    }

    fn is_connected(&self) -> bool {
        (**self).is_connected()
    }

    fn backend(&self) -> &'static str {
        (**self).backend()
    }
}

/// Adapter used when a node is built without one
pub fn default_adapter() -> Box<dyn ClientAdapter> {
    configured_adapter(AdapterConfig::default())
}

/// Default backend with caller-supplied settings
#[cfg(feature = "redis-rs")]
pub fn configured_adapter(config: AdapterConfig) -> Box<dyn ClientAdapter> {
    Box::new(RedisRsAdapter::new(config))
}

/// Default backend with caller-supplied settings
#[cfg(not(feature = "redis-rs"))]
pub fn configured_adapter(config: AdapterConfig) -> Box<dyn ClientAdapter> {
    Box::new(RawAdapter::new(config))
}

/// Stored endpoint; both halves must be set before connecting
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Endpoint {
    pub address: Option<String>,
    pub port: Option<u16>,
}

impl Endpoint {
    pub fn get(&self) -> Result<(&str, u16), ConnectionError> {
        match (&self.address, self.port) {
            (Some(address), Some(port)) => Ok((address.as_str(), port)),
            _ => Err(ConnectionError::NotConfigured),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_requires_both_halves() {
        let mut endpoint = Endpoint::default();
        assert!(matches!(endpoint.get(), Err(ConnectionError::NotConfigured)));

        endpoint.address = Some("10.0.0.1".to_string());
        assert!(matches!(endpoint.get(), Err(ConnectionError::NotConfigured)));

        endpoint.port = Some(26379);
        assert_eq!(endpoint.get().unwrap(), ("10.0.0.1", 26379));
    }

    #[test]
    fn test_default_adapter_starts_disconnected() {
        let adapter = default_adapter();
        assert!(!adapter.is_connected());
    }

    #[cfg(feature = "redis-rs")]
    #[test]
    fn test_default_backend_is_redis_rs() {
        assert_eq!(default_adapter().backend(), "redis-rs");
    }

    #[cfg(not(feature = "redis-rs"))]
    #[test]
    fn test_default_backend_is_raw() {
        assert_eq!(default_adapter().backend(), "raw");
    }

    #[test]
    fn test_boxed_adapter_forwards() {
        let (mock, handle) = MockAdapter::succeeding();
        let mut boxed: Box<dyn ClientAdapter> = Box::new(mock);
        boxed.set_address("10.0.0.1");
        boxed.set_port(26379);
        boxed.connect().unwrap();

        assert!(boxed.is_connected());
        assert_eq!(boxed.backend(), "mock");
        assert_eq!(handle.address().as_deref(), Some("10.0.0.1"));
        assert_eq!(handle.port(), Some(26379));
    }
}
