//! Sentinel node representation
//!
//! A `SentinelNode` is one member of a Sentinel deployment: a validated IP
//! literal and port, an optional sentinel-set name, and (for connectable
//! nodes) exactly one client adapter configured with that endpoint.
//!
//! A node cannot be built from an invalid address or port, and neither can
//! be changed afterwards, so every node that exists is valid for its whole
//! lifetime. Connection failures never invalidate the node itself.

pub mod validate;

use std::fmt;
use std::net::{IpAddr, SocketAddr};

use crate::adapter::{configured_adapter, default_adapter, ClientAdapter};
use crate::config::AdapterConfig;
use crate::utils::{ConnectionError, InvalidProperty};

pub use validate::{validate_address, validate_port};

/// Identity shared by every kind of node
pub trait NodeIdentity {
    fn address(&self) -> &str;
    fn port(&self) -> u16;
}

/// One sentinel endpoint
pub struct SentinelNode {
    address: String,
    ip: IpAddr,
    port: u16,
    /// Sentinel set this node belongs to
    name: Option<String>,
    /// Absent for identity-only nodes
    adapter: Option<Box<dyn ClientAdapter>>,
}

impl SentinelNode {
    /// Connectable node using the default adapter
    pub fn new<P>(address: impl Into<String>, port: P) -> Result<Self, InvalidProperty>
    where
        P: TryInto<u16> + Copy + fmt::Display,
    {
        Self::build(address.into(), port, default_adapter)
    }

    /// Connectable node using the default adapter with the given settings
    pub fn with_config<P>(
        address: impl Into<String>,
        port: P,
        config: &AdapterConfig,
    ) -> Result<Self, InvalidProperty>
    where
        P: TryInto<u16> + Copy + fmt::Display,
    {
        Self::build(address.into(), port, || configured_adapter(config.clone()))
    }

    /// Connectable node using a caller-supplied adapter
    ///
    /// The adapter is only touched once validation has passed; on error it
    /// is dropped unconfigured.
    pub fn with_adapter<P, A>(
        address: impl Into<String>,
        port: P,
        adapter: A,
    ) -> Result<Self, InvalidProperty>
    where
        P: TryInto<u16> + Copy + fmt::Display,
        A: ClientAdapter + 'static,
    {
        Self::with_boxed_adapter(address, port, Box::new(adapter))
    }

    /// Same as `with_adapter` for an adapter that is already boxed
    pub fn with_boxed_adapter<P>(
        address: impl Into<String>,
        port: P,
        adapter: Box<dyn ClientAdapter>,
    ) -> Result<Self, InvalidProperty>
    where
        P: TryInto<u16> + Copy + fmt::Display,
    {
        Self::build(address.into(), port, move || adapter)
    }

    /// Identity-only node tagged with its sentinel-set name
    ///
    /// No adapter is bound: `connect` fails with `ConnectionError::NoAdapter`
    /// and `is_connected` is always false.
    pub fn named<P>(
        name: impl Into<String>,
        address: impl Into<String>,
        port: P,
    ) -> Result<Self, InvalidProperty>
    where
        P: TryInto<u16> + Copy + fmt::Display,
    {
        let address = address.into();
        let ip = validate_address(&address)?;
        let port = validate_port(port)?;

        Ok(Self {
            address,
            ip,
            port,
            name: Some(name.into()),
            adapter: None,
        })
    }

    /// Validate, then create and configure the adapter
    fn build<P, F>(
        address: String,
        port: P,
        make_adapter: F,
    ) -> Result<Self, InvalidProperty>
    where
        P: TryInto<u16> + Copy + fmt::Display,
        F: FnOnce() -> Box<dyn ClientAdapter>,
    {
        let ip = validate_address(&address)?;
        let port = validate_port(port)?;

        let mut adapter = make_adapter();
        adapter.set_address(&address);
        adapter.set_port(port);

        Ok(Self {
            address,
            ip,
            port,
            name: None,
            adapter: Some(adapter),
        })
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn ip(&self) -> IpAddr {
        self.ip
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.ip, self.port)
    }

    /// True when an adapter is bound
    pub fn is_connectable(&self) -> bool {
        self.adapter.is_some()
    }

    /// Label of the bound adapter's backend
    pub fn backend(&self) -> Option<&'static str> {
        self.adapter.as_ref().map(|a| a.backend())
    }

    /// Connect through the bound adapter
    ///
    /// Errors come back exactly as the adapter raised them; there is no
    /// retry here.
    pub fn connect(&mut self) -> Result<(), ConnectionError> {
        match self.adapter.as_mut() {
            Some(adapter) => adapter.connect(),
            None => Err(ConnectionError::NoAdapter),
        }
    }

    /// Adapter's cached connection state; see `ClientAdapter::is_connected`
    pub fn is_connected(&self) -> bool {
        self.adapter.as_ref().is_some_and(|a| a.is_connected())
    }
}

impl NodeIdentity for SentinelNode {
    fn address(&self) -> &str {
        &self.address
    }

    fn port(&self) -> u16 {
        self.port
    }
}

impl fmt::Display for SentinelNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref name) = self.name {
            write!(f, "{}@", name)?;
        }
        write!(f, "{}", self.socket_addr())
    }
}

impl fmt::Debug for SentinelNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SentinelNode")
            .field("address", &self.address)
            .field("port", &self.port)
            .field("name", &self.name)
            .field("connectable", &self.is_connectable())
            .field("connected", &self.is_connected())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::{MockAdapter, MockCall};
    use proptest::prelude::*;
    use std::net::{Ipv4Addr, Ipv6Addr};

    fn mock_node(address: &str, port: i64) -> (SentinelNode, crate::adapter::MockHandle) {
        let (mock, handle) = MockAdapter::succeeding();
        let node = SentinelNode::with_adapter(address, port, mock).unwrap();
        (node, handle)
    }

    #[test]
    fn test_valid_inputs_are_kept() {
        for (addr, port) in [
            ("10.0.0.1", 26379),
            ("192.168.1.254", 1),
            ("::1", 0),
            ("2001:db8::1", 65535),
        ] {
            let (node, _) = mock_node(addr, port);
            assert_eq!(node.address(), addr);
            assert_eq!(node.port() as i64, port);
            assert_eq!(node.name(), None);
        }
    }

    #[test]
    fn test_invalid_address_rejected_regardless_of_port() {
        for addr in ["999.1.1.1", "not-an-ip", ""] {
            for port in [26379, -1, 65536] {
                let (mock, handle) = MockAdapter::succeeding();
                let err = SentinelNode::with_adapter(addr, port, mock).unwrap_err();
                assert_eq!(err, InvalidProperty::IpAddress(addr.to_string()));
                assert!(handle.calls().is_empty());
            }
        }
    }

    #[test]
    fn test_out_of_range_port_rejected() {
        for port in [-1i64, 65536, 100_000] {
            let (mock, handle) = MockAdapter::succeeding();
            let err = SentinelNode::with_adapter("10.0.0.1", port, mock).unwrap_err();
            assert_eq!(err, InvalidProperty::Port(port.to_string()));
            // Adapter must not be configured for a node that was never built
            assert!(handle.calls().is_empty());
        }
    }

    #[test]
    fn test_adapter_configured_once_before_connect() {
        let (mut node, handle) = mock_node("10.0.0.1", 26379);

        assert_eq!(
            handle.calls(),
            vec![
                MockCall::SetAddress("10.0.0.1".to_string()),
                MockCall::SetPort(26379),
            ]
        );

        node.connect().unwrap();
        assert_eq!(handle.calls().len(), 3);
        assert_eq!(handle.calls()[2], MockCall::Connect);
    }

    #[test]
    fn test_connect_success() {
        let (mut node, _) = mock_node("10.0.0.1", 26379);
        assert!(!node.is_connected());

        node.connect().unwrap();
        assert!(node.is_connected());
    }

    #[test]
    fn test_connect_failure_propagates() {
        let (mock, handle) = MockAdapter::failing();
        let mut node = SentinelNode::with_adapter("10.0.0.1", 26379, mock).unwrap();

        let err = node.connect().unwrap_err();
        assert!(matches!(err, ConnectionError::Backend(ref m) if m == "connection refused"));
        assert!(!node.is_connected());
        assert_eq!(handle.connect_count(), 1);

        // Node stays a valid identity
        assert_eq!(node.address(), "10.0.0.1");
        assert_eq!(node.port(), 26379);
    }

    #[test]
    fn test_is_connected_is_idempotent() {
        let (mut node, handle) = mock_node("10.0.0.1", 26379);
        let first = node.is_connected();
        assert_eq!(node.is_connected(), first);
        assert_eq!(node.is_connected(), first);

        node.connect().unwrap();
        assert!(node.is_connected());
        assert!(node.is_connected());
        assert_eq!(handle.connect_count(), 1);
    }

    #[test]
    fn test_ipv6_with_port_zero() {
        let node = SentinelNode::new("::1", 0).unwrap();
        assert_eq!(node.address(), "::1");
        assert_eq!(node.port(), 0);
        assert!(node.is_connectable());
        assert!(!node.is_connected());
    }

    #[test]
    fn test_bad_octet_rejected_by_default_constructor() {
        assert_eq!(
            SentinelNode::new("256.1.1.1", 100).unwrap_err(),
            InvalidProperty::IpAddress("256.1.1.1".to_string())
        );
    }

    #[test]
    fn test_with_config_builds_connectable_node() {
        let config = AdapterConfig {
            connect_timeout_ms: 100,
            ..AdapterConfig::default()
        };
        let node = SentinelNode::with_config("10.0.0.1", 26379u16, &config).unwrap();
        assert!(node.is_connectable());
        assert!(SentinelNode::with_config("10.0.0.1", 70000, &config).is_err());
    }

    #[test]
    fn test_named_node_is_identity_only() {
        let mut node = SentinelNode::named("mymaster", "10.0.0.2", 26379).unwrap();
        assert_eq!(node.name(), Some("mymaster"));
        assert_eq!(node.address(), "10.0.0.2");
        assert_eq!(node.port(), 26379);
        assert!(!node.is_connectable());
        assert!(!node.is_connected());
        assert!(matches!(node.connect(), Err(ConnectionError::NoAdapter)));
    }

    #[test]
    fn test_named_node_validates() {
        assert!(SentinelNode::named("mymaster", "localhost", 26379).is_err());
        assert!(SentinelNode::named("mymaster", "10.0.0.2", -1).is_err());
        // Name is passed through untouched
        let node = SentinelNode::named("", "10.0.0.2", 26379).unwrap();
        assert_eq!(node.name(), Some(""));
    }

    #[test]
    fn test_identity_trait() {
        fn endpoint(node: &dyn NodeIdentity) -> String {
            format!("{}:{}", node.address(), node.port())
        }

        let named = SentinelNode::named("mymaster", "10.0.0.3", 26380).unwrap();
        let (connectable, _) = mock_node("10.0.0.4", 26381);
        assert_eq!(endpoint(&named), "10.0.0.3:26380");
        assert_eq!(endpoint(&connectable), "10.0.0.4:26381");
    }

    #[test]
    fn test_display() {
        let (node, _) = mock_node("::1", 26379);
        assert_eq!(node.to_string(), "[::1]:26379");
        assert_eq!(node.socket_addr(), "[::1]:26379".parse::<SocketAddr>().unwrap());

        let named = SentinelNode::named("mymaster", "10.0.0.1", 26379).unwrap();
        assert_eq!(named.to_string(), "mymaster@10.0.0.1:26379");
    }

    #[test]
    fn test_nodes_move_across_threads() {
        let nodes: Vec<SentinelNode> = (1..=3)
            .map(|i| mock_node(&format!("10.0.0.{}", i), 26379).0)
            .collect();

        let connected: Vec<bool> = std::thread::scope(|s| {
            let handles: Vec<_> = nodes
                .into_iter()
                .map(|mut node| {
                    s.spawn(move || {
                        node.connect().unwrap();
                        node.is_connected()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(connected, vec![true, true, true]);
    }

    #[test]
    fn test_boxed_adapter_is_bound_directly() {
        let (mock, handle) = MockAdapter::succeeding();
        let boxed: Box<dyn ClientAdapter> = Box::new(mock);
        let mut node = SentinelNode::with_boxed_adapter("10.0.0.9", 26379, boxed).unwrap();

        assert_eq!(node.backend(), Some("mock"));
        assert_eq!(handle.address().as_deref(), Some("10.0.0.9"));
        assert_eq!(handle.port(), Some(26379));
        node.connect().unwrap();
        assert!(node.is_connected());

        let (mock, handle) = MockAdapter::succeeding();
        assert!(SentinelNode::with_boxed_adapter("10.0.0.9", 65536, Box::new(mock)).is_err());
        assert!(handle.calls().is_empty());
    }

    #[test]
    fn test_named_node_has_no_backend() {
        let node = SentinelNode::named("mymaster", "10.0.0.1", 26379).unwrap();
        assert_eq!(node.backend(), None);
    }

    fn any_ip() -> impl Strategy<Value = IpAddr> {
        prop_oneof![
            any::<Ipv4Addr>().prop_map(IpAddr::V4),
            any::<Ipv6Addr>().prop_map(IpAddr::V6),
        ]
    }

    proptest! {
        #[test]
        fn prop_valid_endpoint_round_trips(ip in any_ip(), port in 0i64..=65535) {
            let address = ip.to_string();
            let (mock, handle) = MockAdapter::succeeding();
            let node = SentinelNode::with_adapter(address.clone(), port, mock).unwrap();

            prop_assert_eq!(node.address(), address.as_str());
            prop_assert_eq!(i64::from(node.port()), port);
            prop_assert_eq!(node.ip(), ip);
            prop_assert_eq!(
                handle.calls(),
                vec![MockCall::SetAddress(address), MockCall::SetPort(node.port())]
            );
        }

        #[test]
        fn prop_out_of_range_port_rejected(
            ip in any_ip(),
            port in prop_oneof![i64::MIN..0i64, 65536i64..=i64::MAX],
        ) {
            let (mock, handle) = MockAdapter::succeeding();
            let err = SentinelNode::with_adapter(ip.to_string(), port, mock).unwrap_err();

            prop_assert_eq!(err, InvalidProperty::Port(port.to_string()));
            prop_assert!(handle.calls().is_empty());
        }

        #[test]
        fn prop_hostname_rejected_for_any_port(
            host in "[g-z][g-z0-9.-]{0,30}",
            port in any::<i64>(),
        ) {
            let (mock, handle) = MockAdapter::succeeding();
            let err = SentinelNode::with_adapter(host.clone(), port, mock).unwrap_err();

            prop_assert_eq!(err, InvalidProperty::IpAddress(host));
            prop_assert!(handle.calls().is_empty());
        }

        #[test]
        fn prop_is_connected_stable_without_connect(ip in any_ip(), fail in any::<bool>()) {
            let (mock, _) = if fail { MockAdapter::failing() } else { MockAdapter::succeeding() };
            let mut node = SentinelNode::with_adapter(ip.to_string(), 26379, mock).unwrap();
            let _ = node.connect();

            let first = node.is_connected();
            prop_assert_eq!(first, !fail);
            for _ in 0..3 {
                prop_assert_eq!(node.is_connected(), first);
            }
        }
    }
}
