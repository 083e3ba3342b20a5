//! Default adapter over the built-in TCP/RESP connection

use tracing::debug;

use super::{ClientAdapter, Endpoint};
use crate::client::{ConnectionFactory, RawConnection};
use crate::config::AdapterConfig;
use crate::utils::ConnectionError;

/// Adapter that opens a `RawConnection` and confirms it with PING
#[derive(Default)]
pub struct RawAdapter {
    factory: ConnectionFactory,
    endpoint: Endpoint,
    conn: Option<RawConnection>,
}

impl RawAdapter {
    pub fn new(config: AdapterConfig) -> Self {
        Self {
            factory: ConnectionFactory::new(config),
            endpoint: Endpoint::default(),
            conn: None,
        }
    }

    /// Open connection, if any
    pub fn connection(&mut self) -> Option<&mut RawConnection> {
        self.conn.as_mut()
    }

    fn open(&self) -> Result<RawConnection, ConnectionError> {
        let (host, port) = self.endpoint.get()?;
        let mut conn = self.factory.create(host, port)?;
        conn.ping()?;
        Ok(conn)
    }
}

impl ClientAdapter for RawAdapter {
    fn set_address(&mut self, address: &str) {
        self.endpoint.address = Some(address.to_string());
    }

    fn set_port(&mut self, port: u16) {
        self.endpoint.port = Some(port);
    }

    fn connect(&mut self) -> Result<(), ConnectionError> {
        // A failed reconnect must not leave the old connection reporting true
        self.conn = None;

        match self.open() {
            Ok(conn) => {
                debug!(endpoint = ?self.endpoint, "connected to sentinel");
                self.conn = Some(conn);
                Ok(())
            }
            Err(e) => {
                debug!(endpoint = ?self.endpoint, error = %e, "sentinel connect failed");
                Err(e)
            }
        }
    }

    fn is_connected(&self) -> bool {
        self.conn.is_some()
    }

    fn backend(&self) -> &'static str {
        "raw"
    }
}
