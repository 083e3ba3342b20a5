//! Adapter backed by the redis-rs blocking client

use redis::{Client, Connection, ConnectionAddr, ConnectionInfo, RedisConnectionInfo};
use tracing::debug;

use super::{ClientAdapter, Endpoint};
use crate::config::AdapterConfig;
use crate::utils::ConnectionError;

/// Adapter wrapping `redis::Connection`
#[derive(Default)]
pub struct RedisRsAdapter {
    config: AdapterConfig,
    endpoint: Endpoint,
    conn: Option<Connection>,
}

impl RedisRsAdapter {
    pub fn new(config: AdapterConfig) -> Self {
        Self {
            config,
            endpoint: Endpoint::default(),
            conn: None,
        }
    }

    /// Open connection, if any
    pub fn connection(&mut self) -> Option<&mut Connection> {
        self.conn.as_mut()
    }

    fn connection_info(&self) -> Result<ConnectionInfo, ConnectionError> {
        let (host, port) = self.endpoint.get()?;
        Ok(ConnectionInfo {
            addr: ConnectionAddr::Tcp(host.to_string(), port),
            redis: RedisConnectionInfo {
                db: self.config.db.map(i64::from).unwrap_or(0),
                username: self.config.username.clone(),
                password: self.config.password.clone(),
                ..RedisConnectionInfo::default()
            },
        })
    }

    fn open(&self) -> Result<Connection, ConnectionError> {
        let info = self.connection_info()?;
        let client = Client::open(info).map_err(backend_error)?;
        let mut conn = client
            .get_connection_with_timeout(self.config.connect_timeout())
            .map_err(backend_error)?;

        conn.set_read_timeout(self.config.read_timeout())
            .map_err(backend_error)?;
        conn.set_write_timeout(self.config.write_timeout())
            .map_err(backend_error)?;

        let pong: String = redis::cmd("PING").query(&mut conn).map_err(backend_error)?;
        if pong != "PONG" {
            return Err(ConnectionError::Handshake(format!(
                "Unexpected PING response: {}",
                pong
            )));
        }

        Ok(conn)
    }
}

fn backend_error(e: redis::RedisError) -> ConnectionError {
    if e.is_timeout() {
        ConnectionError::Backend(format!("timed out: {}", e))
    } else {
        ConnectionError::Backend(e.to_string())
    }
}

impl ClientAdapter for RedisRsAdapter {
    fn set_address(&mut self, address: &str) {
        self.endpoint.address = Some(address.to_string());
    }

    fn set_port(&mut self, port: u16) {
        self.endpoint.port = Some(port);
    }

    fn connect(&mut self) -> Result<(), ConnectionError> {
        self.conn = None;

        match self.open() {
            Ok(conn) => {
                debug!(endpoint = ?self.endpoint, "connected to sentinel via redis-rs");
                self.conn = Some(conn);
                Ok(())
            }
            Err(e) => {
                debug!(endpoint = ?self.endpoint, error = %e, "redis-rs connect failed");
                Err(e)
            }
        }
    }

    fn is_connected(&self) -> bool {
        self.conn.is_some()
    }

    fn backend(&self) -> &'static str {
        "redis-rs"
    }
}
