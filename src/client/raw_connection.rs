//! Raw TCP connection to a sentinel
//!
//! Blocking socket with buffered reader/writer and just enough RESP to run
//! the connection handshake (AUTH, SELECT, PING).

use std::io::{self, BufReader, BufWriter, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use crate::config::AdapterConfig;
use crate::utils::{ConnectionError, RespDecoder, RespEncoder, RespValue};

/// Raw connection wrapper
pub struct RawConnection {
    host: String,
    port: u16,
    writer: BufWriter<TcpStream>,
    reader: BufReader<TcpStream>,
}

impl RawConnection {
    /// Create new TCP connection
    ///
    /// `host` may be a hostname, an IPv4 literal or a bare IPv6 literal.
    pub fn connect_tcp(
        host: &str,
        port: u16,
        connect_timeout: Duration,
    ) -> Result<Self, ConnectionError> {
        let connect_failed = |source: io::Error| ConnectionError::ConnectFailed {
            host: host.to_string(),
            port,
            source,
        };

        let addr = (host, port)
            .to_socket_addrs()
            .map_err(connect_failed)?
            .next()
            .ok_or_else(|| {
                connect_failed(io::Error::new(
                    io::ErrorKind::NotFound,
                    "No addresses found",
                ))
            })?;

        let stream = TcpStream::connect_timeout(&addr, connect_timeout).map_err(|e| {
            if e.kind() == io::ErrorKind::TimedOut {
                ConnectionError::Timeout(connect_timeout.as_millis() as u64)
            } else {
                connect_failed(e)
            }
        })?;

        stream.set_nodelay(true).ok();

        let writer = BufWriter::with_capacity(4096, stream.try_clone().map_err(connect_failed)?);
        let reader = BufReader::with_capacity(4096, stream);

        Ok(RawConnection {
            host: host.to_string(),
            port,
            writer,
            reader,
        })
    }

    /// Send command and receive response
    pub fn execute(&mut self, encoder: &RespEncoder) -> io::Result<RespValue> {
        self.writer.write_all(encoder.as_bytes())?;
        self.writer.flush()?;
        RespDecoder::new(&mut self.reader).decode()
    }

    fn execute_str(&mut self, args: &[&str]) -> io::Result<RespValue> {
        let mut encoder = RespEncoder::with_capacity(64);
        encoder.encode_command_str(args);
        self.execute(&encoder)
    }

    /// Send AUTH command
    pub fn authenticate(
        &mut self,
        password: &str,
        username: Option<&str>,
    ) -> Result<(), ConnectionError> {
        let response = match username {
            Some(user) => self.execute_str(&["AUTH", user, password]),
            None => self.execute_str(&["AUTH", password]),
        }
        .map_err(|e| self.io_failure(e))?;

        match response {
            r if r.is_ok() => Ok(()),
            RespValue::Error(e) => Err(ConnectionError::AuthFailed(e)),
            other => Err(ConnectionError::AuthFailed(format!(
                "Unexpected response: {:?}",
                other
            ))),
        }
    }

    /// Send SELECT command
    pub fn select_db(&mut self, db: u32) -> Result<(), ConnectionError> {
        let db_str = db.to_string();
        let response = self
            .execute_str(&["SELECT", &db_str])
            .map_err(|e| self.io_failure(e))?;

        match response {
            r if r.is_ok() => Ok(()),
            other => Err(ConnectionError::Handshake(format!(
                "Unexpected SELECT response: {:?}",
                other
            ))),
        }
    }

    /// Send PING and require PONG
    ///
    /// An error reply such as `-NOAUTH` or `-LOADING` is passed on verbatim.
    pub fn ping(&mut self) -> Result<(), ConnectionError> {
        let reply = self
            .execute_str(&["PING"])
            .map_err(|e| self.io_failure(e))?;

        match reply {
            RespValue::SimpleString(s) if s == "PONG" => Ok(()),
            RespValue::Error(e) => Err(ConnectionError::Handshake(e)),
            other => Err(ConnectionError::Handshake(format!(
                "Unexpected PING response: {:?}",
                other
            ))),
        }
    }

    /// Peer hanging up maps to `Closed`; anything else keeps the io error
    fn io_failure(&self, e: io::Error) -> ConnectionError {
        match e.kind() {
            io::ErrorKind::UnexpectedEof => ConnectionError::Closed,
            _ => ConnectionError::ConnectFailed {
                host: self.host.clone(),
                port: self.port,
                source: e,
            },
        }
    }

    pub fn set_read_timeout(&mut self, timeout: Option<Duration>) -> io::Result<()> {
        self.reader.get_ref().set_read_timeout(timeout)
    }

    pub fn set_write_timeout(&mut self, timeout: Option<Duration>) -> io::Result<()> {
        self.writer.get_ref().set_write_timeout(timeout)
    }
}

/// Connection factory for creating connections with common config
#[derive(Debug, Clone, Default)]
pub struct ConnectionFactory {
    config: AdapterConfig,
}

impl ConnectionFactory {
    pub fn new(config: AdapterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    /// Connect, apply timeouts, then AUTH and SELECT when configured
    pub fn create(&self, host: &str, port: u16) -> Result<RawConnection, ConnectionError> {
        let mut conn = RawConnection::connect_tcp(host, port, self.config.connect_timeout())?;

        conn.set_read_timeout(self.config.read_timeout()).ok();
        conn.set_write_timeout(self.config.write_timeout()).ok();

        if let Some(ref password) = self.config.password {
            conn.authenticate(password, self.config.username.as_deref())?;
        }

        if let Some(db) = self.config.db {
            conn.select_db(db)?;
        }

        Ok(conn)
    }
}
