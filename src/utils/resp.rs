//! RESP (Redis Serialization Protocol) encoder and decoder
//!
//! Only what the connection handshake needs: command encoding as arrays
//! of bulk strings, and a streaming RESP2 decoder for replies.

use std::io::{self, BufRead, Read};

/// RESP value types
#[derive(Debug, Clone, PartialEq)]
pub enum RespValue {
    /// Simple string (+OK\r\n)
    SimpleString(String),
    /// Error (-ERR message\r\n)
    Error(String),
    /// Integer (:1000\r\n)
    Integer(i64),
    /// Bulk string ($6\r\nfoobar\r\n)
    BulkString(Vec<u8>),
    /// Null bulk string or null array ($-1\r\n, *-1\r\n)
    Null,
    /// Array (*2\r\n...)
    Array(Vec<RespValue>),
}

impl RespValue {
    pub fn is_error(&self) -> bool {
        matches!(self, RespValue::Error(_))
    }

    /// Get as string (for simple string or bulk string)
    pub fn as_str(&self) -> Option<&str> {
        match self {
            RespValue::SimpleString(s) => Some(s),
            RespValue::BulkString(b) => std::str::from_utf8(b).ok(),
            _ => None,
        }
    }

    /// True for `+OK`
    pub fn is_ok(&self) -> bool {
        matches!(self, RespValue::SimpleString(s) if s == "OK")
    }
}


/// Longest header line accepted (type byte, text and CRLF)
pub const MAX_LINE_LEN: usize = 64 * 1024;

/// Largest bulk string accepted; matches the server's default proto-max-bulk-len
pub const MAX_BULK_LEN: usize = 512 * 1024 * 1024;

/// Largest array element count accepted
pub const MAX_ARRAY_LEN: usize = 1024 * 1024;

const MAX_DEPTH: usize = 32;

fn invalid_data(msg: impl Into<String>) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, msg.into())
}

/// Command encoder writing RESP arrays of bulk strings
pub struct RespEncoder {
    buf: Vec<u8>,
}

impl RespEncoder {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    /// Clear buffer for reuse
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Append one command: `*<argc>` then `$<len>` + payload per argument
    pub fn encode_command(&mut self, args: &[&[u8]]) {
        self.push_header(b'*', args.len());
        for arg in args {
            self.push_header(b'$', arg.len());
            self.buf.extend_from_slice(arg);
            self.buf.extend_from_slice(b"\r\n");
        }
    }

    pub fn encode_command_str(&mut self, args: &[&str]) {
        let byte_args: Vec<&[u8]> = args.iter().map(|s| s.as_bytes()).collect();
        self.encode_command(&byte_args);
    }

    #[inline]
    fn push_header(&mut self, kind: u8, len: usize) {
        let mut digits = itoa::Buffer::new();
        self.buf.push(kind);
        self.buf.extend_from_slice(digits.format(len).as_bytes());
        self.buf.extend_from_slice(b"\r\n");
    }
}

/// Streaming reply decoder
///
/// Every length and line read from the peer is bounded, so a hostile or
/// broken server produces `InvalidData` instead of a huge allocation.
pub struct RespDecoder<R> {
    reader: R,
    header: Vec<u8>,
}

impl<R: BufRead> RespDecoder<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            header: Vec::with_capacity(128),
        }
    }

    /// Decode next RESP value from stream
    pub fn decode(&mut self) -> io::Result<RespValue> {
        self.decode_nested(0)
    }

    fn decode_nested(&mut self, depth: usize) -> io::Result<RespValue> {
        let (kind, text) = self.read_header()?;

        match kind {
            b'+' => Ok(RespValue::SimpleString(text)),
            b'-' => Ok(RespValue::Error(text)),
            b':' => text
                .parse()
                .map(RespValue::Integer)
                .map_err(|_| invalid_data(format!("Invalid integer: {:?}", text))),
            b'$' => match parse_length(&text, MAX_BULK_LEN, "bulk string")? {
                Some(len) => self.read_bulk(len).map(RespValue::BulkString),
                None => Ok(RespValue::Null),
            },
            b'*' => match parse_length(&text, MAX_ARRAY_LEN, "array")? {
                Some(count) => {
                    if depth >= MAX_DEPTH {
                        return Err(invalid_data("RESP array nested too deeply"));
                    }
                    // Grow as elements arrive rather than trusting the header
                    let mut elements = Vec::with_capacity(count.min(16));
                    for _ in 0..count {
                        elements.push(self.decode_nested(depth + 1)?);
                    }
                    Ok(RespValue::Array(elements))
                }
                None => Ok(RespValue::Null),
            },
            other => Err(invalid_data(format!(
                "Invalid RESP type byte: 0x{:02x}",
                other
            ))),
        }
    }

    /// Read one CRLF-terminated line and split off its type byte
    fn read_header(&mut self) -> io::Result<(u8, String)> {
        self.header.clear();
        let n = (&mut self.reader)
            .take(MAX_LINE_LEN as u64)
            .read_until(b'\n', &mut self.header)?;

        if n == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "Connection closed",
            ));
        }
        if self.header.last() != Some(&b'\n') {
            return Err(if n >= MAX_LINE_LEN {
                invalid_data("RESP line too long")
            } else {
                io::Error::new(io::ErrorKind::UnexpectedEof, "Truncated RESP line")
            });
        }

        let line = self.header.strip_suffix(b"\n").unwrap_or(&self.header[..]);
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        let (&kind, rest) = line
            .split_first()
            .ok_or_else(|| invalid_data("Empty RESP line"))?;

        Ok((kind, String::from_utf8_lossy(rest).into_owned()))
    }

    fn read_bulk(&mut self, len: usize) -> io::Result<Vec<u8>> {
        let mut data = Vec::new();
        (&mut self.reader).take(len as u64).read_to_end(&mut data)?;
        if data.len() != len {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "Truncated bulk string",
            ));
        }

        let mut crlf = [0u8; 2];
        self.reader.read_exact(&mut crlf)?;
        if &crlf != b"\r\n" {
            return Err(invalid_data("Bulk string not terminated by CRLF"));
        }

        Ok(data)
    }
}

/// `-1` is null; other negatives and anything above `max` are rejected
fn parse_length(text: &str, max: usize, what: &str) -> io::Result<Option<usize>> {
    let len: i64 = text
        .parse()
        .map_err(|_| invalid_data(format!("Invalid {} length: {:?}", what, text)))?;

    match len {
        -1 => Ok(None),
        n if n < 0 => Err(invalid_data(format!("Negative {} length: {}", what, n))),
        n if n as u64 > max as u64 => Err(invalid_data(format!(
            "{} length {} exceeds limit {}",
            what, n, max
        ))),
        n => Ok(Some(n as usize)),
    }
}
