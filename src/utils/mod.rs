//! Utility modules

pub mod error;
pub mod resp;

pub use error::{ConnectionError, InvalidProperty, Result, SentinelError};
pub use resp::{RespDecoder, RespEncoder, RespValue};
