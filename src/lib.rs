//! valkey-sentinel-node library
//!
//! One Redis/Valkey Sentinel node: a validated endpoint identity that owns a
//! pluggable client adapter and delegates connection handling to it.

pub mod adapter;
pub mod client;
pub mod config;
pub mod node;
pub mod utils;

pub use adapter::{ClientAdapter, RawAdapter};
pub use node::{NodeIdentity, SentinelNode};
pub use utils::{ConnectionError, InvalidProperty, SentinelError};
