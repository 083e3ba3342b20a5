//! Configuration

pub mod adapter_config;
pub mod cli;

pub use adapter_config::AdapterConfig;
pub use cli::{parse_endpoint, CliArgs};
