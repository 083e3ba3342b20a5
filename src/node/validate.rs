//! Address and port checks applied before a node is built

use std::fmt::Display;
use std::net::IpAddr;

use crate::utils::InvalidProperty;

/// Accept only IPv4 or IPv6 literals
///
/// Hostnames, malformed or out-of-range octets, IPv6 segments wider than
/// 16 bits and zone suffixes are all rejected.
pub fn validate_address(address: &str) -> Result<IpAddr, InvalidProperty> {
    address
        .parse::<IpAddr>()
        .map_err(|_| InvalidProperty::IpAddress(address.to_string()))
}

/// Accept any integer in [0, 65535]
///
/// Port 0 passes on purpose: it is the unset/ephemeral convention, even
/// though nothing can be dialed on it.
pub fn validate_port<P>(port: P) -> Result<u16, InvalidProperty>
where
    P: TryInto<u16> + Copy + Display,
{
    port.try_into()
        .map_err(|_| InvalidProperty::Port(port.to_string()))
}
