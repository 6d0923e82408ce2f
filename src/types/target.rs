//! Scan target validation.
//!
//! A target is a literal IPv4 or IPv6 address. Hostnames are rejected up
//! front so a scan never starts against something that was not validated.
//! Link-local IPv6 targets may carry a numeric zone (`fe80::1%2`), which
//! becomes the scope id of every connect.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{IpAddr, SocketAddr, SocketAddrV6};
use std::str::FromStr;

/// A validated scan target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScanTarget {
    ip: IpAddr,
    /// IPv6 scope id, 0 when no zone was given.
    #[serde(default, skip_serializing_if = "is_zero")]
    scope_id: u32,
}

fn is_zero(n: &u32) -> bool {
    *n == 0
}

impl ScanTarget {
    /// Parse a textual IP address. IPv6 may be wrapped in brackets and may
    /// end in a numeric zone such as `%3`.
    pub fn parse(s: &str) -> Result<Self, TargetError> {
        let invalid = || TargetError::InvalidAddress(s.to_string());

        let trimmed = s.trim();
        let unbracketed = trimmed
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
            .unwrap_or(trimmed);

        let (addr, zone) = match unbracketed.split_once('%') {
            Some((addr, zone)) => (addr, Some(zone)),
            None => (unbracketed, None),
        };

        let ip: IpAddr = addr.parse().map_err(|_| invalid())?;
        let scope_id = match zone {
            None => 0,
            Some(zone) if ip.is_ipv6() => zone.parse().map_err(|_| invalid())?,
            Some(_) => return Err(invalid()),
        };

        Ok(Self { ip, scope_id })
    }

    /// The address to connect to.
    pub fn ip(&self) -> IpAddr {
        self.ip
    }

    /// Socket address for `port`, carrying the zone for IPv6.
    pub fn socket_addr(&self, port: u16) -> SocketAddr {
        match self.ip {
            IpAddr::V6(ip) => SocketAddr::V6(SocketAddrV6::new(ip, port, 0, self.scope_id)),
            ip => SocketAddr::new(ip, port),
        }
    }
}

impl From<IpAddr> for ScanTarget {
    fn from(ip: IpAddr) -> Self {
        Self { ip, scope_id: 0 }
    }
}

impl FromStr for ScanTarget {
    type Err = TargetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ScanTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.scope_id == 0 {
            write!(f, "{}", self.ip)
        } else {
            write!(f, "{}%{}", self.ip, self.scope_id)
        }
    }
}

/// Error type for target parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TargetError {
    #[error("{0:?} is not a valid IPv4 or IPv6 address")]
    InvalidAddress(String),
}
