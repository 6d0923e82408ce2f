//! Connector trait and attempt status types.
//!
//! The scanner never talks to sockets directly: it drives a [`Connector`],
//! which keeps the coordination logic testable without a network.

use crate::types::Port;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;

/// Terminal status of a connection attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortStatus {
    /// Handshake completed.
    Open,
    /// Connection refused (RST received).
    Closed,
    /// No answer before the connect timeout.
    Filtered,
    /// Any other connect error: host or network unreachable, reset, ...
    Unreachable,
    /// Aborted before it resolved.
    Cancelled,
}

impl PortStatus {
    /// Check if the port accepted a connection.
    pub fn is_open(self) -> bool {
        matches!(self, Self::Open)
    }
}

impl fmt::Display for PortStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Closed => write!(f, "closed"),
            Self::Filtered => write!(f, "filtered"),
            Self::Unreachable => write!(f, "unreachable"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Emitted once per attempt, as soon as it is retired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanEvent {
    pub port: Port,
    pub status: PortStatus,
    /// Time from launch to resolution.
    pub elapsed: Duration,
}

impl ScanEvent {
    pub fn is_open(&self) -> bool {
        self.status.is_open()
    }
}

/// Opens connections on behalf of the scanner.
///
/// The returned handle is owned by exactly one attempt. The scanner drops it
/// as soon as the attempt is retired, which is the only place a handle is
/// released. Implementations must not apply their own timeout policy; the
/// scanner bounds every call with its connect timeout.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    /// An established connection.
    type Handle: Send + 'static;

    /// Try to establish a connection to `addr`.
    async fn connect(&self, addr: SocketAddr) -> io::Result<Self::Handle>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_status_display() {
        assert_eq!(PortStatus::Open.to_string(), "open");
        assert_eq!(PortStatus::Closed.to_string(), "closed");
        assert_eq!(PortStatus::Filtered.to_string(), "filtered");
        assert_eq!(PortStatus::Unreachable.to_string(), "unreachable");
        assert_eq!(PortStatus::Cancelled.to_string(), "cancelled");
    }

    #[test]
    fn test_only_open_is_open() {
        assert!(PortStatus::Open.is_open());
        for status in [
            PortStatus::Closed,
            PortStatus::Filtered,
            PortStatus::Unreachable,
            PortStatus::Cancelled,
        ] {
            assert!(!status.is_open());
        }
    }

    #[test]
    fn test_port_status_serde() {
        let json = serde_json::to_string(&PortStatus::Filtered).unwrap();
        assert_eq!(json, "\"filtered\"");
    }
}
