//! TCP connect implementation of [`Connector`].
//!
//! Completes a full handshake through the operating system's socket API.
//! No elevated privileges are needed.

use crate::scanner::traits::{Connector, PortStatus};
use async_trait::async_trait;
use socket2::SockRef;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpStream;
use tracing::trace;

/// Plain TCP connector.
///
/// With `reset_on_close` (the default) established connections get
/// `SO_LINGER` set to zero, so dropping the handle sends a RST instead of
/// parking the local port in TIME_WAIT. Large scans would otherwise burn
/// through ephemeral ports.
#[derive(Debug, Clone)]
pub struct TcpConnector {
    reset_on_close: bool,
}

impl TcpConnector {
    /// A connector with `reset_on_close` enabled.
    pub fn new() -> Self {
        Self {
            reset_on_close: true,
        }
    }

    /// Toggle the zero-linger close.
    pub fn with_reset_on_close(mut self, enabled: bool) -> Self {
        self.reset_on_close = enabled;
        self
    }
}

impl Default for TcpConnector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Connector for TcpConnector {
    type Handle = TcpStream;

    async fn connect(&self, addr: SocketAddr) -> io::Result<TcpStream> {
        let stream = TcpStream::connect(addr).await?;

        if self.reset_on_close {
            if let Err(e) = SockRef::from(&stream).set_linger(Some(Duration::ZERO)) {
                trace!(%addr, error = %e, "could not set SO_LINGER");
            }
        }

        Ok(stream)
    }
}

/// Map a failed connect to the status it implies for the port.
pub fn status_for_error(err: &io::Error) -> PortStatus {
    match err.kind() {
        io::ErrorKind::ConnectionRefused => PortStatus::Closed,
        io::ErrorKind::TimedOut => PortStatus::Filtered,
        _ => PortStatus::Unreachable,
    }
}

/// Errors that mean the local host ran out of sockets or ports.
///
/// These say nothing about the remote port, so they must not be reported as
/// a closed port.
pub fn is_resource_exhaustion(err: &io::Error) -> bool {
    if err.kind() == io::ErrorKind::AddrNotAvailable {
        return true;
    }

    #[cfg(unix)]
    {
        matches!(
            err.raw_os_error(),
            Some(libc::EMFILE | libc::ENFILE | libc::ENOBUFS | libc::EADDRNOTAVAIL)
        )
    }
    #[cfg(not(unix))]
    {
        false
    }
}
