//! The result of one scan.

use crate::scanner::traits::PortStatus;
use crate::types::{Port, ScanId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::time::Duration;

/// Everything a finished scan knows.
///
/// `open` is in discovery order, which depends on network timing. Compare
/// it as a set, or use [`ScanReport::open_sorted`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    /// Unique identifier for this scan.
    pub id: ScanId,
    /// Scanned address.
    pub target: IpAddr,
    /// When the scan was started.
    pub started_at: DateTime<Utc>,
    /// When the last attempt was retired.
    pub completed_at: DateTime<Utc>,
    /// Total scan duration in milliseconds.
    pub duration_ms: u64,
    /// Number of ports in the scanned set.
    pub ports_scanned: usize,
    /// Open ports, in the order they were discovered.
    pub open: Vec<Port>,
    pub closed: usize,
    pub filtered: usize,
    pub unreachable: usize,
    pub cancelled: usize,
    /// False when some attempts were cancelled before they resolved.
    pub complete: bool,
    /// Port expression tokens that were ignored.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<String>,
}

impl ScanReport {
    pub(crate) fn new(id: ScanId, target: IpAddr, ports_scanned: usize) -> Self {
        let now = Utc::now();
        Self {
            id,
            target,
            started_at: now,
            completed_at: now,
            duration_ms: 0,
            ports_scanned,
            open: Vec::new(),
            closed: 0,
            filtered: 0,
            unreachable: 0,
            cancelled: 0,
            complete: true,
            skipped: Vec::new(),
        }
    }

    /// Count one retired attempt. The caller guarantees each port is
    /// recorded as open at most once.
    pub(crate) fn record(&mut self, port: Port, status: PortStatus) {
        match status {
            PortStatus::Open => self.open.push(port),
            PortStatus::Closed => self.closed += 1,
            PortStatus::Filtered => self.filtered += 1,
            PortStatus::Unreachable => self.unreachable += 1,
            PortStatus::Cancelled => self.cancelled += 1,
        }
    }

    /// Close the report. Ports that were never launched count as cancelled.
    pub(crate) fn finalize(&mut self, elapsed: Duration) {
        self.cancelled += self.ports_scanned.saturating_sub(self.resolved());
        self.completed_at = Utc::now();
        self.duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        self.complete = self.cancelled == 0;
    }

    /// Number of attempts that reached a terminal state.
    pub fn resolved(&self) -> usize {
        self.open.len() + self.closed + self.filtered + self.unreachable + self.cancelled
    }

    /// Open ports in ascending order.
    pub fn open_sorted(&self) -> Vec<Port> {
        let mut open = self.open.clone();
        open.sort_unstable();
        open
    }

    /// One-line summary of the scan.
    pub fn summary(&self) -> String {
        format!(
            "{} - {} open, {} closed, {} filtered, {} unreachable of {} ports [{:.2}s]",
            self.target,
            self.open.len(),
            self.closed,
            self.filtered,
            self.unreachable,
            self.ports_scanned,
            self.duration_ms as f64 / 1000.0
        )
    }
}
