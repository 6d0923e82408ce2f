//! Scanner module - the concurrent connect scan.
//!
//! A launcher task spawns one tokio task per port, gated by a semaphore and
//! an optional rate limiter, and registers each attempt in an
//! [`AttemptRegistry`]. Finished attempts report back over a channel; the
//! coordinator retires them, releases their handles, streams a
//! [`ScanEvent`] per attempt and returns once the registry is empty.

pub mod rate_limiter;
pub mod registry;
pub mod report;
pub mod tcp;
pub mod traits;

pub use rate_limiter::RateLimiter;
pub use registry::{AttemptId, AttemptRegistry, PendingAttempt};
pub use report::ScanReport;
pub use tcp::TcpConnector;
pub use traits::{Connector, PortStatus, ScanEvent};

use crate::error::{ScanError, ScanResult};
use crate::types::{Port, PortSet, ScanId, ScanTarget};
use futures::channel::mpsc;
use futures::StreamExt;
use nonzero_ext::nonzero;
use std::collections::HashSet;
use std::io;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::{JoinError, JoinHandle, JoinSet};
use tokio::time::{self, Instant};
use tracing::{debug, info, info_span, trace, warn, Instrument};

/// Connect timeout used when none is configured.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_millis(3000);

/// Upper bound accepted for the connect timeout.
pub const MAX_CONNECT_TIMEOUT: Duration = Duration::from_secs(60);

/// In-flight attempts allowed when none is configured.
pub const DEFAULT_CONCURRENCY: NonZeroUsize = nonzero!(500usize);

/// Upper bound accepted for the concurrency cap, one attempt per port.
pub const MAX_CONCURRENCY: usize = Port::MAX as usize;

/// Tuning for a scan.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Per-attempt bound; an attempt still pending after this is `Filtered`.
    pub connect_timeout: Duration,
    /// Maximum number of attempts holding a socket at once.
    pub concurrency: NonZeroUsize,
    /// Attempts launched per second, 0 for unlimited.
    pub rate_limit: u32,
    /// Optional bound on the whole scan.
    pub scan_timeout: Option<Duration>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            concurrency: DEFAULT_CONCURRENCY,
            rate_limit: 0,
            scan_timeout: None,
        }
    }
}

impl ScanOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the per-attempt connect timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the concurrency cap.
    pub fn with_concurrency(mut self, concurrency: NonZeroUsize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Set the launch rate (0 = unlimited).
    pub fn with_rate_limit(mut self, rate: u32) -> Self {
        self.rate_limit = rate;
        self
    }

    /// Abort attempts still pending after `limit`.
    pub fn with_scan_timeout(mut self, limit: Duration) -> Self {
        self.scan_timeout = Some(limit);
        self
    }

    /// Reject settings that could stall a scan.
    pub fn validate(&self) -> ScanResult<()> {
        if self.connect_timeout.is_zero() {
            return Err(ScanError::InvalidConfig(
                "connect timeout must be greater than zero".to_string(),
            ));
        }
        if self.connect_timeout > MAX_CONNECT_TIMEOUT {
            return Err(ScanError::InvalidConfig(format!(
                "connect timeout must not exceed {}s",
                MAX_CONNECT_TIMEOUT.as_secs()
            )));
        }
        if self.concurrency.get() > MAX_CONCURRENCY {
            return Err(ScanError::InvalidConfig(format!(
                "concurrency must not exceed {}",
                MAX_CONCURRENCY
            )));
        }
        if self.scan_timeout.is_some_and(|t| t.is_zero()) {
            return Err(ScanError::InvalidConfig(
                "scan timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Parse `host` and `ports`, then scan with the TCP connector.
///
/// Fails with [`ScanError::InvalidHost`] or [`ScanError::EmptyPortSet`]
/// before any connection is attempted.
pub async fn run_scan(host: &str, ports: &str, options: ScanOptions) -> ScanResult<ScanReport> {
    run_scan_with(host, ports, options, |_| {}).await
}

/// Like [`run_scan`], calling `on_event` as each attempt resolves.
pub async fn run_scan_with<F>(
    host: &str,
    ports: &str,
    options: ScanOptions,
    on_event: F,
) -> ScanResult<ScanReport>
where
    F: FnMut(&ScanEvent) + Send,
{
    let target = ScanTarget::parse(host)?;
    let parsed = PortSet::parse(ports);
    for reason in &parsed.skipped {
        warn!(%reason, "ignoring port token");
    }
    if parsed.ports.is_empty() {
        return Err(ScanError::EmptyPortSet {
            skipped: parsed.skipped,
        });
    }

    let mut report = ConnectScanner::new(options)
        .scan_with(target, &parsed.ports, on_event)
        .await?;
    report.skipped = parsed.skipped.iter().map(ToString::to_string).collect();
    Ok(report)
}

/// Concurrent connect scanner over any [`Connector`].
pub struct ConnectScanner<C: Connector = TcpConnector> {
    connector: Arc<C>,
    options: ScanOptions,
}

impl ConnectScanner<TcpConnector> {
    /// A scanner using plain TCP connects.
    pub fn new(options: ScanOptions) -> Self {
        Self::with_connector(TcpConnector::new(), options)
    }
}

impl<C: Connector> ConnectScanner<C> {
    pub fn with_connector(connector: C, options: ScanOptions) -> Self {
        Self {
            connector: Arc::new(connector),
            options,
        }
    }

    /// Scan `ports` on `target` and return the report.
    pub async fn scan(
        &self,
        target: impl Into<ScanTarget>,
        ports: &PortSet,
    ) -> ScanResult<ScanReport> {
        self.scan_with(target, ports, |_| {}).await
    }

    /// Scan `ports` on `target`, calling `on_event` once per attempt as soon
    /// as it is retired. Open ports are reported in discovery order.
    pub async fn scan_with<F>(
        &self,
        target: impl Into<ScanTarget>,
        ports: &PortSet,
        on_event: F,
    ) -> ScanResult<ScanReport>
    where
        F: FnMut(&ScanEvent) + Send,
    {
        let target = target.into();
        self.options.validate()?;
        if ports.is_empty() {
            return Err(ScanError::EmptyPortSet {
                skipped: Vec::new(),
            });
        }

        let id = ScanId::new();
        let span = info_span!("scan", id = %id.short(), %target);
        self.coordinate(id, target, ports, on_event)
            .instrument(span)
            .await
    }

    async fn coordinate<F>(
        &self,
        id: ScanId,
        target: ScanTarget,
        ports: &PortSet,
        mut on_event: F,
    ) -> ScanResult<ScanReport>
    where
        F: FnMut(&ScanEvent) + Send,
    {
        let started = Instant::now();
        let mut report = ScanReport::new(id, target.ip(), ports.len());
        let registry = Arc::new(AttemptRegistry::new());
        let (tx, mut completions) = mpsc::unbounded();

        info!(
            ports = ports.len(),
            concurrency = self.options.concurrency.get(),
            timeout_ms = self.options.connect_timeout.as_millis() as u64,
            "starting connect scan"
        );

        let launcher = Launcher(tokio::spawn(
            launch_attempts(
                Arc::clone(&self.connector),
                target,
                ports.as_slice().to_vec(),
                Arc::clone(&registry),
                tx,
                self.options.clone(),
            )
            .in_current_span(),
        ));

        let deadline = self.options.scan_timeout.map(|limit| started + limit);
        let mut open = HashSet::new();
        let mut fatal = None;
        let mut cancelling = false;

        // Ends when the launcher and every attempt task have dropped their
        // senders, i.e. every launched attempt has reported or been aborted.
        loop {
            let next = match deadline {
                Some(deadline) if !cancelling => {
                    match time::timeout_at(deadline, completions.next()).await {
                        Ok(next) => next,
                        Err(_) => {
                            warn!(
                                pending = registry.len(),
                                "scan deadline reached, cancelling remaining attempts"
                            );
                            launcher.abort();
                            cancelling = true;
                            continue;
                        }
                    }
                }
                _ => completions.next().await,
            };
            let Some(Completion {
                attempt,
                port,
                outcome,
                permit,
            }) = next
            else {
                break;
            };

            let Some(pending) = registry.retire(attempt) else {
                debug!(%attempt, port = port.as_u16(), "attempt already retired");
                continue;
            };

            let status = match outcome {
                Outcome::Connected(handle) => {
                    drop(handle);
                    PortStatus::Open
                }
                Outcome::Failed(status) => status,
                Outcome::Exhausted(source) => {
                    if fatal.is_none() {
                        warn!(
                            port = port.as_u16(),
                            error = %source,
                            "local resources exhausted, aborting scan"
                        );
                        launcher.abort();
                        cancelling = true;
                        fatal = Some(ScanError::ResourceExhausted {
                            port: port.as_u16(),
                            source,
                        });
                    }
                    PortStatus::Cancelled
                }
            };
            // The permit outlives the handle so live sockets never exceed
            // the concurrency cap.
            drop(permit);

            let event = ScanEvent {
                port,
                status,
                elapsed: pending.started.elapsed(),
            };
            debug!(
                port = port.as_u16(),
                %status,
                elapsed_ms = event.elapsed.as_millis() as u64,
                "attempt resolved"
            );

            if status.is_open() && !open.insert(port) {
                continue;
            }
            report.record(port, status);
            on_event(&event);
        }

        let leftovers = registry.drain();
        if !leftovers.is_empty() && !cancelling {
            warn!(count = leftovers.len(), "attempts ended without reporting");
        }
        for (_, pending) in leftovers {
            report.record(pending.port, PortStatus::Cancelled);
            on_event(&ScanEvent {
                port: pending.port,
                status: PortStatus::Cancelled,
                elapsed: pending.started.elapsed(),
            });
        }

        launcher.finish().await;
        report.finalize(started.elapsed());

        if let Some(err) = fatal {
            return Err(err);
        }

        info!(
            open = report.open.len(),
            closed = report.closed,
            filtered = report.filtered,
            unreachable = report.unreachable,
            cancelled = report.cancelled,
            duration_ms = report.duration_ms,
            "scan finished"
        );
        Ok(report)
    }
}

/// What an attempt task hands back to the coordinator.
struct Completion<H> {
    attempt: AttemptId,
    port: Port,
    outcome: Outcome<H>,
    permit: OwnedSemaphorePermit,
}

enum Outcome<H> {
    Connected(H),
    Failed(PortStatus),
    Exhausted(io::Error),
}

/// Aborts the launcher, and with it every attempt task, when dropped.
struct Launcher(JoinHandle<()>);

impl Launcher {
    fn abort(&self) {
        self.0.abort();
    }

    async fn finish(mut self) {
        if let Err(e) = (&mut self.0).await {
            if e.is_panic() {
                warn!(error = %e, "attempt launcher panicked");
            }
        }
    }
}

impl Drop for Launcher {
    fn drop(&mut self) {
        self.0.abort();
    }
}

async fn launch_attempts<C: Connector>(
    connector: Arc<C>,
    target: ScanTarget,
    ports: Vec<Port>,
    registry: Arc<AttemptRegistry>,
    completions: mpsc::UnboundedSender<Completion<C::Handle>>,
    options: ScanOptions,
) {
    let semaphore = Arc::new(Semaphore::new(options.concurrency.get()));
    let limiter = RateLimiter::per_second(options.rate_limit);
    let mut attempts = JoinSet::new();

    for port in ports {
        if let Some(limiter) = &limiter {
            limiter.wait().await;
        }
        // The semaphore is never closed.
        let Ok(permit) = Arc::clone(&semaphore).acquire_owned().await else {
            break;
        };

        let attempt = registry.register(port);
        trace!(%attempt, port = port.as_u16(), "launching attempt");

        let connector = Arc::clone(&connector);
        let completions = completions.clone();
        let connect_timeout = options.connect_timeout;
        attempts.spawn(async move {
            let addr = target.socket_addr(port.as_u16());
            let outcome = match time::timeout(connect_timeout, connector.connect(addr)).await {
                Ok(Ok(handle)) => Outcome::Connected(handle),
                Ok(Err(e)) if tcp::is_resource_exhaustion(&e) => Outcome::Exhausted(e),
                Ok(Err(e)) => Outcome::Failed(tcp::status_for_error(&e)),
                Err(_) => Outcome::Failed(PortStatus::Filtered),
            };
            // Only fails if the coordinator is gone, in which case the
            // handle and permit are dropped here.
            let _ = completions.unbounded_send(Completion {
                attempt,
                port,
                outcome,
                permit,
            });
        });

        while let Some(res) = attempts.try_join_next() {
            log_join_error(res);
        }
    }

    drop(completions);
    while let Some(res) = attempts.join_next().await {
        log_join_error(res);
    }
}

fn log_join_error(res: Result<(), JoinError>) {
    if let Err(e) = res {
        if e.is_panic() {
            warn!(error = %e, "connection attempt panicked");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::net::{IpAddr, Ipv4Addr, SocketAddr};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio_test::assert_ok;

    const LOCALHOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

    #[derive(Debug, Clone, Copy)]
    enum Behavior {
        Open,
        Refuse,
        Reset,
        Hang,
        Exhaust,
        Panic,
    }

    #[derive(Debug, Default)]
    struct Counters {
        opened: AtomicUsize,
        released: AtomicUsize,
        live: AtomicUsize,
        max_live: AtomicUsize,
    }

    struct TrackedHandle {
        counters: Arc<Counters>,
    }

    impl Drop for TrackedHandle {
        fn drop(&mut self) {
            self.counters.released.fetch_add(1, Ordering::SeqCst);
            self.counters.live.fetch_sub(1, Ordering::SeqCst);
        }
    }

    /// Scripted connector. Unlisted ports refuse.
    struct MockConnector {
        behaviors: HashMap<u16, Behavior>,
        counters: Arc<Counters>,
    }

    impl MockConnector {
        fn new(behaviors: impl IntoIterator<Item = (u16, Behavior)>) -> Self {
            Self {
                behaviors: behaviors.into_iter().collect(),
                counters: Arc::new(Counters::default()),
            }
        }
    }

    #[async_trait]
    impl Connector for MockConnector {
        type Handle = TrackedHandle;

        async fn connect(&self, addr: SocketAddr) -> io::Result<TrackedHandle> {
            let port = addr.port();
            // Spread resolutions out so discovery order differs from port order.
            time::sleep(Duration::from_millis(u64::from(port % 7))).await;

            match self.behaviors.get(&port).copied().unwrap_or(Behavior::Refuse) {
                Behavior::Open => {
                    self.counters.opened.fetch_add(1, Ordering::SeqCst);
                    let live = self.counters.live.fetch_add(1, Ordering::SeqCst) + 1;
                    self.counters.max_live.fetch_max(live, Ordering::SeqCst);
                    Ok(TrackedHandle {
                        counters: Arc::clone(&self.counters),
                    })
                }
                Behavior::Refuse => Err(io::ErrorKind::ConnectionRefused.into()),
                Behavior::Reset => Err(io::ErrorKind::ConnectionReset.into()),
                Behavior::Hang => std::future::pending().await,
                Behavior::Exhaust => Err(io::ErrorKind::AddrNotAvailable.into()),
                Behavior::Panic => panic!("scripted connector panic"),
            }
        }
    }

    fn port_set(range: std::ops::RangeInclusive<u16>) -> PortSet {
        range.filter_map(Port::new).collect()
    }

    fn as_u16s(ports: &[Port]) -> HashSet<u16> {
        ports.iter().map(|p| p.as_u16()).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_reports_exactly_the_open_ports() {
        let connector = MockConnector::new([
            (22, Behavior::Open),
            (80, Behavior::Open),
            (150, Behavior::Open),
        ]);
        let scanner = ConnectScanner::with_connector(connector, ScanOptions::new());

        let mut events = Vec::new();
        let report = scanner
            .scan_with(LOCALHOST, &port_set(1..=200), |e| events.push(*e))
            .await
            .unwrap();

        assert_eq!(as_u16s(&report.open), HashSet::from([22, 80, 150]));
        assert_eq!(report.closed, 197);
        assert_eq!(report.resolved(), 200);
        assert!(report.complete);

        // One event per port, open ones flagged.
        assert_eq!(events.len(), 200);
        let seen: HashSet<u16> = events.iter().map(|e| e.port.as_u16()).collect();
        assert_eq!(seen.len(), 200);
        let open: HashSet<u16> = events
            .iter()
            .filter(|e| e.is_open())
            .map(|e| e.port.as_u16())
            .collect();
        assert_eq!(open, HashSet::from([22, 80, 150]));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_handles_released_exactly_once_within_cap() {
        let connector = MockConnector::new((1..=500).map(|p| (p, Behavior::Open)));
        let counters = Arc::clone(&connector.counters);
        let options = ScanOptions::new().with_concurrency(nonzero!(64usize));
        let scanner = ConnectScanner::with_connector(connector, options);

        let report = scanner.scan(LOCALHOST, &port_set(1..=500)).await.unwrap();

        assert_eq!(report.open.len(), 500);
        assert_eq!(as_u16s(&report.open).len(), 500);
        assert_eq!(counters.opened.load(Ordering::SeqCst), 500);
        assert_eq!(counters.released.load(Ordering::SeqCst), 500);
        assert_eq!(counters.live.load(Ordering::SeqCst), 0);
        assert!(counters.max_live.load(Ordering::SeqCst) <= 64);
    }

    #[tokio::test(start_paused = true)]
    async fn test_terminates_after_connect_timeout_when_nothing_answers() {
        let connector = MockConnector::new((1..=100).map(|p| (p, Behavior::Hang)));
        let timeout = Duration::from_secs(2);
        let scanner =
            ConnectScanner::with_connector(connector, ScanOptions::new().with_timeout(timeout));

        let start = Instant::now();
        let report = scanner.scan(LOCALHOST, &port_set(1..=100)).await.unwrap();
        let elapsed = start.elapsed();

        assert!(elapsed >= timeout);
        assert!(elapsed < timeout + Duration::from_secs(1));
        assert_eq!(report.filtered, 100);
        assert!(report.open.is_empty());
        assert!(report.complete);
    }

    #[tokio::test(start_paused = true)]
    async fn test_attempt_failures_are_contained() {
        let connector = MockConnector::new([
            (1, Behavior::Open),
            (2, Behavior::Reset),
            (3, Behavior::Hang),
            (4, Behavior::Refuse),
        ]);
        let counters = Arc::clone(&connector.counters);
        let options = ScanOptions::new().with_timeout(Duration::from_millis(500));
        let scanner = ConnectScanner::with_connector(connector, options);

        let report = assert_ok!(scanner.scan(LOCALHOST, &port_set(1..=4)).await);

        assert_eq!(as_u16s(&report.open), HashSet::from([1]));
        assert_eq!(report.unreachable, 1);
        assert_eq!(report.filtered, 1);
        assert_eq!(report.closed, 1);
        assert_eq!(counters.released.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_empty_port_set_is_rejected() {
        let scanner = ConnectScanner::with_connector(MockConnector::new([]), ScanOptions::new());
        let err = scanner.scan(LOCALHOST, &PortSet::new()).await.unwrap_err();
        assert!(matches!(err, ScanError::EmptyPortSet { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_resource_exhaustion_is_fatal_and_leaks_nothing() {
        let connector = MockConnector::new(
            (1..=50)
                .map(|p| (p, Behavior::Open))
                .chain([(60, Behavior::Exhaust)])
                .chain((61..=100).map(|p| (p, Behavior::Hang))),
        );
        let counters = Arc::clone(&connector.counters);
        let scanner = ConnectScanner::with_connector(connector, ScanOptions::new());

        let err = scanner.scan(LOCALHOST, &port_set(1..=100)).await.unwrap_err();

        assert!(matches!(err, ScanError::ResourceExhausted { port: 60, .. }));
        assert_eq!(
            counters.opened.load(Ordering::SeqCst),
            counters.released.load(Ordering::SeqCst)
        );
        assert_eq!(counters.live.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_scan_deadline_cancels_pending_attempts() {
        let connector = MockConnector::new(
            [(1, Behavior::Open)]
                .into_iter()
                .chain((2..=100).map(|p| (p, Behavior::Hang))),
        );
        let counters = Arc::clone(&connector.counters);
        let options = ScanOptions::new()
            .with_timeout(Duration::from_secs(30))
            .with_concurrency(nonzero!(10usize))
            .with_scan_timeout(Duration::from_secs(1));
        let scanner = ConnectScanner::with_connector(connector, options);

        let start = Instant::now();
        let report = scanner.scan(LOCALHOST, &port_set(1..=100)).await.unwrap();

        assert!(start.elapsed() < Duration::from_secs(2));
        assert_eq!(as_u16s(&report.open), HashSet::from([1]));
        // Launched-and-aborted plus never launched.
        assert_eq!(report.cancelled, 99);
        assert!(!report.complete);
        assert_eq!(counters.opened.load(Ordering::SeqCst), 1);
        assert_eq!(counters.released.load(Ordering::SeqCst), 1);
        assert_eq!(counters.live.load(Ordering::SeqCst), 0);
    }

    // Real time: the limiter keeps its own clock.
    #[tokio::test]
    async fn test_rate_limit_paces_launches() {
        let connector = MockConnector::new((1..=10).map(|p| (p, Behavior::Open)));
        let counters = Arc::clone(&connector.counters);
        let options = ScanOptions::new().with_rate_limit(5);
        let scanner = ConnectScanner::with_connector(connector, options);

        let start = std::time::Instant::now();
        let report = scanner.scan(LOCALHOST, &port_set(1..=10)).await.unwrap();
        let elapsed = start.elapsed();

        // A burst of 5, then one launch every 200ms.
        assert!(elapsed >= Duration::from_millis(900), "took {elapsed:?}");
        assert_eq!(report.open.len(), 10);
        assert!(report.complete);
        assert_eq!(counters.released.load(Ordering::SeqCst), 10);
    }

    /// Records every address it is asked to connect to.
    #[derive(Default)]
    struct RecordingConnector {
        seen: std::sync::Mutex<Vec<SocketAddr>>,
    }

    #[async_trait]
    impl Connector for RecordingConnector {
        type Handle = ();

        async fn connect(&self, addr: SocketAddr) -> io::Result<()> {
            self.seen.lock().unwrap().push(addr);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_zone_reaches_the_connector() {
        let connector = Arc::new(RecordingConnector::default());
        let scanner = ConnectScanner {
            connector: Arc::clone(&connector),
            options: ScanOptions::new(),
        };
        let target = ScanTarget::parse("fe80::1%3").unwrap();

        let report = scanner.scan(target, &port_set(80..=81)).await.unwrap();

        assert_eq!(report.open.len(), 2);
        let seen = connector.seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        for addr in seen.iter() {
            match addr {
                SocketAddr::V6(v6) => assert_eq!(v6.scope_id(), 3),
                other => panic!("expected an IPv6 address, got {other}"),
            }
        }
    }

    #[tokio::test]
    async fn test_panicking_attempt_is_retired() {
        let connector = MockConnector::new([(5, Behavior::Panic), (6, Behavior::Open)]);
        let scanner = ConnectScanner::with_connector(connector, ScanOptions::new());

        let report = scanner.scan(LOCALHOST, &port_set(1..=10)).await.unwrap();

        assert_eq!(as_u16s(&report.open), HashSet::from([6]));
        assert_eq!(report.cancelled, 1);
        assert_eq!(report.closed, 8);
        assert!(!report.complete);
    }

    #[test]
    fn test_options_validation() {
        assert!(ScanOptions::new().validate().is_ok());
        assert!(ScanOptions::new()
            .with_timeout(Duration::ZERO)
            .validate()
            .is_err());
        assert!(ScanOptions::new()
            .with_timeout(MAX_CONNECT_TIMEOUT + Duration::from_secs(1))
            .validate()
            .is_err());
        assert!(ScanOptions::new()
            .with_scan_timeout(Duration::ZERO)
            .validate()
            .is_err());

        let widest = NonZeroUsize::new(MAX_CONCURRENCY).unwrap();
        assert!(ScanOptions::new().with_concurrency(widest).validate().is_ok());
        let too_wide = NonZeroUsize::new(MAX_CONCURRENCY + 1).unwrap();
        assert!(ScanOptions::new()
            .with_concurrency(too_wide)
            .validate()
            .is_err());
    }

    #[tokio::test]
    async fn test_run_scan_rejects_invalid_host() {
        let err = run_scan("not-an-address", "80", ScanOptions::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ScanError::InvalidHost(ref h) if h == "not-an-address"));
    }

    #[tokio::test]
    async fn test_run_scan_rejects_empty_port_set() {
        let err = run_scan("127.0.0.1", "http,https", ScanOptions::new())
            .await
            .unwrap_err();
        match err {
            ScanError::EmptyPortSet { skipped } => assert_eq!(skipped.len(), 2),
            other => panic!("unexpected error: {other}"),
        }
    }
}
