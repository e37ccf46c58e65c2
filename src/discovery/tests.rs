//! Discovery pipeline tests.
//!
//! The pipeline runs against fake probers and fetchers so concurrency limits and
//! the watchdog can be asserted without a network.

use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::future::BoxFuture;
use futures::FutureExt;
use tokio_util::sync::CancellationToken;

use super::*;
use crate::certs::test_helpers::chain;
use crate::certs::Certificate;
use crate::error_handling::{FetchError, PortCheckError};
use crate::hosts::{parse_ip_pattern, HostPattern};

#[derive(Default)]
struct InFlight {
    current: AtomicUsize,
    max: AtomicUsize,
    calls: AtomicUsize,
}

impl InFlight {
    fn enter(&self) {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.max.fetch_max(now, Ordering::SeqCst);
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    fn leave(&self) {
        self.current.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Even ports are open, odd ports refuse.
#[derive(Default)]
struct FakeProber {
    in_flight: InFlight,
}

impl PortProber for FakeProber {
    fn check_port(
        &self,
        _ip: IpAddr,
        port: u16,
        _timeout: Duration,
    ) -> BoxFuture<'_, Result<(), PortCheckError>> {
        async move {
            self.in_flight.enter();
            tokio::time::sleep(Duration::from_millis(10)).await;
            self.in_flight.leave();
            if port % 2 == 0 {
                Ok(())
            } else {
                Err(PortCheckError::Dial("connection refused".to_string()))
            }
        }
        .boxed()
    }
}

/// Never completes.
struct HangingProber;

impl PortProber for HangingProber {
    fn check_port(
        &self,
        _ip: IpAddr,
        _port: u16,
        _timeout: Duration,
    ) -> BoxFuture<'_, Result<(), PortCheckError>> {
        futures::future::pending().boxed()
    }
}

/// Serves a fixed chain; fails for port 4.
struct FakeFetcher {
    chain: Vec<Certificate>,
    in_flight: InFlight,
    host_vals: Mutex<Vec<String>>,
}

impl FakeFetcher {
    fn new() -> Self {
        Self {
            chain: chain(&["a.test"], 90, 400, 3650),
            in_flight: InFlight::default(),
            host_vals: Mutex::new(Vec::new()),
        }
    }
}

impl CertFetcher for FakeFetcher {
    fn fetch(
        &self,
        host_val: String,
        ip: IpAddr,
        port: u16,
        _timeout: Duration,
    ) -> BoxFuture<'_, Result<Vec<Certificate>, FetchError>> {
        async move {
            self.in_flight.enter();
            self.host_vals
                .lock()
                .expect("lock")
                .push(host_val.clone());
            tokio::time::sleep(Duration::from_millis(15)).await;
            self.in_flight.leave();
            if port == 4 {
                Err(FetchError::NoPeerCerts(format!("{ip}:{port}")))
            } else {
                Ok(self.chain.clone())
            }
        }
        .boxed()
    }
}

fn literal_hosts(patterns: &[&str]) -> Vec<HostPattern> {
    patterns
        .iter()
        .map(|p| {
            parse_ip_pattern(p, 65536)
                .expect("valid pattern")
                .expect("IP pattern")
        })
        .collect()
}

fn options(ports: Vec<u16>, host: usize, port: usize, cert: usize) -> DiscoveryOptions {
    DiscoveryOptions {
        ports,
        host_rate_limit: host,
        port_rate_limit: port,
        cert_rate_limit: cert,
        port_timeout: Duration::from_millis(100),
        cert_timeout: Duration::from_millis(500),
        inactivity_timeout: Duration::from_secs(5),
    }
}

#[tokio::test]
async fn test_discovery_respects_limits() {
    let hosts = literal_hosts(&["192.0.2.1", "192.0.2.2", "192.0.2.3", "192.0.2.4"]);
    let prober = Arc::new(FakeProber::default());
    let fetcher = Arc::new(FakeFetcher::new());
    let opts = options((1..=10).collect(), 2, 3, 2);

    let mut report = run_discovery(
        hosts,
        &opts,
        Arc::clone(&prober),
        Arc::clone(&fetcher),
        &CancellationToken::new(),
    )
    .await;

    assert!(!report.timed_out);
    assert_eq!(report.num_ports_checked(), 40);
    assert_eq!(report.num_open_ports(), 20);
    assert_eq!(report.port_results.len(), 4);
    // Ports 2, 6, 8, 10 succeed on each host, port 4 fails.
    assert_eq!(report.chains.len(), 16);
    assert_eq!(report.fetch_failures.len(), 4);

    assert!(prober.in_flight.max.load(Ordering::SeqCst) <= 3);
    assert!(fetcher.in_flight.max.load(Ordering::SeqCst) <= 2);
    assert_eq!(prober.in_flight.calls.load(Ordering::SeqCst), 40);

    report.sort_chains();
    let first = &report.chains[0];
    assert_eq!(first.ip, "192.0.2.1".parse::<IpAddr>().expect("ip"));
    assert_eq!(first.port, 2);
    assert_eq!(first.chain.len(), 3);
}

#[tokio::test]
async fn test_discovery_uses_resolved_name_for_sni() {
    let hosts = vec![
        HostPattern {
            given: "www.example.test".to_string(),
            expanded: vec!["192.0.2.10".parse().expect("ip")],
            resolved: true,
            range: false,
        },
        literal_hosts(&["192.0.2.11"]).remove(0),
    ];
    let fetcher = Arc::new(FakeFetcher::new());
    let report = run_discovery(
        hosts,
        &options(vec![2], 2, 2, 2),
        Arc::new(FakeProber::default()),
        Arc::clone(&fetcher),
        &CancellationToken::new(),
    )
    .await;

    assert_eq!(report.chains.len(), 2);
    let mut host_vals = fetcher.host_vals.lock().expect("lock").clone();
    host_vals.sort();
    assert_eq!(host_vals, vec!["192.0.2.11", "www.example.test"]);
}

#[tokio::test]
async fn test_closed_hosts_reported() {
    let report = run_discovery(
        literal_hosts(&["192.0.2.1"]),
        &options(vec![1, 3], 1, 1, 1),
        Arc::new(FakeProber::default()),
        Arc::new(FakeFetcher::new()),
        &CancellationToken::new(),
    )
    .await;

    assert!(report.chains.is_empty());
    assert_eq!(
        report.hosts_with_closed_ports(),
        vec!["192.0.2.1".parse::<IpAddr>().expect("ip")]
    );
    let results = &report.port_results[&"192.0.2.1".parse::<IpAddr>().expect("ip")];
    assert!(results
        .iter()
        .all(|r| matches!(r.err, Some(PortCheckError::Dial(_)))));
}

#[tokio::test]
async fn test_watchdog_cancels_stalled_scan() {
    let mut opts = options(vec![443], 2, 2, 2);
    opts.inactivity_timeout = Duration::from_millis(100);

    let report = tokio::time::timeout(
        Duration::from_secs(5),
        run_discovery(
            literal_hosts(&["192.0.2.1", "192.0.2.2", "192.0.2.3"]),
            &opts,
            Arc::new(HangingProber),
            Arc::new(FakeFetcher::new()),
            &CancellationToken::new(),
        ),
    )
    .await
    .expect("pipeline terminates after the watchdog fires");

    assert!(report.timed_out);
    assert!(report.chains.is_empty());
    assert_eq!(report.num_ports_checked(), 0);
}

#[tokio::test]
async fn test_parent_cancellation_stops_run() {
    let parent = CancellationToken::new();
    parent.cancel();

    let report = tokio::time::timeout(
        Duration::from_secs(5),
        run_discovery(
            literal_hosts(&["192.0.2.1"]),
            &options(vec![443], 1, 1, 1),
            Arc::new(HangingProber),
            Arc::new(FakeFetcher::new()),
            &parent,
        ),
    )
    .await
    .expect("cancelled run terminates");

    assert!(!report.timed_out);
    assert!(report.chains.is_empty());
}

#[tokio::test]
async fn test_watchdog_stops_when_senders_drop() {
    let cancel = CancellationToken::new();
    let (heartbeat, handle) = spawn_watchdog(Duration::from_secs(5), cancel.clone());
    heartbeat.beat();
    drop(heartbeat);

    let fired = tokio::time::timeout(Duration::from_secs(2), handle)
        .await
        .expect("watchdog exits")
        .expect("watchdog task");
    assert!(!fired);
    assert!(!cancel.is_cancelled());
}

#[tokio::test]
async fn test_check_port_open_and_closed() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let port = listener.local_addr().expect("addr").port();
    let accept = tokio::spawn(async move {
        let _ = listener.accept().await;
    });

    let ip: IpAddr = "127.0.0.1".parse().expect("ip");
    check_port(ip, port, Duration::from_secs(2))
        .await
        .expect("port is open");
    let _ = accept.await;

    let closed = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let closed_port = closed.local_addr().expect("addr").port();
    drop(closed);
    let err = check_port(ip, closed_port, Duration::from_secs(2))
        .await
        .expect_err("port is closed");
    assert!(matches!(err, PortCheckError::Dial(_)));
}
