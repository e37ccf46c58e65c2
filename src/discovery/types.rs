//! Discovery pipeline data types.

use std::collections::BTreeMap;
use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::certs::Certificate;
use crate::config::{
    DEFAULT_APP_INACTIVITY_TIMEOUT_SECS, DEFAULT_HOST_RATE_LIMIT, DEFAULT_PORT,
    DEFAULT_PORT_SCAN_RATE_LIMIT, DEFAULT_PORT_SCAN_TIMEOUT_MS, DEFAULT_TIMEOUT_SECS,
};
use crate::error_handling::PortCheckError;

/// Limits and timeouts for one discovery run.
#[derive(Debug, Clone)]
pub struct DiscoveryOptions {
    /// Ports checked on every host.
    pub ports: Vec<u16>,
    /// Hosts scanned in parallel.
    pub host_rate_limit: usize,
    /// Port checks in flight across all hosts.
    pub port_rate_limit: usize,
    /// Certificate retrievals in flight.
    pub cert_rate_limit: usize,
    pub port_timeout: Duration,
    pub cert_timeout: Duration,
    /// Cancels the run when no port result arrives for this long.
    pub inactivity_timeout: Duration,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self {
            ports: vec![DEFAULT_PORT],
            host_rate_limit: DEFAULT_HOST_RATE_LIMIT,
            port_rate_limit: DEFAULT_PORT_SCAN_RATE_LIMIT,
            cert_rate_limit: DEFAULT_PORT_SCAN_RATE_LIMIT,
            port_timeout: Duration::from_millis(DEFAULT_PORT_SCAN_TIMEOUT_MS),
            cert_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            inactivity_timeout: Duration::from_secs(DEFAULT_APP_INACTIVITY_TIMEOUT_SECS),
        }
    }
}

/// Outcome of checking one port on one address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortCheckResult {
    /// Pattern the address was expanded from.
    pub given: String,
    /// Name to use for SNI when retrieving the chain.
    pub host_val: String,
    pub ip: IpAddr,
    pub port: u16,
    /// A TCP connection was established.
    pub open: bool,
    pub err: Option<PortCheckError>,
}

/// A certificate chain retrieved from an open port.
#[derive(Debug, Clone)]
pub struct DiscoveredCertChain {
    pub given: String,
    pub host_val: String,
    pub ip: IpAddr,
    pub port: u16,
    /// Certificates in presented order.
    pub chain: Vec<Certificate>,
}

impl DiscoveredCertChain {
    /// `host:port` label used in summaries.
    pub fn label(&self) -> String {
        if self.host_val == self.ip.to_string() {
            format!("{}:{}", self.ip, self.port)
        } else {
            format!("{} ({}):{}", self.host_val, self.ip, self.port)
        }
    }
}

/// A chain retrieval that failed on an open port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchFailure {
    pub host_val: String,
    pub ip: IpAddr,
    pub port: u16,
    pub error: String,
}

/// Everything a discovery run observed.
#[derive(Debug, Default)]
pub struct DiscoveryReport {
    /// Port results keyed by address.
    pub port_results: BTreeMap<IpAddr, Vec<PortCheckResult>>,
    /// Retrieved chains, in completion order.
    pub chains: Vec<DiscoveredCertChain>,
    pub fetch_failures: Vec<FetchFailure>,
    /// The inactivity watchdog cancelled the run.
    pub timed_out: bool,
}

impl DiscoveryReport {
    pub fn num_ports_checked(&self) -> usize {
        self.port_results.values().map(Vec::len).sum()
    }

    pub fn num_open_ports(&self) -> usize {
        self.port_results
            .values()
            .flatten()
            .filter(|r| r.open)
            .count()
    }

    /// Addresses where no checked port accepted a connection.
    pub fn hosts_with_closed_ports(&self) -> Vec<IpAddr> {
        self.port_results
            .iter()
            .filter(|(_, results)| results.iter().all(|r| !r.open))
            .map(|(ip, _)| *ip)
            .collect()
    }

    /// Sorts chains by address then port.
    pub fn sort_chains(&mut self) {
        self.chains
            .sort_by(|a, b| (a.ip, a.port, &a.host_val).cmp(&(b.ip, b.port, &b.host_val)));
    }
}

/// Counters shared with the progress logger.
#[derive(Debug, Default)]
pub struct DiscoveryProgress {
    pub ports_checked: AtomicUsize,
    pub open_ports: AtomicUsize,
    pub chains_retrieved: AtomicUsize,
}

impl DiscoveryProgress {
    pub fn ports_checked(&self) -> usize {
        self.ports_checked.load(Ordering::SeqCst)
    }

    pub fn open_ports(&self) -> usize {
        self.open_ports.load(Ordering::SeqCst)
    }

    pub fn chains_retrieved(&self) -> usize {
        self.chains_retrieved.load(Ordering::SeqCst)
    }
}
