//! Certificate discovery across hosts and ports.
//!
//! Discovery runs in two concurrent stages:
//! 1. Port scan: every expanded address and port is dialed, bounded by a host
//!    limit and a shared port limit
//! 2. Cert scan: every open port has its chain retrieved, bounded by a cert limit
//!
//! An inactivity watchdog cancels the whole run when port results stop arriving.
//! Probing and retrieval go through the [`PortProber`] and [`CertFetcher`] traits
//! so the pipeline can be driven without a network.

mod pipeline;
mod probe;
mod types;
mod watchdog;

// Re-export public API
pub use pipeline::run_discovery;
pub use probe::{check_port, CertFetcher, PortProber, TcpPortProber, TlsCertFetcher};
pub use types::{
    DiscoveredCertChain, DiscoveryOptions, DiscoveryProgress, DiscoveryReport, FetchFailure,
    PortCheckResult,
};
pub use watchdog::{spawn_watchdog, Heartbeat};

#[cfg(test)]
mod tests;
