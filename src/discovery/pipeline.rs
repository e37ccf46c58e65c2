//! Two stage discovery: port scan feeding certificate retrieval.

use std::collections::BTreeMap;
use std::net::IpAddr;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::stream::{FuturesUnordered, StreamExt};
use log::{debug, info, warn};
use tokio::sync::{mpsc, OwnedSemaphorePermit, Semaphore};
use tokio_util::sync::CancellationToken;

use super::probe::{CertFetcher, PortProber};
use super::types::{
    DiscoveredCertChain, DiscoveryOptions, DiscoveryProgress, DiscoveryReport, FetchFailure,
    PortCheckResult,
};
use super::watchdog::{spawn_watchdog, Heartbeat};
use crate::app::{log_progress, shutdown_gracefully};
use crate::config::LOGGING_INTERVAL_SECS;
use crate::error_handling::PortCheckError;
use crate::hosts::HostPattern;
use crate::initialization::init_semaphore;

enum CertOutcome {
    Chain(DiscoveredCertChain),
    Failure(FetchFailure),
}

/// Waits for a slot unless the run is cancelled first.
async fn acquire(
    slots: &Arc<Semaphore>,
    cancel: &CancellationToken,
) -> Option<OwnedSemaphorePermit> {
    tokio::select! {
        _ = cancel.cancelled() => None,
        permit = Arc::clone(slots).acquire_owned() => permit.ok(),
    }
}

/// Runs the port scan and certificate retrieval stages to completion.
///
/// Port checks for every expanded address and port are bounded by the host and
/// port limits; every open port is handed to a certificate worker bounded by the
/// cert limit. An inactivity watchdog cancels the run when no port result arrives
/// within `options.inactivity_timeout`.
///
/// # Arguments
///
/// * `hosts` - Expanded host patterns
/// * `options` - Ports, limits and timeouts
/// * `prober` - Port checker
/// * `fetcher` - Chain retriever for open ports
/// * `parent` - Cancelling it stops the run early
///
/// # Returns
///
/// The collected report. Chains are in completion order; call
/// [`DiscoveryReport::sort_chains`] for a stable order.
pub async fn run_discovery<P: PortProber, F: CertFetcher>(
    hosts: Vec<HostPattern>,
    options: &DiscoveryOptions,
    prober: Arc<P>,
    fetcher: Arc<F>,
    parent: &CancellationToken,
) -> DiscoveryReport {
    let start_time = Instant::now();
    let cancel = parent.child_token();
    let progress = Arc::new(DiscoveryProgress::default());
    let (heartbeat, watchdog) = spawn_watchdog(options.inactivity_timeout, cancel.clone());

    let cancel_logging = cancel.child_token();
    let progress_for_logging = Arc::clone(&progress);
    let logging_cancel = cancel_logging.clone();
    let logging_task = tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(LOGGING_INTERVAL_SECS));
        interval.tick().await;
        loop {
            tokio::select! {
                _ = interval.tick() => log_progress(start_time, &progress_for_logging),
                _ = logging_cancel.cancelled() => break,
            }
        }
    });

    let (port_tx, port_rx) = mpsc::channel(options.port_rate_limit.max(1));
    let (cert_tx, mut cert_rx) = mpsc::channel(options.cert_rate_limit.max(1));

    let port_scanner = tokio::spawn(scan_ports(
        hosts,
        options.clone(),
        prober,
        port_tx,
        cancel.clone(),
    ));
    let cert_scanner = tokio::spawn(scan_certs(
        port_rx,
        options.clone(),
        fetcher,
        cert_tx,
        heartbeat,
        Arc::clone(&progress),
        cancel.clone(),
    ));

    // Only this loop writes to the report's chain list.
    let mut report = DiscoveryReport::default();
    while let Some(outcome) = cert_rx.recv().await {
        match outcome {
            CertOutcome::Chain(chain) => report.chains.push(chain),
            CertOutcome::Failure(failure) => report.fetch_failures.push(failure),
        }
    }

    if let Err(e) = port_scanner.await {
        warn!("Port scanner task failed: {e:?}");
    }
    match cert_scanner.await {
        Ok(port_results) => report.port_results = port_results,
        Err(e) => warn!("Cert scanner task failed: {e:?}"),
    }

    shutdown_gracefully(cancel_logging, Some(logging_task)).await;
    // Stops the watchdog when it is still waiting on a heartbeat.
    cancel.cancel();
    report.timed_out = watchdog.await.unwrap_or(false);

    log_progress(start_time, &progress);
    info!(
        "Discovery finished: {} port(s) checked, {} open, {} chain(s) retrieved{}",
        report.num_ports_checked(),
        report.num_open_ports(),
        report.chains.len(),
        if report.timed_out { " (timed out)" } else { "" }
    );
    report
}

/// Parent port scanner: one task per address, bounded by the host limit.
async fn scan_ports<P: PortProber>(
    hosts: Vec<HostPattern>,
    options: DiscoveryOptions,
    prober: Arc<P>,
    results: mpsc::Sender<PortCheckResult>,
    cancel: CancellationToken,
) {
    let host_slots = init_semaphore(options.host_rate_limit.max(1));
    let port_slots = init_semaphore(options.port_rate_limit.max(1));
    let ports: Arc<[u16]> = options.ports.into();
    let mut host_tasks = FuturesUnordered::new();

    'hosts: for host in hosts {
        for ip in &host.expanded {
            let Some(permit) = acquire(&host_slots, &cancel).await else {
                debug!("Port scan cancelled before {ip}");
                break 'hosts;
            };
            host_tasks.push(tokio::spawn(scan_host(
                HostTarget {
                    given: host.given.clone(),
                    host_val: host.sni_name(ip),
                    ip: *ip,
                },
                Arc::clone(&ports),
                options.port_timeout,
                Arc::clone(&port_slots),
                Arc::clone(&prober),
                results.clone(),
                cancel.clone(),
                permit,
            )));
        }
    }

    while let Some(task_result) = host_tasks.next().await {
        if let Err(join_error) = task_result {
            warn!("Host scan task panicked: {join_error:?}");
        }
    }
}

struct HostTarget {
    given: String,
    host_val: String,
    ip: IpAddr,
}

/// Checks every port on one address, bounded by the shared port limit.
#[allow(clippy::too_many_arguments)]
async fn scan_host<P: PortProber>(
    target: HostTarget,
    ports: Arc<[u16]>,
    timeout: Duration,
    port_slots: Arc<Semaphore>,
    prober: Arc<P>,
    results: mpsc::Sender<PortCheckResult>,
    cancel: CancellationToken,
    host_permit: OwnedSemaphorePermit,
) {
    let _host_permit = host_permit;
    let mut workers = FuturesUnordered::new();

    for &port in ports.iter() {
        let Some(permit) = acquire(&port_slots, &cancel).await else {
            break;
        };
        let prober = Arc::clone(&prober);
        let results = results.clone();
        let cancel = cancel.clone();
        let given = target.given.clone();
        let host_val = target.host_val.clone();
        let ip = target.ip;

        workers.push(tokio::spawn(async move {
            let outcome = tokio::select! {
                _ = cancel.cancelled() => return,
                outcome = prober.check_port(ip, port, timeout) => outcome,
            };
            drop(permit);

            let open = matches!(outcome, Ok(()) | Err(PortCheckError::Close(_)));
            let result = PortCheckResult {
                given,
                host_val,
                ip,
                port,
                open,
                err: outcome.err(),
            };
            tokio::select! {
                _ = cancel.cancelled() => {}
                sent = results.send(result) => {
                    if sent.is_err() {
                        debug!("Port result receiver closed for {ip}:{port}");
                    }
                }
            }
        }));
    }

    while let Some(task_result) = workers.next().await {
        if let Err(join_error) = task_result {
            warn!("Port check task panicked: {join_error:?}");
        }
    }
}

/// Parent cert scanner and port result collector.
///
/// Every port result observed sends a heartbeat to the watchdog. Open ports are
/// handed to certificate workers bounded by the cert limit.
async fn scan_certs<F: CertFetcher>(
    mut port_rx: mpsc::Receiver<PortCheckResult>,
    options: DiscoveryOptions,
    fetcher: Arc<F>,
    cert_tx: mpsc::Sender<CertOutcome>,
    heartbeat: Heartbeat,
    progress: Arc<DiscoveryProgress>,
    cancel: CancellationToken,
) -> BTreeMap<IpAddr, Vec<PortCheckResult>> {
    let cert_slots = init_semaphore(options.cert_rate_limit.max(1));
    let mut port_results: BTreeMap<IpAddr, Vec<PortCheckResult>> = BTreeMap::new();
    let mut workers = FuturesUnordered::new();

    loop {
        let received = tokio::select! {
            _ = cancel.cancelled() => None,
            received = port_rx.recv() => received,
        };
        let Some(result) = received else {
            break;
        };
        heartbeat.beat();
        progress.ports_checked.fetch_add(1, Ordering::SeqCst);

        if result.open {
            progress.open_ports.fetch_add(1, Ordering::SeqCst);
            let Some(permit) = acquire(&cert_slots, &cancel).await else {
                port_results.entry(result.ip).or_default().push(result);
                break;
            };
            workers.push(tokio::spawn(fetch_chain(
                result.clone(),
                options.cert_timeout,
                Arc::clone(&fetcher),
                cert_tx.clone(),
                heartbeat.clone(),
                Arc::clone(&progress),
                cancel.clone(),
                permit,
            )));
        } else if let Some(err) = &result.err {
            debug!("{}:{} closed: {err}", result.ip, result.port);
        }

        port_results.entry(result.ip).or_default().push(result);
    }

    drop(cert_tx);
    drop(heartbeat);
    while let Some(task_result) = workers.next().await {
        if let Err(join_error) = task_result {
            warn!("Cert fetch task panicked: {join_error:?}");
        }
    }

    port_results
}

/// Certificate worker for one open port.
#[allow(clippy::too_many_arguments)]
async fn fetch_chain<F: CertFetcher>(
    port_result: PortCheckResult,
    timeout: Duration,
    fetcher: Arc<F>,
    cert_tx: mpsc::Sender<CertOutcome>,
    heartbeat: Heartbeat,
    progress: Arc<DiscoveryProgress>,
    cancel: CancellationToken,
    permit: OwnedSemaphorePermit,
) {
    let PortCheckResult {
        given,
        host_val,
        ip,
        port,
        ..
    } = port_result;

    let fetched = tokio::select! {
        _ = cancel.cancelled() => return,
        fetched = fetcher.fetch(host_val.clone(), ip, port, timeout) => fetched,
    };
    drop(permit);
    heartbeat.beat();

    let outcome = match fetched {
        Ok(chain) => {
            progress.chains_retrieved.fetch_add(1, Ordering::SeqCst);
            debug!("Retrieved {} cert(s) from {host_val} ({ip}):{port}", chain.len());
            CertOutcome::Chain(DiscoveredCertChain {
                given,
                host_val,
                ip,
                port,
                chain,
            })
        }
        Err(e) => {
            warn!("Failed to retrieve certs from {host_val} ({ip}):{port}: {e}");
            CertOutcome::Failure(FetchFailure {
                host_val,
                ip,
                port,
                error: e.to_string(),
            })
        }
    };

    tokio::select! {
        _ = cancel.cancelled() => {}
        _ = cert_tx.send(outcome) => {}
    }
}
