//! `certsum` discovery summary (CLI binary).
//!
//! Expands the given host patterns, scans the requested ports, retrieves the
//! certificate chain from every open port and prints an expiration summary.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use tokio_util::sync::CancellationToken;

use cert_status::app::{config_error_output, discovery_summary};
use cert_status::config::{CertSumOpt, MAX_HOST_EXPANSION};
use cert_status::discovery::{run_discovery, TcpPortProber, TlsCertFetcher};
use cert_status::hosts::expand_host;
use cert_status::initialization::{init_crypto_provider, init_logger_with, init_resolver};
use cert_status::plugin::{PluginOutput, ServiceState};

#[tokio::main]
async fn main() -> Result<()> {
    let opt = CertSumOpt::parse();

    init_logger_with(opt.log_level.into(), opt.log_format)
        .context("Failed to initialize logger")?;
    init_crypto_provider();

    let config = match opt.validate() {
        Ok(config) => config,
        Err(e) => config_error_output(&e).exit(),
    };

    let resolver = init_resolver().context("Failed to initialize DNS resolver")?;
    let mut hosts = Vec::with_capacity(config.hosts.len());
    let mut skipped = Vec::new();
    for pattern in &config.hosts {
        match expand_host(pattern, &resolver, MAX_HOST_EXPANSION).await {
            Ok(host) => hosts.push(host),
            Err(e) => {
                warn!("Skipping host pattern {pattern}: {e}");
                skipped.push(e);
            }
        }
    }

    if hosts.is_empty() {
        let mut output = PluginOutput::new();
        output.set_state(ServiceState::Unknown);
        output.set_service_output("UNKNOWN: none of the given host patterns could be expanded");
        for err in skipped {
            output.add_error(err);
        }
        output.exit();
    }
    info!(
        "Scanning {} address(es) from {} pattern(s) on {} port(s)",
        hosts.iter().map(|h| h.expanded.len()).sum::<usize>(),
        hosts.len(),
        config.discovery.ports.len()
    );

    let cancel = CancellationToken::new();
    let cancel_on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, stopping discovery");
            cancel_on_signal.cancel();
        }
    });

    let mut report = run_discovery(
        hosts,
        &config.discovery,
        Arc::new(TcpPortProber),
        Arc::new(TlsCertFetcher),
        &cancel,
    )
    .await;
    report.sort_chains();

    let mut output = discovery_summary(&report, &config);
    for err in skipped {
        output.add_error(err);
    }
    output.exit()
}
