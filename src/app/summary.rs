//! `certsum` discovery summary.
//!
//! Every retrieved chain is checked for expiration only; the summary then lists
//! the chains with problems (or all of them on request) either as a table or as
//! detailed blocks, followed by optional port scan sections.

use std::fmt::Write;
use std::sync::Arc;

use crate::certs::{formatted_expiration, next_to_expire};
use crate::config::CertSumConfig;
use crate::discovery::{DiscoveredCertChain, DiscoveryReport};
use crate::plugin::{PluginOutput, ServiceState};
use crate::validation::{validate_expiration, ValidationOptions, ValidationResult};

/// Expiration verdict for one discovered chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainSummary {
    pub label: String,
    pub port: u16,
    pub host: String,
    pub num_certs: usize,
    pub num_expired: usize,
    pub num_expiring: usize,
    pub state: ServiceState,
    /// Status line of the expiration validator.
    pub status: String,
    /// Display name and relative expiration of the next certificate to expire.
    pub next_to_expire: Option<String>,
}

impl ChainSummary {
    pub fn has_problems(&self) -> bool {
        self.state != ServiceState::Ok
    }
}

/// Evaluates the expiration of one discovered chain.
pub fn summarize_chain(discovered: &DiscoveredCertChain, config: &CertSumConfig) -> ChainSummary {
    let options = ValidationOptions {
        omit_sans_entries: config.omit_sans_entries,
        ..ValidationOptions::default()
    };
    let result = validate_expiration(
        Arc::from(discovered.chain.clone()),
        Some(config.age_warning),
        Some(config.age_critical),
        &options,
    );

    ChainSummary {
        label: discovered.label(),
        port: discovered.port,
        host: if discovered.host_val.is_empty() {
            discovered.ip.to_string()
        } else {
            discovered.host_val.clone()
        },
        num_certs: discovered.chain.len(),
        num_expired: result.num_expired(),
        num_expiring: result.num_expiring(),
        state: result.state(),
        status: result.status(),
        next_to_expire: next_to_expire(&discovered.chain, true).map(|cert| {
            format!(
                "\"{}\" ({})",
                cert.display_name(),
                formatted_expiration(cert.not_after())
            )
        }),
    }
}

/// Worst state across all chain summaries, OK when there are none.
pub fn overall_state(summaries: &[ChainSummary]) -> ServiceState {
    summaries
        .iter()
        .fold(ServiceState::Ok, |state, summary| state.worst(summary.state))
}

fn overview_table(out: &mut String, summaries: &[&ChainSummary]) {
    let host_width = summaries
        .iter()
        .map(|s| s.host.len())
        .max()
        .unwrap_or(0)
        .max("HOST".len());

    let _ = writeln!(
        out,
        "{:<host_width$}  {:>5}  {:>5}  {:>7}  {:>8}  STATE",
        "HOST", "PORT", "CERTS", "EXPIRED", "EXPIRING"
    );
    for summary in summaries {
        let _ = writeln!(
            out,
            "{:<host_width$}  {:>5}  {:>5}  {:>7}  {:>8}  {}",
            summary.host,
            summary.port,
            summary.num_certs,
            summary.num_expired,
            summary.num_expiring,
            summary.state.label()
        );
    }
}

fn detail_blocks(out: &mut String, summaries: &[&ChainSummary]) {
    for summary in summaries {
        let _ = writeln!(out, "{} [{}]", summary.label, summary.state.label());
        let _ = writeln!(out, "\tCerts: {}", summary.num_certs);
        if let Some(next) = &summary.next_to_expire {
            let _ = writeln!(out, "\tNext to expire: {next}");
        }
        let _ = writeln!(out, "\tStatus: {}", summary.status);
        out.push('\n');
    }
}

/// Builds the `certsum` plugin output for a finished discovery run.
///
/// # Arguments
///
/// * `report` - What the discovery pipeline observed
/// * `config` - Thresholds and display flags
///
/// # Returns
///
/// Plugin output whose state is the worst chain state (OK when no chain has
/// problems or none was found).
pub fn discovery_summary(report: &DiscoveryReport, config: &CertSumConfig) -> PluginOutput {
    let summaries: Vec<ChainSummary> = report
        .chains
        .iter()
        .map(|chain| summarize_chain(chain, config))
        .collect();
    let state = overall_state(&summaries);
    let num_problems = summaries.iter().filter(|s| s.has_problems()).count();

    let shown: Vec<&ChainSummary> = summaries
        .iter()
        .filter(|s| config.show_hosts_with_valid_certs || s.has_problems())
        .collect();

    let mut out = String::new();
    let _ = writeln!(
        out,
        "Checked {} port(s) on {} host(s): {} open, {} chain(s) retrieved\n",
        report.num_ports_checked(),
        report.port_results.len(),
        report.num_open_ports(),
        report.chains.len()
    );

    if shown.is_empty() {
        let _ = writeln!(out, "No certificate chains to list.\n");
    } else if config.show_overview {
        overview_table(&mut out, &shown);
        out.push('\n');
    } else {
        detail_blocks(&mut out, &shown);
    }

    let hidden = summaries.len() - shown.len();
    if hidden > 0 {
        let _ = writeln!(out, "{hidden} chain(s) without problems not shown.\n");
    }

    if !report.fetch_failures.is_empty() {
        let _ = writeln!(out, "Certificate retrieval failures:");
        for failure in &report.fetch_failures {
            let _ = writeln!(
                out,
                "\t{} ({}):{}: {}",
                failure.host_val, failure.ip, failure.port, failure.error
            );
        }
        out.push('\n');
    }

    if config.show_hosts_with_closed_ports {
        let closed = report.hosts_with_closed_ports();
        let _ = writeln!(out, "Hosts with closed ports: {}", closed.len());
        for ip in closed {
            let _ = writeln!(out, "\t{ip}");
        }
        out.push('\n');
    }

    if config.show_port_scan_results {
        let _ = writeln!(out, "Port scan results:");
        for (ip, results) in &report.port_results {
            let ports = results
                .iter()
                .map(|r| {
                    let status = if r.open { "open" } else { "closed" };
                    format!("{}/{status}", r.port)
                })
                .collect::<Vec<_>>()
                .join(", ");
            let _ = writeln!(out, "\t{ip}: {ports}");
        }
        out.push('\n');
    }

    if report.timed_out {
        let _ = writeln!(
            out,
            "NOTE: discovery stopped early after {} seconds without activity; results are partial.",
            config.discovery.inactivity_timeout.as_secs()
        );
    }

    let mut output = PluginOutput::new();
    output.set_state(state);
    output.set_service_output(format!(
        "{}: {num_problems} of {} certificate chain(s) with problems [OK: {}, WARNING: {}, CRITICAL: {}]",
        state.label(),
        summaries.len(),
        summaries.iter().filter(|s| s.state == ServiceState::Ok).count(),
        summaries.iter().filter(|s| s.state == ServiceState::Warning).count(),
        summaries.iter().filter(|s| s.state == ServiceState::Critical).count(),
    ));
    output.set_long_service_output(out);
    output
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::net::{IpAddr, Ipv4Addr};

    use super::*;
    use crate::certs::test_helpers;
    use crate::discovery::{DiscoveryOptions, FetchFailure, PortCheckResult};

    fn config() -> CertSumConfig {
        CertSumConfig {
            hosts: vec!["192.0.2.0/30".to_string()],
            discovery: DiscoveryOptions::default(),
            age_warning: 30,
            age_critical: 15,
            show_hosts_with_closed_ports: false,
            show_hosts_with_valid_certs: false,
            show_port_scan_results: false,
            show_overview: false,
            omit_sans_entries: false,
        }
    }

    fn discovered(last_octet: u8, leaf_days: i64) -> DiscoveredCertChain {
        let ip = IpAddr::V4(Ipv4Addr::new(192, 0, 2, last_octet));
        DiscoveredCertChain {
            given: "192.0.2.0/30".to_string(),
            host_val: ip.to_string(),
            ip,
            port: 443,
            chain: test_helpers::chain(&["a.test"], leaf_days, 1000, 2000),
        }
    }

    fn port_result(last_octet: u8, open: bool) -> PortCheckResult {
        let ip = IpAddr::V4(Ipv4Addr::new(192, 0, 2, last_octet));
        PortCheckResult {
            given: "192.0.2.0/30".to_string(),
            host_val: ip.to_string(),
            ip,
            port: 443,
            open,
            err: None,
        }
    }

    fn report(chains: Vec<DiscoveredCertChain>) -> DiscoveryReport {
        let mut port_results = BTreeMap::new();
        port_results.insert(port_result(1, true).ip, vec![port_result(1, true)]);
        port_results.insert(port_result(2, false).ip, vec![port_result(2, false)]);
        DiscoveryReport {
            port_results,
            chains,
            fetch_failures: Vec::new(),
            timed_out: false,
        }
    }

    #[test]
    fn test_summarize_chain_states() {
        let config = config();
        assert_eq!(summarize_chain(&discovered(1, 400), &config).state, ServiceState::Ok);
        assert_eq!(summarize_chain(&discovered(1, 20), &config).state, ServiceState::Warning);

        let expired = summarize_chain(&discovered(1, -2), &config);
        assert_eq!(expired.state, ServiceState::Critical);
        assert_eq!(expired.num_expired, 1);
        assert_eq!(expired.num_certs, 3);
        assert!(expired.status.contains("expired"));
    }

    #[test]
    fn test_overall_state_is_worst() {
        let config = config();
        let summaries = vec![
            summarize_chain(&discovered(1, 400), &config),
            summarize_chain(&discovered(2, 20), &config),
        ];
        assert_eq!(overall_state(&summaries), ServiceState::Warning);
        assert_eq!(overall_state(&[]), ServiceState::Ok);
    }

    #[test]
    fn test_valid_chains_hidden_by_default() {
        let mut config = config();
        let report = report(vec![discovered(1, 400)]);

        let output = discovery_summary(&report, &config);
        assert_eq!(output.state(), ServiceState::Ok);
        let rendered = output.render();
        assert!(rendered.starts_with("OK: 0 of 1 certificate chain(s) with problems"));
        assert!(rendered.contains("1 chain(s) without problems not shown."));
        assert!(!rendered.contains("192.0.2.1:443 [OK]"));

        config.show_hosts_with_valid_certs = true;
        let rendered = discovery_summary(&report, &config).render();
        assert!(rendered.contains("192.0.2.1:443 [OK]"));
    }

    #[test]
    fn test_overview_table_and_sections() {
        let mut config = config();
        config.show_overview = true;
        config.show_hosts_with_closed_ports = true;
        config.show_port_scan_results = true;

        let mut report = report(vec![discovered(1, -2)]);
        report.fetch_failures.push(FetchFailure {
            host_val: "192.0.2.3".to_string(),
            ip: IpAddr::V4(Ipv4Addr::new(192, 0, 2, 3)),
            port: 443,
            error: "TLS handshake failed".to_string(),
        });
        report.timed_out = true;

        let output = discovery_summary(&report, &config);
        assert_eq!(output.state(), ServiceState::Critical);
        let rendered = output.render();
        assert!(rendered.contains("HOST"));
        assert!(rendered.contains("EXPIRING  STATE"));
        assert!(rendered.contains("CRITICAL\n"));
        assert!(rendered.contains("Hosts with closed ports: 1\n\t192.0.2.2"));
        assert!(rendered.contains("\t192.0.2.1: 443/open"));
        assert!(rendered.contains("192.0.2.3 (192.0.2.3):443: TLS handshake failed"));
        assert!(rendered.contains("results are partial"));
    }
}
