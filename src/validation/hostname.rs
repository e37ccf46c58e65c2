//! Hostname validator.

use std::fmt::Write;
use std::net::IpAddr;

use super::details::SANS_OMITTED;
use super::options::ValidationOptions;
use super::result::{
    CertChain, PriorityModifier, ResultCore, ValidationResult, BASELINE_PRIORITY_HOSTNAME,
    CHECK_NAME_HOSTNAME,
};
use crate::error_handling::ValidationError;
use crate::plugin::ServiceState;

/// CLI flag that relaxes hostname verification for leaves without SANs.
pub const IGNORE_EMPTY_SANS_FLAG: &str = "--ignore-hostname-verification-if-empty-sans";

/// Result of the hostname validator.
#[derive(Debug, Clone)]
pub struct HostnameValidationResult {
    core: ResultCore,
    hostname: String,
    applied: bool,
    omit_sans_entries: bool,
}

impl HostnameValidationResult {
    /// Value the leaf was verified against.
    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    fn leaf_sans(&self) -> &[String] {
        self.core
            .chain
            .first()
            .map(|leaf| leaf.dns_names())
            .unwrap_or_default()
    }
}

impl ValidationResult for HostnameValidationResult {
    fn core(&self) -> &ResultCore {
        &self.core
    }

    fn state(&self) -> ServiceState {
        if self.core.err.is_some() && !self.core.ignored {
            ServiceState::Critical
        } else {
            ServiceState::Ok
        }
    }

    fn status(&self) -> String {
        if !self.applied {
            return format!("{CHECK_NAME_HOSTNAME} validation not applied");
        }
        let outcome = self.core.outcome();
        match self.core.err {
            Some(ValidationError::MissingValue) => {
                format!("{CHECK_NAME_HOSTNAME} validation {outcome}: missing value")
            }
            Some(err) => format!(
                "{CHECK_NAME_HOSTNAME} validation using value \"{}\" {outcome}: {err}",
                self.hostname
            ),
            None => format!(
                "{CHECK_NAME_HOSTNAME} validation using value \"{}\" {outcome}",
                self.hostname
            ),
        }
    }

    fn overview(&self) -> String {
        format!("[HOSTNAME: {}, SANs entries: {}]", self.hostname, self.leaf_sans().len())
    }

    fn report(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.status());
        if let Some(err) = self.core.error_text() {
            let _ = writeln!(out, "\tError: {err}");
        }
        if !self.applied {
            return out;
        }

        let sans = self.leaf_sans();
        if self.omit_sans_entries {
            let _ = writeln!(out, "\tLeaf SANs entries: {SANS_OMITTED}");
        } else {
            let _ = writeln!(out, "\tLeaf SANs entries: [{}]", sans.join(", "));
        }

        if self.core.err == Some(ValidationError::LegacyCommonName) {
            if self.core.ignored {
                let _ = writeln!(
                    out,
                    "\tThe leaf cert has no SANs entries; failure ignored per {IGNORE_EMPTY_SANS_FLAG}"
                );
            } else {
                let _ = writeln!(
                    out,
                    "\tConsider reissuing the cert with SANs entries or use {IGNORE_EMPTY_SANS_FLAG} to ignore this failure"
                );
            }
        }
        out
    }
}

/// Matches `host` against a SANs DNS entry, honoring a single leftmost wildcard label.
///
/// Not delegated to `rustls::client::verify_server_name`: webpki refuses to parse
/// v1 end-entity certificates, which still need a hostname verdict here.
pub fn matches_dns_name(pattern: &str, host: &str) -> bool {
    let pattern = pattern.trim_end_matches('.').to_ascii_lowercase();
    let host = host.trim_end_matches('.').to_ascii_lowercase();
    if pattern.is_empty() || host.is_empty() {
        return false;
    }

    match pattern.strip_prefix("*.") {
        Some(suffix) => match host.split_once('.') {
            Some((label, rest)) => !label.is_empty() && rest == suffix && !suffix.is_empty(),
            None => false,
        },
        None => pattern == host,
    }
}

/// Validates that the leaf certificate is valid for the given server name.
///
/// The value checked is `dns_name` when set, otherwise `server`. Only SANs entries
/// are consulted; there is no Common Name fallback.
///
/// # Arguments
///
/// * `chain` - Certificates in presented order; only the first is checked
/// * `server` - Server name or IP address that was connected to
/// * `dns_name` - Optional name that overrides `server`
/// * `should_apply` - Whether the check was requested; if not the result is ignored
/// * `options` - Ignore flags and report options
pub fn validate_hostname(
    chain: CertChain,
    server: &str,
    dns_name: &str,
    should_apply: bool,
    options: &ValidationOptions,
) -> HostnameValidationResult {
    let hostname = if dns_name.trim().is_empty() {
        server.trim()
    } else {
        dns_name.trim()
    }
    .to_string();

    let mut core = ResultCore::new(
        CHECK_NAME_HOSTNAME,
        BASELINE_PRIORITY_HOSTNAME,
        chain,
        !should_apply || options.ignore_validation_result_hostname,
    );

    if should_apply {
        check_leaf(&mut core, &hostname, options);
    }

    HostnameValidationResult {
        core,
        hostname,
        applied: should_apply,
        omit_sans_entries: options.omit_sans_entries,
    }
}

fn check_leaf(core: &mut ResultCore, hostname: &str, options: &ValidationOptions) {
    let Some(leaf) = core.chain.first().cloned() else {
        core.fail(ValidationError::MissingValue, PriorityModifier::Maximum);
        core.with_detail("no certs found");
        return;
    };
    if hostname.is_empty() {
        core.fail(ValidationError::MissingValue, PriorityModifier::Maximum);
        core.with_detail("server or DNS name required");
        return;
    }

    if let Ok(ip) = hostname.parse::<IpAddr>() {
        if !leaf.ip_addresses().contains(&ip) {
            core.fail(
                ValidationError::HostnameVerificationFailed,
                PriorityModifier::Minimum,
            );
            core.with_detail(format!("IP address {ip} not listed in leaf cert SANs"));
        }
        return;
    }

    if leaf.dns_names().is_empty() {
        if options.ignore_hostname_verification_if_empty_sans {
            core.fail(ValidationError::LegacyCommonName, PriorityModifier::Minimum);
            core.ignored = true;
        } else {
            core.fail(ValidationError::LegacyCommonName, PriorityModifier::Medium);
        }
        return;
    }

    if !leaf
        .dns_names()
        .iter()
        .any(|name| matches_dns_name(name, hostname))
    {
        core.fail(
            ValidationError::HostnameVerificationFailed,
            PriorityModifier::Minimum,
        );
        core.with_detail(format!("leaf cert not valid for {hostname}"));
    }
}
