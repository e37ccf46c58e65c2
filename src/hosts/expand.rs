//! Host pattern expansion.

use std::collections::HashSet;
use std::net::IpAddr;

use hickory_resolver::TokioAsyncResolver;
use log::{debug, warn};

use super::pattern::{expand_cidr, expand_dash_range, pattern_kind, PatternKind};
use crate::error_handling::HostError;

/// A user supplied host pattern and the addresses it expands to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostPattern {
    /// Pattern exactly as given.
    pub given: String,
    /// Addresses to scan, in expansion order.
    pub expanded: Vec<IpAddr>,
    /// The pattern was a host name resolved through DNS.
    pub resolved: bool,
    /// The pattern was a CIDR block or dash range.
    pub range: bool,
}

impl HostPattern {
    /// Name to send for SNI when scanning `ip`: the given host name when it was
    /// resolved, otherwise the IP literal.
    pub fn sni_name(&self, ip: &IpAddr) -> String {
        if self.resolved {
            self.given.clone()
        } else {
            ip.to_string()
        }
    }
}

/// Expands a literal pattern without touching DNS.
///
/// # Returns
///
/// `Ok(None)` when the pattern is a host name and needs resolution.
///
/// # Errors
///
/// Returns the parse error for malformed addresses or ranges.
pub fn parse_ip_pattern(pattern: &str, limit: usize) -> Result<Option<HostPattern>, HostError> {
    let given = pattern.trim();
    let (expanded, range) = match pattern_kind(given) {
        PatternKind::Cidr => (expand_cidr(given, limit)?, true),
        PatternKind::DashRange => (expand_dash_range(given, limit)?, true),
        PatternKind::Address => {
            let ip = given
                .parse::<IpAddr>()
                .map_err(|_| HostError::UnrecognizedIpAddress(given.to_string()))?;
            (vec![ip], false)
        }
        PatternKind::Hostname => return Ok(None),
    };

    Ok(Some(HostPattern {
        given: given.to_string(),
        expanded,
        resolved: false,
        range,
    }))
}

/// Expands a host pattern into IP addresses.
///
/// IP literals, CIDR blocks and dash ranges are expanded locally; anything else
/// is resolved as a host name.
///
/// # Arguments
///
/// * `pattern` - Host pattern as given by the user
/// * `resolver` - DNS resolver for host names
/// * `limit` - Maximum number of addresses a single range may expand to
///
/// # Errors
///
/// Returns a `HostError` if the pattern is malformed, too large, or does not resolve.
pub async fn expand_host(
    pattern: &str,
    resolver: &TokioAsyncResolver,
    limit: usize,
) -> Result<HostPattern, HostError> {
    if let Some(parsed) = parse_ip_pattern(pattern, limit)? {
        debug!(
            "Expanded {} to {} address(es)",
            parsed.given,
            parsed.expanded.len()
        );
        return Ok(parsed);
    }

    let given = pattern.trim();
    if given.is_empty() {
        return Err(HostError::UnrecognizedIpAddress(pattern.to_string()));
    }

    let response = resolver
        .lookup_ip(given)
        .await
        .map_err(|e| {
            warn!("Failed to resolve {given}: {e}");
            HostError::ResolveFailed(given.to_string())
        })?;
    let expanded: Vec<IpAddr> = response.iter().collect();
    if expanded.is_empty() {
        return Err(HostError::ResolveFailed(given.to_string()));
    }
    debug!("Resolved {given} to {expanded:?}");

    Ok(HostPattern {
        given: given.to_string(),
        expanded,
        resolved: true,
        range: false,
    })
}

/// Removes repeated patterns, keeping first-seen order.
///
/// Only the literal pattern text is compared: a host name and its IP address are
/// both kept since the caller asked for both.
pub fn dedupe_hosts(patterns: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    patterns
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .filter(|p| seen.insert(p.to_string()))
        .map(str::to_string)
        .collect()
}
