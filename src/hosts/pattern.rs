//! IP literal, CIDR and dash-range parsing.

use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;

use ipnetwork::IpNetwork;

use crate::error_handling::HostError;

/// Which syntax a pattern was recognized as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternKind {
    /// A single IPv4 or IPv6 address.
    Address,
    /// CIDR notation, e.g. `192.0.2.0/24`.
    Cidr,
    /// Dash-partial IPv4 range, e.g. `192.0.2.10-20`.
    DashRange,
    /// Anything else; resolved through DNS.
    Hostname,
}

/// Decides how a pattern should be expanded.
pub fn pattern_kind(pattern: &str) -> PatternKind {
    if pattern.contains('/') {
        PatternKind::Cidr
    } else if pattern.parse::<IpAddr>().is_ok() {
        PatternKind::Address
    } else if pattern.contains('.')
        && pattern
            .chars()
            .all(|c| c.is_ascii_digit() || c == '.' || c == '-')
    {
        PatternKind::DashRange
    } else {
        PatternKind::Hostname
    }
}

fn cidr_size(network: &IpNetwork) -> u128 {
    let host_bits = match network {
        IpNetwork::V4(net) => 32 - u32::from(net.prefix()),
        IpNetwork::V6(net) => 128 - u32::from(net.prefix()),
    };
    1u128.checked_shl(host_bits).unwrap_or(u128::MAX)
}

/// Expands a CIDR block into host addresses.
///
/// IPv4 networks with four or more addresses exclude the network and broadcast
/// addresses. `/31` and `/32` networks, and every IPv6 network, keep all addresses.
///
/// # Errors
///
/// Returns `HostError::UnrecognizedIpRange` if the block does not parse, or
/// `HostError::RangeTooLarge` if it holds more than `limit` addresses.
pub fn expand_cidr(pattern: &str, limit: usize) -> Result<Vec<IpAddr>, HostError> {
    let network = IpNetwork::from_str(pattern)
        .map_err(|_| HostError::UnrecognizedIpRange(pattern.to_string()))?;

    if cidr_size(&network) > limit as u128 {
        return Err(HostError::RangeTooLarge {
            pattern: pattern.to_string(),
            limit,
        });
    }

    let addrs = match network {
        IpNetwork::V4(net) if net.prefix() <= 30 => {
            let network_addr = net.network();
            let broadcast = net.broadcast();
            net.iter()
                .filter(|ip| *ip != network_addr && *ip != broadcast)
                .map(IpAddr::V4)
                .collect()
        }
        IpNetwork::V4(net) => net.iter().map(IpAddr::V4).collect(),
        IpNetwork::V6(net) => net.iter().map(IpAddr::V6).collect(),
    };
    Ok(addrs)
}

/// Parses one octet of a dash range into its inclusive bounds.
fn parse_octet(pattern: &str, octet: &str) -> Result<(u8, u8), HostError> {
    let range_err = || HostError::UnrecognizedIpRange(pattern.to_string());

    match octet.split('-').collect::<Vec<_>>().as_slice() {
        [single] => {
            let value = single.parse::<u8>().map_err(|_| {
                if pattern.contains('-') {
                    range_err()
                } else {
                    HostError::UnrecognizedIpAddress(pattern.to_string())
                }
            })?;
            Ok((value, value))
        }
        [start, end] => {
            let start = start.parse::<u8>().map_err(|_| range_err())?;
            let end = end.parse::<u8>().map_err(|_| range_err())?;
            if start >= end {
                return Err(range_err());
            }
            Ok((start, end))
        }
        _ => Err(range_err()),
    }
}

/// Expands a dash-partial IPv4 range such as `10.0.1-2.5-10`.
///
/// Each of the four octets is a literal value or an inclusive `a-b` range with
/// `a < b`. The result is the Cartesian product of the octet sets.
///
/// # Errors
///
/// Returns `HostError::OctetIndexInvalid` if there are not exactly four octets,
/// `HostError::UnrecognizedIpRange` for malformed ranges, or
/// `HostError::RangeTooLarge` if the product exceeds `limit`.
pub fn expand_dash_range(pattern: &str, limit: usize) -> Result<Vec<IpAddr>, HostError> {
    let octets: Vec<&str> = pattern.split('.').collect();
    if octets.len() != 4 {
        return Err(HostError::OctetIndexInvalid(pattern.to_string()));
    }

    let bounds = octets
        .iter()
        .map(|octet| parse_octet(pattern, octet))
        .collect::<Result<Vec<_>, _>>()?;

    let total: usize = bounds
        .iter()
        .map(|(start, end)| usize::from(*end - *start) + 1)
        .product();
    if total > limit {
        return Err(HostError::RangeTooLarge {
            pattern: pattern.to_string(),
            limit,
        });
    }

    let mut addrs = Vec::with_capacity(total);
    for a in bounds[0].0..=bounds[0].1 {
        for b in bounds[1].0..=bounds[1].1 {
            for c in bounds[2].0..=bounds[2].1 {
                for d in bounds[3].0..=bounds[3].1 {
                    addrs.push(IpAddr::V4(Ipv4Addr::new(a, b, c, d)));
                }
            }
        }
    }
    Ok(addrs)
}
