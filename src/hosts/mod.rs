//! Host pattern expansion.
//!
//! Turns the user's host list into concrete IP addresses:
//! - Single IPv4/IPv6 addresses
//! - CIDR blocks
//! - Dash-partial IPv4 ranges (`192.0.2.1-50`)
//! - Host names, resolved through DNS

mod expand;
mod pattern;

// Re-export public API
pub use expand::{dedupe_hosts, expand_host, parse_ip_pattern, HostPattern};
pub use pattern::{expand_cidr, expand_dash_range, pattern_kind, PatternKind};

#[cfg(test)]
mod tests;
