//! Host expansion tests.

use std::net::IpAddr;

use super::*;
use crate::error_handling::HostError;

const LIMIT: usize = 65536;

fn ip(s: &str) -> IpAddr {
    s.parse().expect("valid IP")
}

#[test]
fn test_pattern_kind() {
    assert_eq!(pattern_kind("192.0.2.0/24"), PatternKind::Cidr);
    assert_eq!(pattern_kind("192.0.2.1"), PatternKind::Address);
    assert_eq!(pattern_kind("2001:db8::1"), PatternKind::Address);
    assert_eq!(pattern_kind("192.0.2.1-5"), PatternKind::DashRange);
    assert_eq!(pattern_kind("192.0.2"), PatternKind::DashRange);
    assert_eq!(pattern_kind("www.example.test"), PatternKind::Hostname);
    assert_eq!(pattern_kind("localhost"), PatternKind::Hostname);
}

#[test]
fn test_single_address() {
    let parsed = parse_ip_pattern(" 192.0.2.7 ", LIMIT)
        .expect("parses")
        .expect("not a host name");
    assert_eq!(parsed.given, "192.0.2.7");
    assert_eq!(parsed.expanded, vec![ip("192.0.2.7")]);
    assert!(!parsed.resolved);
    assert!(!parsed.range);
}

#[test]
fn test_cidr_excludes_network_and_broadcast() {
    let addrs = expand_cidr("192.0.2.0/30", LIMIT).expect("parses");
    assert_eq!(addrs, vec![ip("192.0.2.1"), ip("192.0.2.2")]);

    let addrs = expand_cidr("192.0.2.0/24", LIMIT).expect("parses");
    assert_eq!(addrs.len(), 254);
    assert_eq!(addrs.first(), Some(&ip("192.0.2.1")));
    assert_eq!(addrs.last(), Some(&ip("192.0.2.254")));
}

#[test]
fn test_cidr_small_networks_keep_all() {
    assert_eq!(
        expand_cidr("192.0.2.4/31", LIMIT).expect("parses"),
        vec![ip("192.0.2.4"), ip("192.0.2.5")]
    );
    assert_eq!(
        expand_cidr("192.0.2.9/32", LIMIT).expect("parses"),
        vec![ip("192.0.2.9")]
    );
}

#[test]
fn test_cidr_ipv6() {
    let addrs = expand_cidr("2001:db8::/126", LIMIT).expect("parses");
    assert_eq!(addrs.len(), 4);
    assert_eq!(addrs[0], ip("2001:db8::"));
}

#[test]
fn test_cidr_errors() {
    assert_eq!(
        expand_cidr("192.0.2.0/33", LIMIT),
        Err(HostError::UnrecognizedIpRange("192.0.2.0/33".to_string()))
    );
    assert!(matches!(
        expand_cidr("10.0.0.0/8", LIMIT),
        Err(HostError::RangeTooLarge { .. })
    ));
    assert!(matches!(
        expand_cidr("2001:db8::/0", LIMIT),
        Err(HostError::RangeTooLarge { .. })
    ));
}

#[test]
fn test_dash_range_cartesian_product() {
    let addrs = expand_dash_range("10.0.1-2.5-6", LIMIT).expect("parses");
    assert_eq!(
        addrs,
        vec![
            ip("10.0.1.5"),
            ip("10.0.1.6"),
            ip("10.0.2.5"),
            ip("10.0.2.6"),
        ]
    );
}

#[test]
fn test_dash_range_errors() {
    assert_eq!(
        expand_dash_range("10.0.1", LIMIT),
        Err(HostError::OctetIndexInvalid("10.0.1".to_string()))
    );
    assert_eq!(
        expand_dash_range("10.0.0.5-5", LIMIT),
        Err(HostError::UnrecognizedIpRange("10.0.0.5-5".to_string()))
    );
    assert_eq!(
        expand_dash_range("10.0.0.9-3", LIMIT),
        Err(HostError::UnrecognizedIpRange("10.0.0.9-3".to_string()))
    );
    assert_eq!(
        expand_dash_range("10.0.0.1-2-3", LIMIT),
        Err(HostError::UnrecognizedIpRange("10.0.0.1-2-3".to_string()))
    );
    assert_eq!(
        expand_dash_range("10.0.0.1-256", LIMIT),
        Err(HostError::UnrecognizedIpRange("10.0.0.1-256".to_string()))
    );
    assert_eq!(
        expand_dash_range("10.0.0.300", LIMIT),
        Err(HostError::UnrecognizedIpAddress("10.0.0.300".to_string()))
    );
    assert!(matches!(
        expand_dash_range("10.0-255.0-255.1-2", LIMIT),
        Err(HostError::RangeTooLarge { .. })
    ));
}

#[test]
fn test_hostname_needs_resolution() {
    assert_eq!(parse_ip_pattern("www.example.test", LIMIT), Ok(None));
}

#[test]
fn test_sni_name() {
    let literal = parse_ip_pattern("192.0.2.1", LIMIT)
        .expect("parses")
        .expect("literal");
    assert_eq!(literal.sni_name(&ip("192.0.2.1")), "192.0.2.1");

    let resolved = HostPattern {
        given: "www.example.test".to_string(),
        expanded: vec![ip("192.0.2.1")],
        resolved: true,
        range: false,
    };
    assert_eq!(resolved.sni_name(&ip("192.0.2.1")), "www.example.test");
}

#[test]
fn test_dedupe_hosts_keeps_order() {
    let hosts: Vec<String> = ["b.test", "192.0.2.1", "b.test", " a.test ", "", "192.0.2.1"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    assert_eq!(dedupe_hosts(&hosts), vec!["b.test", "192.0.2.1", "a.test"]);
}
