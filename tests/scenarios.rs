//! End-to-end scenarios: chains read from disk, validated and rendered as plugin output.

mod helpers;

use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use std::sync::Arc;

use cert_status::app::{plugin_output, retrieve_chain, validate_chain};
use cert_status::config::{ChainSource, CheckCertConfig, MAX_HOST_EXPANSION};
use cert_status::error_handling::HostError;
use cert_status::hosts::parse_ip_pattern;
use cert_status::validation::{
    run_validators, ValidationInputs, ValidationOptions, CHECK_NAME_CHAIN_ORDER,
    CHECK_NAME_EXPIRATION, CHECK_NAME_HOSTNAME, CHECK_NAME_SANS, IGNORE_EMPTY_SANS_FLAG,
};
use cert_status::ServiceState;

use helpers::{generate_chain, self_signed_leaf, write_pem};

fn file_config(path: PathBuf, inputs: ValidationInputs, options: ValidationOptions) -> CheckCertConfig {
    CheckCertConfig {
        source: ChainSource::File(path),
        inputs,
        options,
    }
}

fn default_inputs() -> ValidationInputs {
    ValidationInputs {
        age_warning: Some(30),
        age_critical: Some(15),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_expired_leaf_is_critical() {
    let dir = tempfile::tempdir().expect("temp dir");
    let leaf = generate_chain(&["a.test"], -1, 400, 3650).certs()[0].clone();
    let path = write_pem(dir.path(), "leaf.pem", &[leaf]);

    let config = file_config(path, default_inputs(), ValidationOptions::default());
    let chain = retrieve_chain(&config.source).await.expect("chain read");
    let results = validate_chain(chain, &config);

    assert_eq!(results.state(), ServiceState::Critical);
    let expiration = results.get(CHECK_NAME_EXPIRATION).expect("expiration result");
    assert_eq!(expiration.state(), ServiceState::Critical);
    assert_eq!(expiration.priority(), 3 + 999);

    let output = plugin_output(&results);
    let rendered = output.render();
    let first_line = rendered.lines().next().expect("first line");
    assert!(first_line.starts_with("CRITICAL:"), "{first_line}");
    assert!(first_line.contains("expired"), "{first_line}");
    assert_eq!(output.state().exit_code(), 2);
}

#[tokio::test]
async fn test_expiring_intermediate_ignored() {
    let dir = tempfile::tempdir().expect("temp dir");
    let certs = generate_chain(&["a.test"], 120, 10, 3650).certs();
    let path = write_pem(dir.path(), "chain.pem", &certs);

    // The root presence result is ignored so only expiration drives the state.
    let options = ValidationOptions {
        ignore_expiring_intermediate_certificates: true,
        ignore_validation_result_root: true,
        ..Default::default()
    };
    let config = file_config(path, default_inputs(), options);
    let chain = retrieve_chain(&config.source).await.expect("chain read");
    let results = validate_chain(chain, &config);

    let expiration = results.get(CHECK_NAME_EXPIRATION).expect("expiration result");
    assert!(expiration.is_ignored());
    assert_eq!(expiration.state(), ServiceState::Ok);
    assert_eq!(expiration.priority(), 3);
    assert_eq!(results.state(), ServiceState::Ok);
}

#[test]
fn test_sans_mismatch_is_critical() {
    let certs = generate_chain(&["a.test", "b.test"], 120, 400, 3650).certs();
    let inputs = ValidationInputs {
        sans_entries: vec!["a.test".to_string(), "c.test".to_string()],
        ..default_inputs()
    };
    let results = run_validators(Arc::from(certs), &inputs, &ValidationOptions::default());

    assert_eq!(results.state(), ServiceState::Critical);
    let sans = results.get(CHECK_NAME_SANS).expect("SANs result");
    assert_eq!(sans.state(), ServiceState::Critical);
    assert!(sans.report().contains("missing: [c.test], unexpected: [b.test]"));
    assert!(plugin_output(&results)
        .render()
        .starts_with("CRITICAL: SANs List validation failed"));
}

#[test]
fn test_hostname_empty_sans_ignored() {
    let cert = self_signed_leaf("host.test", &[], 120);
    let inputs = ValidationInputs {
        server: "host.test".to_string(),
        ..default_inputs()
    };
    let options = ValidationOptions {
        ignore_hostname_verification_if_empty_sans: true,
        ..Default::default()
    };
    let results = run_validators(Arc::from(vec![cert]), &inputs, &options);

    let hostname = results.get(CHECK_NAME_HOSTNAME).expect("hostname result");
    assert!(hostname.is_ignored());
    assert_eq!(hostname.state(), ServiceState::Ok);
    assert!(hostname.report().contains(IGNORE_EMPTY_SANS_FLAG));
    assert!(results.report().contains(IGNORE_EMPTY_SANS_FLAG));
}

#[test]
fn test_reversed_chain_order_is_warning() {
    let certs = generate_chain(&["a.test"], 120, 400, 3650).certs();
    let reversed: Vec<_> = certs.into_iter().rev().collect();
    let options = ValidationOptions {
        ignore_validation_result_root: true,
        ..Default::default()
    };
    let results = run_validators(Arc::from(reversed), &default_inputs(), &options);

    let order = results.get(CHECK_NAME_CHAIN_ORDER).expect("chain order result");
    assert_eq!(order.state(), ServiceState::Warning);
    assert_eq!(results.state(), ServiceState::Warning);

    let report = order.report();
    let recommended = report
        .split("Recommended order:")
        .nth(1)
        .expect("recommended section");
    assert!(recommended.trim_start().starts_with("1. a.test (leaf)"), "{report}");
}

#[test]
fn test_host_pattern_expansion() {
    let cidr = parse_ip_pattern("10.0.0.0/30", MAX_HOST_EXPANSION)
        .expect("valid CIDR")
        .expect("IP pattern");
    assert_eq!(
        cidr.expanded,
        vec![
            IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1)),
            IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2)),
        ]
    );

    let range = parse_ip_pattern("192.168.1.10-12", MAX_HOST_EXPANSION)
        .expect("valid range")
        .expect("IP pattern");
    assert_eq!(
        range.expanded,
        (10..=12)
            .map(|last| IpAddr::V4(Ipv4Addr::new(192, 168, 1, last)))
            .collect::<Vec<_>>()
    );

    let err = parse_ip_pattern("192.168.1.10-5", MAX_HOST_EXPANSION).expect_err("inverted range");
    assert!(matches!(err, HostError::UnrecognizedIpRange(_)));
    assert!(err.to_string().starts_with("unrecognized IP range"));
}
