//! Configuration parsing and validation tests.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use super::*;
use crate::certs::ChainPosition;

fn check(args: &[&str]) -> CheckCertOpt {
    CheckCertOpt::try_parse_from(std::iter::once("check_cert").chain(args.iter().copied()))
        .expect("arguments parse")
}

#[test]
fn test_log_level_conversion() {
    assert_eq!(log::LevelFilter::from(LogLevel::Error), log::LevelFilter::Error);
    assert_eq!(log::LevelFilter::from(LogLevel::Warn), log::LevelFilter::Warn);
    assert_eq!(log::LevelFilter::from(LogLevel::Info), log::LevelFilter::Info);
    assert_eq!(log::LevelFilter::from(LogLevel::Debug), log::LevelFilter::Debug);
    assert_eq!(log::LevelFilter::from(LogLevel::Trace), log::LevelFilter::Trace);
}

#[test]
fn test_check_cert_defaults() {
    let config = check(&["--server", "www.example.test"])
        .validate()
        .expect("valid");
    assert_eq!(
        config.source,
        ChainSource::Server {
            server: "www.example.test".to_string(),
            dns_name: String::new(),
            port: DEFAULT_PORT,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    );
    assert_eq!(config.inputs.age_warning, Some(DEFAULT_AGE_WARNING_DAYS));
    assert_eq!(config.inputs.age_critical, Some(DEFAULT_AGE_CRITICAL_DAYS));
    assert!(config.inputs.hostname_check_requested());
    assert!(!config.inputs.sans_check_requested());
}

#[test]
fn test_source_is_exclusive() {
    let err = check(&["--server", "a.test", "--input-filename", "chain.pem"])
        .validate()
        .expect_err("both sources");
    assert_eq!(err.field, "server");

    let err = check(&[]).validate().expect_err("no source");
    assert_eq!(err.field, "server");

    let err = check(&["--server", "a.test", "--port", "0"])
        .validate()
        .expect_err("zero port");
    assert_eq!(err.field, "port");
}

#[test]
fn test_file_source_uses_dns_name_for_hostname() {
    let config = check(&["-f", "chain.pem", "--dns-name", "a.test"])
        .validate()
        .expect("valid");
    assert_eq!(config.source, ChainSource::File(PathBuf::from("chain.pem")));
    assert_eq!(config.inputs.server, "");
    assert_eq!(config.inputs.dns_name, "a.test");
    assert!(config.inputs.hostname_check_requested());
}

#[test]
fn test_age_rules() {
    assert!(validate_ages(30, 15).is_ok());
    assert_eq!(validate_ages(15, 15).expect_err("equal").field, "age-critical");
    assert_eq!(validate_ages(10, 20).expect_err("inverted").field, "age-critical");
    assert_eq!(validate_ages(0, 0).expect_err("zero").field, "age-warning");

    let err = check(&["-s", "a.test", "-w", "10", "-c", "20"])
        .validate()
        .expect_err("critical above warning");
    assert_eq!(err.field, "age-critical");
}

#[test]
fn test_sans_entries_and_keyword() {
    let config = check(&["-s", "a.test", "--sans-entries", "a.test, b.test"])
        .validate()
        .expect("valid");
    assert_eq!(config.inputs.sans_entries, vec!["a.test", "b.test"]);
    assert!(config.inputs.sans_check_requested());

    let config = check(&["-s", "a.test", "--sans-entries", "skipsanschecks"])
        .validate()
        .expect("valid");
    assert!(!config.inputs.sans_check_requested());
}

#[test]
fn test_ignore_validation_results() {
    let config = check(&[
        "-s",
        "a.test",
        "--ignore-validation-result",
        "root,chain-order",
        "--ignore-expired-root-certs",
    ])
    .validate()
    .expect("valid");
    assert!(config.options.ignore_validation_result_root);
    assert!(config.options.ignore_validation_result_chain_order);
    assert!(!config.options.ignore_validation_result_expiration);
    assert!(config.options.ignore_expired_root_certificates);
}

#[test]
fn test_everything_ignored_is_rejected() {
    let err = check(&[
        "-f",
        "chain.pem",
        "--ignore-validation-result",
        "expiration,chain-order,root",
    ])
    .validate()
    .expect_err("nothing left to check");
    assert_eq!(err.field, "ignore-validation-result");

    // Hostname still applies when a server is given.
    assert!(check(&[
        "-s",
        "a.test",
        "--ignore-validation-result",
        "expiration,chain-order,root",
    ])
    .validate()
    .is_ok());
}

#[test]
fn test_lscert_flags() {
    let opt = LsCertOpt::try_parse_from([
        "lscert",
        "-f",
        "chain.pem",
        "--emit-cert-text",
        "--show-overview",
    ])
    .expect("parses");
    let config = opt.validate().expect("valid");
    assert!(config.emit_cert_text);
    assert!(config.show_overview);
}

#[test]
fn test_certsum_validation() {
    let opt = CertSumOpt::try_parse_from([
        "certsum",
        "--hosts",
        "a.test,192.0.2.0/30,a.test",
        "--cert-ports",
        "8443,443,443",
    ])
    .expect("parses");
    let config = opt.validate().expect("valid");
    assert_eq!(config.hosts, vec!["a.test", "192.0.2.0/30"]);
    assert_eq!(config.discovery.ports, vec![443, 8443]);
    assert_eq!(config.discovery.cert_rate_limit, DEFAULT_PORT_SCAN_RATE_LIMIT);
    assert_eq!(
        config.discovery.port_timeout,
        Duration::from_millis(DEFAULT_PORT_SCAN_TIMEOUT_MS)
    );

    let opt = CertSumOpt::try_parse_from(["certsum", "--hosts", "a.test", "--cert-ports", "0"])
        .expect("parses");
    assert_eq!(opt.validate().expect_err("zero port").field, "cert-ports");

    let opt = CertSumOpt::try_parse_from(["certsum", "--hosts", "a.test", "--host-rate-limit", "0"])
        .expect("parses");
    assert_eq!(opt.validate().expect_err("zero limit").field, "host-rate-limit");

    let opt = CertSumOpt::try_parse_from(["certsum", "--hosts", " "]).expect("parses");
    assert_eq!(opt.validate().expect_err("blank hosts").field, "hosts");
}

#[test]
fn test_cpcert_validation() {
    let opt = CpCertOpt::try_parse_from(["cpcert", "-f", "in.pem", "-o", "out.pem"]).expect("parses");
    let config = opt.validate().expect("valid");
    assert_eq!(config.keep, vec![CertTypeFilter::All]);
    assert!(config.keeps(ChainPosition::Root));

    let opt = CpCertOpt::try_parse_from([
        "cpcert",
        "-f",
        "in.pem",
        "-o",
        "out.pem",
        "--cert-types-to-keep",
        "leaf,intermediate",
    ])
    .expect("parses");
    let config = opt.validate().expect("valid");
    assert!(config.keeps(ChainPosition::Leaf));
    assert!(config.keeps(ChainPosition::LeafSelfSigned));
    assert!(config.keeps(ChainPosition::Intermediate));
    assert!(!config.keeps(ChainPosition::Root));

    let opt = CpCertOpt::try_parse_from(["cpcert", "-f", "in.pem"]).expect("parses");
    assert_eq!(opt.validate().expect_err("no output").field, "output-filename");

    let opt = CpCertOpt::try_parse_from(["cpcert", "-f", "in.pem", "-o", "in.pem"]).expect("parses");
    assert_eq!(opt.validate().expect_err("same file").field, "output-filename");
}

#[test]
fn test_chain_source_describe() {
    let source = ChainSource::Server {
        server: "192.0.2.1".to_string(),
        dns_name: "a.test".to_string(),
        port: 8443,
        timeout: Duration::from_secs(1),
    };
    assert_eq!(source.describe(), "192.0.2.1:8443 (SNI: a.test)");
    assert_eq!(
        ChainSource::File(PathBuf::from("chain.pem")).describe(),
        "chain.pem"
    );
}
