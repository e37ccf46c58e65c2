//! Configuration types.
//!
//! This module defines the enums shared by the command line tools and the plain
//! library configurations the option structs validate into.

use std::path::PathBuf;
use std::time::Duration;

use clap::ValueEnum;

use crate::certs::ChainPosition;
use crate::discovery::DiscoveryOptions;
use crate::validation::{ValidationInputs, ValidationOptions};

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Validators whose result can be ignored from the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ValidatorName {
    Expiration,
    Hostname,
    Sans,
    ChainOrder,
    Root,
}

/// Certificate types kept by `cpcert`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum CertTypeFilter {
    All,
    Leaf,
    Intermediate,
    Root,
}

impl CertTypeFilter {
    /// Whether a certificate at `position` passes this filter.
    ///
    /// Leaf includes self-signed leaves; unclassifiable certificates only pass `All`.
    pub fn matches(self, position: ChainPosition) -> bool {
        match self {
            CertTypeFilter::All => true,
            CertTypeFilter::Leaf => position.is_leaf(),
            CertTypeFilter::Intermediate => position == ChainPosition::Intermediate,
            CertTypeFilter::Root => position == ChainPosition::Root,
        }
    }
}

/// Where a certificate chain comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainSource {
    /// Retrieve over TLS.
    Server {
        server: String,
        /// Name sent for SNI instead of `server`; may be empty.
        dns_name: String,
        port: u16,
        timeout: Duration,
    },
    /// Read a PEM or DER file.
    File(PathBuf),
}

impl ChainSource {
    /// Human readable description, e.g. `www.example.com:443` or the file path.
    pub fn describe(&self) -> String {
        match self {
            ChainSource::Server {
                server,
                dns_name,
                port,
                ..
            } if !dns_name.is_empty() && dns_name != server => {
                format!("{server}:{port} (SNI: {dns_name})")
            }
            ChainSource::Server { server, port, .. } => format!("{server}:{port}"),
            ChainSource::File(path) => path.display().to_string(),
        }
    }
}

/// Validated `check_cert` configuration.
#[derive(Debug, Clone)]
pub struct CheckCertConfig {
    pub source: ChainSource,
    pub inputs: ValidationInputs,
    pub options: ValidationOptions,
}

/// Validated `lscert` configuration.
#[derive(Debug, Clone)]
pub struct LsCertConfig {
    pub check: CheckCertConfig,
    /// Print an OpenSSL-like text dump of every certificate.
    pub emit_cert_text: bool,
    /// Print only the validation overview instead of the per-certificate listing.
    pub show_overview: bool,
}

/// Validated `certsum` configuration.
#[derive(Debug, Clone)]
pub struct CertSumConfig {
    /// Deduplicated host patterns.
    pub hosts: Vec<String>,
    pub discovery: DiscoveryOptions,
    pub age_warning: u32,
    pub age_critical: u32,
    pub show_hosts_with_closed_ports: bool,
    pub show_hosts_with_valid_certs: bool,
    pub show_port_scan_results: bool,
    pub show_overview: bool,
    pub omit_sans_entries: bool,
}

/// Validated `cpcert` configuration.
#[derive(Debug, Clone)]
pub struct CpCertConfig {
    pub source: ChainSource,
    pub output: PathBuf,
    pub keep: Vec<CertTypeFilter>,
}

impl CpCertConfig {
    /// Whether a certificate at `position` should be written.
    pub fn keeps(&self, position: ChainPosition) -> bool {
        self.keep.iter().any(|filter| filter.matches(position))
    }
}
