//! Error type definitions.
//!
//! This module defines the sentinel errors used throughout the crate. Validators never
//! return these directly; they record one of the [`ValidationError`] variants inside
//! their result so the report can explain what failed.

use std::time::Duration;

use log::SetLoggerError;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the DNS resolver.
    #[error("DNS resolver initialization error: {0}")]
    DnsResolverError(String),
}

/// Errors produced while reading certificates from files or raw bytes.
#[derive(Error, Debug)]
pub enum CertError {
    /// The input contains a PEM block that is not a certificate (key, CSR, CRL, ...).
    #[error("unsupported file format: found {0} block")]
    UnsupportedFileFormat(String),

    /// The input is empty or whitespace only.
    #[error("empty cert file")]
    EmptyCertFile,

    /// A `BEGIN CERTIFICATE` block with no content.
    #[error("empty cert block")]
    EmptyCertBlock,

    /// The DER content could not be parsed as an X.509 certificate.
    #[error("malformed certificate: {0}")]
    MalformedCertificate(String),

    /// Parsing completed without finding a single certificate.
    #[error("no certs found")]
    NoCertsFound,

    /// The certificate file could not be read.
    #[error("failed to read cert file: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors produced by the signature verifier.
///
/// Every variant renders with the `signature verification failed` prefix so callers
/// can treat them as one failure class.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignatureError {
    /// The issued certificate's issuer DN does not match the issuer's subject DN.
    #[error("signature verification failed: distinguished name mismatch")]
    NameMismatch,

    /// The signature algorithm has no verification path.
    #[error("signature verification failed: unsupported algorithm {0}")]
    UnsupportedAlgorithm(String),

    /// The issuer's public key does not fit the signature algorithm.
    #[error("signature verification failed: issuer public key is not {0}")]
    KeyMismatch(&'static str),

    /// The signature did not verify.
    #[error("signature verification failed: {0}")]
    Invalid(String),
}

/// Sentinel errors recorded by validators.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationError {
    /// Preconditions were not met (empty chain, missing threshold or hostname value).
    #[error("missing value")]
    MissingValue,

    /// The chain is empty.
    #[error("no certs found")]
    NoCertsFound,

    /// Only a single certificate was presented.
    #[error("incomplete chain")]
    IncompleteChain,

    /// At least one evaluated certificate has expired.
    #[error("expired certs found")]
    ExpiredCerts,

    /// At least one evaluated certificate expires within the thresholds.
    #[error("expiring certs found")]
    ExpiringCerts,

    /// The leaf certificate is not valid for the requested hostname.
    #[error("hostname verification failed")]
    HostnameVerificationFailed,

    /// The leaf certificate has no SANs entries.
    #[error("x509 cert relies on legacy Common Name field, use SANs instead")]
    LegacyCommonName,

    /// Required SANs entries are absent from the leaf certificate.
    #[error("missing SANs")]
    MissingSans,

    /// The leaf certificate carries SANs entries that were not requested.
    #[error("unexpected SANs")]
    UnexpectedSans,

    /// Both missing and unexpected SANs entries were found.
    #[error("missing and unexpected SANs")]
    MissingAndUnexpectedSans,

    /// The chain is not ordered leaf first, each cert followed by its issuer.
    #[error("misordered chain")]
    MisorderedChain,

    /// The served chain contains one or more root certificates.
    #[error("root cert(s) found")]
    RootCertsFound,
}

/// Errors produced while expanding host patterns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    /// The pattern looked like an IP address but could not be parsed.
    #[error("unrecognized IP address: {0}")]
    UnrecognizedIpAddress(String),

    /// The pattern looked like a CIDR or dash range but could not be parsed.
    #[error("unrecognized IP range: {0}")]
    UnrecognizedIpRange(String),

    /// The pattern was treated as a hostname and DNS resolution failed.
    #[error("hostname failed to resolve: {0}")]
    ResolveFailed(String),

    /// A dash-range pattern did not contain exactly four octets.
    #[error("octet index invalid: expected 4 octets in {0}")]
    OctetIndexInvalid(String),

    /// The pattern expands to more addresses than allowed.
    #[error("IP range too large: {pattern} expands to more than {limit} addresses")]
    RangeTooLarge {
        /// Pattern as given by the user.
        pattern: String,
        /// Maximum number of addresses allowed per pattern.
        limit: usize,
    },
}

/// Errors produced while retrieving a certificate chain over TLS.
#[derive(Error, Debug)]
pub enum FetchError {
    /// A required input was empty.
    #[error("missing value: {0}")]
    MissingValue(&'static str),

    /// The IP address could not be parsed.
    #[error("invalid IP address {0:?}")]
    InvalidAddress(String),

    /// The value given for SNI is not a valid server name.
    #[error("invalid server name {0:?}")]
    InvalidServerName(String),

    /// The TCP connection could not be established.
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        /// Address that was dialed.
        addr: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The TLS handshake failed.
    #[error("TLS handshake with {addr} failed: {source}")]
    Handshake {
        /// Address of the peer.
        addr: String,
        /// Underlying I/O error reported by rustls.
        #[source]
        source: std::io::Error,
    },

    /// Connecting or the handshake did not finish in time.
    #[error("{stage} with {addr} timed out after {timeout:?}")]
    Timeout {
        /// Which step timed out.
        stage: &'static str,
        /// Address of the peer.
        addr: String,
        /// Configured timeout.
        timeout: Duration,
    },

    /// The TLS client could not be configured.
    #[error("TLS configuration error: {0}")]
    Tls(#[from] rustls::Error),

    /// The peer completed the handshake without presenting certificates.
    #[error("no certificates presented by {0}")]
    NoPeerCerts(String),

    /// A presented certificate could not be parsed.
    #[error(transparent)]
    Cert(#[from] CertError),
}

/// Error category recorded for a single port check.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PortCheckError {
    /// The TCP dial failed or timed out.
    #[error("dial failure: {0}")]
    Dial(String),

    /// The socket could not be configured to disable TCP keep-alive.
    #[error("failed to disable TCP keep-alive: {0}")]
    KeepAlive(String),

    /// The connection was established but closing it failed.
    #[error("close failure: {0}")]
    Close(String),
}

/// A configuration value failed validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid {field}: {message}")]
pub struct ConfigError {
    /// Name of the CLI flag that failed validation.
    pub field: &'static str,
    /// Human readable explanation.
    pub message: String,
}

impl ConfigError {
    pub(crate) fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Errors produced while obtaining a chain from a file or a server.
#[derive(Error, Debug)]
pub enum RetrievalError {
    /// The certificate file could not be read or parsed.
    #[error(transparent)]
    File(#[from] CertError),

    /// The server name did not resolve.
    #[error(transparent)]
    Resolve(#[from] HostError),

    /// The chain could not be retrieved over TLS.
    #[error(transparent)]
    Fetch(#[from] FetchError),
}
