//! cert_status library: X.509 certificate chain inspection
//!
//! This library provides the building blocks behind the `check_cert`, `lscert`,
//! `certsum` and `cpcert` tools: retrieving certificate chains from TLS
//! endpoints or files, classifying and validating them, and discovering chains
//! across host ranges.
//!
//! # Example
//!
//! ```no_run
//! use std::path::PathBuf;
//!
//! use cert_status::app::{plugin_output, retrieve_chain, validate_chain};
//! use cert_status::config::{ChainSource, CheckCertConfig};
//! use cert_status::validation::{ValidationInputs, ValidationOptions};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = CheckCertConfig {
//!     source: ChainSource::File(PathBuf::from("chain.pem")),
//!     inputs: ValidationInputs {
//!         dns_name: "www.example.com".to_string(),
//!         age_warning: Some(30),
//!         age_critical: Some(15),
//!         ..Default::default()
//!     },
//!     options: ValidationOptions::default(),
//! };
//!
//! let chain = retrieve_chain(&config.source).await?;
//! let results = validate_chain(chain, &config);
//! print!("{}", plugin_output(&results).render());
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! Retrieval and discovery require a Tokio runtime, and a `rustls` crypto
//! provider installed with [`initialization::init_crypto_provider`].

pub mod app;
pub mod certs;
pub mod config;
pub mod discovery;
pub mod error_handling;
pub mod hosts;
pub mod initialization;
pub mod plugin;
pub mod tls;
pub mod validation;

// Re-export public API
pub use certs::{Certificate, ChainPosition};
pub use config::{LogFormat, LogLevel};
pub use discovery::{run_discovery, DiscoveryOptions, DiscoveryReport};
pub use plugin::{PluginOutput, ServiceState};
pub use validation::{run_validators, CertChainValidationResults};
