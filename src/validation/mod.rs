//! Certificate chain validation.
//!
//! Five independent validators share one result contract ([`ValidationResult`]):
//! - Expiration (with per-role ignore flags)
//! - Hostname (SANs only, no Common Name fallback)
//! - SANs list conformance
//! - Chain order
//! - Root presence
//!
//! Results are collected in [`CertChainValidationResults`], which ranks them by
//! priority and derives the overall monitoring state and report.

mod chain_order;
mod details;
mod expiration;
mod hostname;
mod options;
mod result;
mod results;
mod root;
mod runner;
mod sans;

// Re-export public API
pub use chain_order::{validate_chain_order, ChainOrderValidationResult};
pub use details::{chain_details, sans_entries_label, signature_algorithm_label, SANS_OMITTED};
pub use expiration::{validate_expiration, ExpirationValidationResult};
pub use hostname::{
    matches_dns_name, validate_hostname, HostnameValidationResult, IGNORE_EMPTY_SANS_FLAG,
};
pub use options::ValidationOptions;
pub use result::{
    CertChain, PriorityModifier, ResultCore, ValidationResult, CHECK_NAME_CHAIN_ORDER,
    CHECK_NAME_EXPIRATION, CHECK_NAME_HOSTNAME, CHECK_NAME_ROOT, CHECK_NAME_SANS,
};
pub use results::CertChainValidationResults;
pub use root::{validate_root, RootValidationResult};
pub use runner::{run_validators, sans_check_requested, ValidationInputs};
pub use sans::{validate_sans, SansValidationResult, SKIP_SANS_CHECKS_KEYWORD};
