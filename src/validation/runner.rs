//! Runs every validator over one chain.

use log::debug;

use super::chain_order::validate_chain_order;
use super::expiration::validate_expiration;
use super::hostname::validate_hostname;
use super::options::ValidationOptions;
use super::result::CertChain;
use super::results::CertChainValidationResults;
use super::root::validate_root;
use super::sans::{validate_sans, SKIP_SANS_CHECKS_KEYWORD};

/// Validator specific inputs.
#[derive(Debug, Clone, Default)]
pub struct ValidationInputs {
    /// Server name or IP the chain was retrieved from; empty for file input.
    pub server: String,
    /// Name overriding `server` for hostname verification.
    pub dns_name: String,
    /// Required SANs entries; empty or the skip keyword disables the SANs check.
    pub sans_entries: Vec<String>,
    pub age_warning: Option<u32>,
    pub age_critical: Option<u32>,
}

impl ValidationInputs {
    /// Hostname verification needs a server or DNS name value.
    pub fn hostname_check_requested(&self) -> bool {
        !self.server.trim().is_empty() || !self.dns_name.trim().is_empty()
    }

    pub fn sans_check_requested(&self) -> bool {
        sans_check_requested(&self.sans_entries)
    }
}

/// Whether SANs entries were given and are not just the skip keyword.
pub fn sans_check_requested(entries: &[String]) -> bool {
    match entries {
        [] => false,
        [only] => !only.trim().eq_ignore_ascii_case(SKIP_SANS_CHECKS_KEYWORD),
        _ => true,
    }
}

/// Runs all five validators and returns the sorted results.
///
/// Validators that were not requested are still recorded, flagged as ignored, so
/// reports list every check.
pub fn run_validators(
    chain: CertChain,
    inputs: &ValidationInputs,
    options: &ValidationOptions,
) -> CertChainValidationResults {
    let mut results = CertChainValidationResults::new();

    results.add(Box::new(validate_expiration(
        chain.clone(),
        inputs.age_warning,
        inputs.age_critical,
        options,
    )));
    results.add(Box::new(validate_hostname(
        chain.clone(),
        &inputs.server,
        &inputs.dns_name,
        inputs.hostname_check_requested(),
        options,
    )));
    results.add(Box::new(validate_sans(
        chain.clone(),
        &inputs.sans_entries,
        inputs.sans_check_requested(),
        options,
    )));
    results.add(Box::new(validate_chain_order(chain.clone(), options)));
    results.add(Box::new(validate_root(chain, options)));

    results.sort();
    debug!(
        "Validation complete: {} failed, {} ignored, {} succeeded",
        results.num_failed(),
        results.num_ignored(),
        results.num_succeeded()
    );
    results
}
