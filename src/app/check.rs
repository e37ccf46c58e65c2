//! `check_cert` plugin output.

use std::sync::Arc;

use crate::certs::Certificate;
use crate::config::CheckCertConfig;
use crate::error_handling::{ConfigError, RetrievalError};
use crate::plugin::{PluginOutput, ServiceState};
use crate::validation::{run_validators, CertChainValidationResults};

use super::retrieve::retrieval_failure_state;

/// Runs every validator over `chain` with the configured inputs and flags.
pub fn validate_chain(chain: Vec<Certificate>, config: &CheckCertConfig) -> CertChainValidationResults {
    run_validators(Arc::from(chain), &config.inputs, &config.options)
}

/// Plugin output for a validated chain.
///
/// The first line is the one-line summary; the full report follows as long output.
pub fn plugin_output(results: &CertChainValidationResults) -> PluginOutput {
    let mut output = PluginOutput::new();
    output.set_state(results.state());
    output.set_service_output(results.one_line_summary());
    output.set_long_service_output(results.report());
    output
}

/// Plugin output for a chain that could not be read or retrieved.
///
/// # Arguments
///
/// * `source` - Description of the file or server the chain was expected from
/// * `err` - The retrieval failure
pub fn failure_output(source: &str, err: &RetrievalError) -> PluginOutput {
    let state = retrieval_failure_state(err);
    let action = match err {
        RetrievalError::File(_) => "failed to read certificates from",
        RetrievalError::Resolve(_) => "failed to resolve",
        RetrievalError::Fetch(_) => "failed to retrieve certificates from",
    };

    let mut output = PluginOutput::new();
    output.set_state(state);
    output.set_service_output(format!("{}: {action} {source}", state.label()));
    output.add_error(err);
    output
}

/// Plugin output for invalid command line options.
pub fn config_error_output(err: &ConfigError) -> PluginOutput {
    let mut output = PluginOutput::new();
    output.set_state(ServiceState::Unknown);
    output.set_service_output(format!(
        "{}: invalid configuration: {err}",
        ServiceState::Unknown.label()
    ));
    output.add_error(err);
    output
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::certs::test_helpers;
    use crate::config::ChainSource;
    use crate::error_handling::{CertError, FetchError};
    use crate::validation::{ValidationInputs, ValidationOptions};

    fn config(server: &str) -> CheckCertConfig {
        CheckCertConfig {
            source: ChainSource::File(PathBuf::from("chain.pem")),
            inputs: ValidationInputs {
                server: server.to_string(),
                age_warning: Some(30),
                age_critical: Some(15),
                ..Default::default()
            },
            options: ValidationOptions::default(),
        }
    }

    #[test]
    fn test_healthy_chain_is_ok() {
        // Without the root, which would add a root presence warning.
        let chain = test_helpers::chain(&["a.test"], 400, 1000, 2000)[..2].to_vec();
        let results = validate_chain(chain, &config("a.test"));
        let output = plugin_output(&results);

        assert_eq!(output.state(), ServiceState::Ok);
        let rendered = output.render();
        assert!(rendered.starts_with("OK: Expiration validation successful"));
        assert!(rendered.contains("**DETAILED INFO**"));
        assert!(rendered.contains("PROBLEM RESULTS:\n\n* None"));
    }

    #[test]
    fn test_hostname_mismatch_is_critical() {
        let chain = test_helpers::chain(&["a.test"], 400, 1000, 2000)[..2].to_vec();
        let results = validate_chain(chain, &config("b.test"));
        let output = plugin_output(&results);
        assert_eq!(output.state(), ServiceState::Critical);
        assert!(output.render().starts_with("CRITICAL: Hostname validation using value \"b.test\" failed"));
    }

    #[test]
    fn test_failure_output_states() {
        let output = failure_output("chain.pem", &RetrievalError::File(CertError::EmptyCertFile));
        assert_eq!(output.state(), ServiceState::Unknown);
        assert!(output
            .render()
            .starts_with("UNKNOWN: failed to read certificates from chain.pem"));

        let err = RetrievalError::Fetch(FetchError::NoPeerCerts("a.test:443".to_string()));
        let output = failure_output("a.test:443", &err);
        assert_eq!(output.state(), ServiceState::Critical);
        assert!(output.render().contains("**ERRORS**"));
    }

    #[test]
    fn test_config_error_output() {
        let output = config_error_output(&ConfigError::new("port", "must be greater than 0"));
        assert_eq!(output.state(), ServiceState::Unknown);
        assert!(output
            .render()
            .starts_with("UNKNOWN: invalid configuration: invalid port: must be greater than 0"));
    }
}
