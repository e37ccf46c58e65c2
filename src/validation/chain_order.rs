//! Chain order validator.

use std::fmt::Write;

use super::options::ValidationOptions;
use super::result::{
    CertChain, PriorityModifier, ResultCore, ValidationResult, BASELINE_PRIORITY_CHAIN_ORDER,
    CHECK_NAME_CHAIN_ORDER,
};
use crate::certs::{classify, has_misordered_certs, order_cert_chain, Certificate};
use crate::error_handling::ValidationError;
use crate::plugin::ServiceState;

/// Result of the chain order validator.
#[derive(Debug, Clone)]
pub struct ChainOrderValidationResult {
    core: ResultCore,
    recommended: Vec<Certificate>,
}

impl ChainOrderValidationResult {
    /// Chain reordered leaf first; equal to the input when it is already ordered.
    pub fn recommended_order(&self) -> &[Certificate] {
        &self.recommended
    }

    /// One line per certificate, `N. name (position)`, in the given order.
    pub fn order_summary(chain: &[Certificate]) -> Vec<String> {
        chain
            .iter()
            .enumerate()
            .map(|(idx, cert)| {
                format!(
                    "{}. {} ({})",
                    idx + 1,
                    cert.display_name(),
                    classify(cert, chain)
                )
            })
            .collect()
    }
}

impl ValidationResult for ChainOrderValidationResult {
    fn core(&self) -> &ResultCore {
        &self.core
    }

    fn state(&self) -> ServiceState {
        if self.core.ignored {
            return ServiceState::Ok;
        }
        match self.core.err {
            None => ServiceState::Ok,
            Some(ValidationError::MisorderedChain) => ServiceState::Warning,
            Some(_) => ServiceState::Critical,
        }
    }

    fn status(&self) -> String {
        let outcome = self.core.outcome();
        match self.core.err {
            Some(err) => format!("{CHECK_NAME_CHAIN_ORDER} validation {outcome}: {err}"),
            None => format!(
                "{CHECK_NAME_CHAIN_ORDER} validation {outcome}: {} cert(s) in expected order",
                self.core.chain.len()
            ),
        }
    }

    fn overview(&self) -> String {
        format!("[CERTS: {}]", self.core.chain.len())
    }

    fn report(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.status());
        if let Some(err) = self.core.error_text() {
            let _ = writeln!(out, "\tError: {err}");
        }
        if self.core.err == Some(ValidationError::MisorderedChain) {
            let _ = writeln!(out, "\tCurrent order:");
            for line in Self::order_summary(&self.core.chain) {
                let _ = writeln!(out, "\t\t{line}");
            }
            let _ = writeln!(out, "\tRecommended order:");
            for line in Self::order_summary(&self.recommended) {
                let _ = writeln!(out, "\t\t{line}");
            }
        }
        out
    }
}

/// Validates that the chain is ordered leaf first, each cert followed by its issuer.
pub fn validate_chain_order(
    chain: CertChain,
    options: &ValidationOptions,
) -> ChainOrderValidationResult {
    let mut core = ResultCore::new(
        CHECK_NAME_CHAIN_ORDER,
        BASELINE_PRIORITY_CHAIN_ORDER,
        chain,
        options.ignore_validation_result_chain_order,
    );
    let recommended = order_cert_chain(&core.chain);

    match core.chain.len() {
        0 => core.fail(ValidationError::NoCertsFound, PriorityModifier::Maximum),
        1 => {
            core.fail(ValidationError::IncompleteChain, PriorityModifier::Medium);
            core.with_detail("only one cert presented, intermediates missing");
        }
        _ if has_misordered_certs(&core.chain) => {
            core.fail(ValidationError::MisorderedChain, PriorityModifier::Medium);
        }
        _ => {}
    }

    ChainOrderValidationResult { core, recommended }
}
