//! Root presence validator.
//!
//! Served chains should stop at the last intermediate; clients already hold the root.

use std::fmt::Write;

use super::options::ValidationOptions;
use super::result::{
    CertChain, PriorityModifier, ResultCore, ValidationResult, BASELINE_PRIORITY_ROOT,
    CHECK_NAME_ROOT,
};
use crate::certs::{num_root_certs, root_certs};
use crate::error_handling::ValidationError;
use crate::plugin::ServiceState;

/// Result of the root presence validator.
#[derive(Debug, Clone)]
pub struct RootValidationResult {
    core: ResultCore,
    num_roots: usize,
}

impl RootValidationResult {
    pub fn num_roots(&self) -> usize {
        self.num_roots
    }
}

impl ValidationResult for RootValidationResult {
    fn core(&self) -> &ResultCore {
        &self.core
    }

    fn state(&self) -> ServiceState {
        if self.core.ignored {
            return ServiceState::Ok;
        }
        match self.core.err {
            None => ServiceState::Ok,
            Some(ValidationError::RootCertsFound) => ServiceState::Warning,
            Some(_) => ServiceState::Critical,
        }
    }

    fn status(&self) -> String {
        let outcome = self.core.outcome();
        match self.core.err {
            Some(err) => format!("{CHECK_NAME_ROOT} validation {outcome}: {err}"),
            None => format!("{CHECK_NAME_ROOT} validation {outcome}: no root certs in chain"),
        }
    }

    fn overview(&self) -> String {
        format!("[ROOT: {}]", self.num_roots)
    }

    fn report(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.status());
        if let Some(err) = self.core.error_text() {
            let _ = writeln!(out, "\tError: {err}");
        }
        if self.num_roots > 0 {
            for root in root_certs(&self.core.chain) {
                let _ = writeln!(out, "\tRoot: {}", root.subject());
            }
            let _ = writeln!(
                out,
                "\tRemove the root cert(s) from the served chain; clients use their own trust store"
            );
        }
        out
    }
}

/// Validates that the chain does not include a root certificate.
pub fn validate_root(chain: CertChain, options: &ValidationOptions) -> RootValidationResult {
    let mut core = ResultCore::new(
        CHECK_NAME_ROOT,
        BASELINE_PRIORITY_ROOT,
        chain,
        options.ignore_validation_result_root,
    );

    let num_roots = num_root_certs(&core.chain);
    if core.chain.is_empty() {
        core.fail(ValidationError::NoCertsFound, PriorityModifier::Maximum);
    } else if num_roots > 0 {
        core.fail(ValidationError::RootCertsFound, PriorityModifier::Medium);
    }

    RootValidationResult { core, num_roots }
}
