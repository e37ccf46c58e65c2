//! Expiration validator.

use std::fmt::Write;

use log::debug;

use super::details::chain_details;
use super::options::ValidationOptions;
use super::result::{
    indent, CertChain, PriorityModifier, ResultCore, ValidationResult,
    BASELINE_PRIORITY_EXPIRATION, CHECK_NAME_EXPIRATION,
};
use crate::certs::{
    classify, format_date, formatted_expiration, is_expired, is_expiring, next_to_expire,
    num_expired_certs, num_expiring_certs, Certificate, ChainPosition, Thresholds,
};
use crate::error_handling::ValidationError;
use crate::plugin::ServiceState;

/// Result of the expiration validator.
#[derive(Debug, Clone)]
pub struct ExpirationValidationResult {
    core: ResultCore,
    thresholds: Option<Thresholds>,
    filtered_chain: Vec<Certificate>,
    options: ValidationOptions,
}

impl ExpirationValidationResult {
    /// Chain actually evaluated after the ignore flags were applied.
    pub fn filtered_chain(&self) -> &[Certificate] {
        &self.filtered_chain
    }

    pub fn thresholds(&self) -> Option<&Thresholds> {
        self.thresholds.as_ref()
    }

    /// Any evaluated certificate expires before the critical threshold.
    pub fn is_critical(&self) -> bool {
        match &self.thresholds {
            Some(t) => self
                .filtered_chain
                .iter()
                .any(|cert| cert.not_after() < t.critical),
            None => false,
        }
    }

    /// Not critical, and any evaluated certificate expires before the warning threshold.
    pub fn is_warning(&self) -> bool {
        match &self.thresholds {
            Some(t) => {
                !self.is_critical()
                    && self
                        .filtered_chain
                        .iter()
                        .any(|cert| cert.not_after() < t.warning)
            }
            None => false,
        }
    }

    pub fn num_expired(&self) -> usize {
        num_expired_certs(&self.core.chain)
    }

    pub fn num_expiring(&self) -> usize {
        self.thresholds
            .as_ref()
            .map_or(0, |t| num_expiring_certs(&self.core.chain, t))
    }

    pub fn num_valid(&self) -> usize {
        self.core
            .chain
            .len()
            .saturating_sub(self.num_expired() + self.num_expiring())
    }

    /// The certificate that drives the status line.
    fn status_cert(&self) -> Option<&Certificate> {
        next_to_expire(&self.filtered_chain, false)
            .or_else(|| next_to_expire(&self.core.chain, false))
    }
}

impl ValidationResult for ExpirationValidationResult {
    fn core(&self) -> &ResultCore {
        &self.core
    }

    fn state(&self) -> ServiceState {
        if self.core.ignored {
            return ServiceState::Ok;
        }
        match self.core.err {
            Some(ValidationError::MissingValue | ValidationError::NoCertsFound) => {
                ServiceState::Critical
            }
            _ if self.is_critical() => ServiceState::Critical,
            _ if self.is_warning() => ServiceState::Warning,
            _ => ServiceState::Ok,
        }
    }

    fn status(&self) -> String {
        let outcome = self.core.outcome();
        match (self.core.err, self.status_cert()) {
            (Some(err @ (ValidationError::MissingValue | ValidationError::NoCertsFound)), _)
            | (Some(err), None) => {
                format!("{CHECK_NAME_EXPIRATION} validation {outcome}: {err}")
            }
            (_, None) => format!("{CHECK_NAME_EXPIRATION} validation {outcome}: no certs found"),
            (_, Some(cert)) => {
                let role = classify(cert, &self.core.chain);
                let name = cert.display_name();
                let not_after = cert.not_after();
                if is_expired(cert) {
                    format!(
                        "{CHECK_NAME_EXPIRATION} validation {outcome}: {role} cert \"{name}\" expired {} (on {})",
                        formatted_expiration(not_after),
                        format_date(not_after)
                    )
                } else {
                    format!(
                        "{CHECK_NAME_EXPIRATION} validation {outcome}: {role} cert \"{name}\" expires next with {} (until {})",
                        formatted_expiration(not_after),
                        format_date(not_after)
                    )
                }
            }
        }
    }

    fn overview(&self) -> String {
        format!(
            "[EXPIRED: {}, EXPIRING: {}, OK: {}]",
            self.num_expired(),
            self.num_expiring(),
            self.num_valid()
        )
    }

    fn report(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.status());
        if let Some(err) = self.core.error_text() {
            let _ = writeln!(out, "\tError: {err}");
        }
        if let Some(t) = &self.thresholds {
            let _ = writeln!(
                out,
                "\tThresholds: WARNING before {}, CRITICAL before {}",
                format_date(t.warning),
                format_date(t.critical)
            );
        }
        let _ = writeln!(out, "\tOverview: {}", self.overview());
        if let Some(t) = &self.thresholds {
            if !self.core.chain.is_empty() {
                out.push('\n');
                out.push_str(&indent(&chain_details(&self.core.chain, t, &self.options)));
                out.push('\n');
            }
        }
        out
    }
}

fn is_problem(cert: &Certificate, thresholds: &Thresholds) -> bool {
    is_expired(cert) || is_expiring(cert, thresholds)
}

/// Builds the chain the validator evaluates.
///
/// If any leaf is expired or expiring, the result is that leaf alone (the first to
/// expire when there are several). Otherwise expired or expiring intermediates and
/// roots are dropped when their ignore flag is set.
fn filter_chain(
    chain: &[Certificate],
    thresholds: &Thresholds,
    options: &ValidationOptions,
) -> Vec<Certificate> {
    let problem_leaves: Vec<Certificate> = chain
        .iter()
        .filter(|cert| classify(cert, chain).is_leaf() && is_problem(cert, thresholds))
        .cloned()
        .collect();
    if let Some(leaf) = next_to_expire(&problem_leaves, false) {
        return vec![leaf.clone()];
    }

    chain
        .iter()
        .filter(|cert| {
            let (ignore_expired, ignore_expiring) = match classify(cert, chain) {
                ChainPosition::Intermediate => (
                    options.ignore_expired_intermediate_certificates,
                    options.ignore_expiring_intermediate_certificates,
                ),
                ChainPosition::Root => (
                    options.ignore_expired_root_certificates,
                    options.ignore_expiring_root_certificates,
                ),
                _ => (false, false),
            };
            let drop = (ignore_expired && is_expired(cert))
                || (ignore_expiring && is_expiring(cert, thresholds));
            !drop
        })
        .cloned()
        .collect()
}

/// Validates the expiration of every certificate in the chain.
///
/// # Arguments
///
/// * `chain` - Certificates in presented order
/// * `age_warning` - Days before expiration that trigger WARNING
/// * `age_critical` - Days before expiration that trigger CRITICAL
/// * `options` - Ignore flags and report options
pub fn validate_expiration(
    chain: CertChain,
    age_warning: Option<u32>,
    age_critical: Option<u32>,
    options: &ValidationOptions,
) -> ExpirationValidationResult {
    let mut core = ResultCore::new(
        CHECK_NAME_EXPIRATION,
        BASELINE_PRIORITY_EXPIRATION,
        chain,
        options.ignore_validation_result_expiration,
    );
    let options = *options;

    if core.chain.is_empty() {
        core.fail(ValidationError::NoCertsFound, PriorityModifier::Maximum);
        return ExpirationValidationResult {
            core,
            thresholds: None,
            filtered_chain: Vec::new(),
            options,
        };
    }

    let (Some(warn_days), Some(crit_days)) = (age_warning, age_critical) else {
        core.fail(ValidationError::MissingValue, PriorityModifier::Maximum);
        core.with_detail("expiration thresholds not provided");
        return ExpirationValidationResult {
            core,
            thresholds: None,
            filtered_chain: Vec::new(),
            options,
        };
    };

    let thresholds = Thresholds::from_days(warn_days, crit_days);
    let filtered = filter_chain(&core.chain, &thresholds, &options);
    debug!(
        "Expiration: evaluating {} of {} cert(s)",
        filtered.len(),
        core.chain.len()
    );

    if filtered.iter().any(is_expired) {
        core.fail(ValidationError::ExpiredCerts, PriorityModifier::Maximum);
    } else if filtered.iter().any(|c| is_expiring(c, &thresholds)) {
        core.fail(ValidationError::ExpiringCerts, PriorityModifier::Minimum);
    } else if core.chain.iter().any(is_expired) {
        // Only certificates dropped by an ignore flag have a problem.
        core.fail(ValidationError::ExpiredCerts, PriorityModifier::Baseline);
        core.ignored = true;
    } else if core.chain.iter().any(|c| is_expiring(c, &thresholds)) {
        core.fail(ValidationError::ExpiringCerts, PriorityModifier::Baseline);
        core.ignored = true;
    }

    ExpirationValidationResult {
        core,
        thresholds: Some(thresholds),
        filtered_chain: filtered,
        options,
    }
}
