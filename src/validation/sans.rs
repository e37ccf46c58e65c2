//! SANs list validator.

use std::fmt::Write;

use super::details::SANS_OMITTED;
use super::options::ValidationOptions;
use super::result::{
    CertChain, PriorityModifier, ResultCore, ValidationResult, BASELINE_PRIORITY_SANS,
    CHECK_NAME_SANS,
};
use crate::error_handling::ValidationError;
use crate::plugin::ServiceState;

/// Keyword that disables SANs validation when given as the only entry.
pub const SKIP_SANS_CHECKS_KEYWORD: &str = "SKIPSANSCHECKS";

/// Result of the SANs list validator.
#[derive(Debug, Clone)]
pub struct SansValidationResult {
    core: ResultCore,
    required: Vec<String>,
    missing: Vec<String>,
    unexpected: Vec<String>,
    applied: bool,
    omit_sans_entries: bool,
}

impl SansValidationResult {
    /// Required entries missing from the leaf.
    pub fn missing(&self) -> &[String] {
        &self.missing
    }

    /// Leaf entries that were not required.
    pub fn unexpected(&self) -> &[String] {
        &self.unexpected
    }

    fn mismatch_summary(&self) -> String {
        format!(
            "missing: [{}], unexpected: [{}]",
            self.missing.join(", "),
            self.unexpected.join(", ")
        )
    }
}

impl ValidationResult for SansValidationResult {
    fn core(&self) -> &ResultCore {
        &self.core
    }

    fn state(&self) -> ServiceState {
        if self.core.err.is_some() && !self.core.ignored {
            ServiceState::Critical
        } else {
            ServiceState::Ok
        }
    }

    fn status(&self) -> String {
        if !self.applied {
            return format!("{CHECK_NAME_SANS} validation not applied");
        }
        let outcome = self.core.outcome();
        match self.core.err {
            Some(err) => format!("{CHECK_NAME_SANS} validation {outcome}: {err}"),
            None => format!(
                "{CHECK_NAME_SANS} validation {outcome}: {} entries matched",
                self.required.len()
            ),
        }
    }

    fn overview(&self) -> String {
        format!(
            "[MISSING: {}, UNEXPECTED: {}]",
            self.missing.len(),
            self.unexpected.len()
        )
    }

    fn report(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.status());
        if let Some(err) = self.core.error_text() {
            let _ = writeln!(out, "\tError: {err}");
        }
        if !self.applied {
            return out;
        }
        if self.omit_sans_entries {
            let _ = writeln!(out, "\tRequested SANs entries: {SANS_OMITTED}");
        } else {
            let _ = writeln!(out, "\tRequested SANs entries: [{}]", self.required.join(", "));
        }
        out
    }
}

/// Lower-cases, trims and dedupes entries, keeping first-seen order.
fn normalize(entries: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(entries.len());
    for entry in entries {
        let entry = entry.trim().to_lowercase();
        if !entry.is_empty() && !out.contains(&entry) {
            out.push(entry);
        }
    }
    out
}

/// Validates the leaf certificate's SANs entries against the required list.
///
/// Comparison is case-insensitive.
///
/// # Arguments
///
/// * `chain` - Certificates in presented order; only the first is checked
/// * `required` - Entries the leaf must list, and nothing else
/// * `should_apply` - Whether the check was requested; if not the result is ignored
/// * `options` - Ignore flags and report options
pub fn validate_sans(
    chain: CertChain,
    required: &[String],
    should_apply: bool,
    options: &ValidationOptions,
) -> SansValidationResult {
    let required = normalize(required);
    let mut core = ResultCore::new(
        CHECK_NAME_SANS,
        BASELINE_PRIORITY_SANS,
        chain,
        !should_apply || options.ignore_validation_result_sans,
    );
    let mut missing = Vec::new();
    let mut unexpected = Vec::new();

    if should_apply {
        let chain = core.chain.clone();
        match chain.first() {
            None => {
                core.fail(ValidationError::MissingValue, PriorityModifier::Maximum);
                core.with_detail("no certs found");
            }
            Some(_) if required.is_empty() => {
                core.fail(ValidationError::MissingValue, PriorityModifier::Maximum);
                core.with_detail("no SANs entries requested");
            }
            Some(leaf) => {
                let present = normalize(leaf.dns_names());
                missing = required
                    .iter()
                    .filter(|entry| !present.contains(entry))
                    .cloned()
                    .collect();
                unexpected = present
                    .iter()
                    .filter(|entry| !required.contains(entry))
                    .cloned()
                    .collect();

                match (missing.is_empty(), unexpected.is_empty()) {
                    (false, false) => core.fail(
                        ValidationError::MissingAndUnexpectedSans,
                        PriorityModifier::Maximum,
                    ),
                    (false, true) => {
                        core.fail(ValidationError::MissingSans, PriorityModifier::Maximum)
                    }
                    (true, false) => {
                        core.fail(ValidationError::UnexpectedSans, PriorityModifier::Minimum)
                    }
                    (true, true) => {}
                }
            }
        }
    }

    let mut result = SansValidationResult {
        core,
        required,
        missing,
        unexpected,
        applied: should_apply,
        omit_sans_entries: options.omit_sans_entries,
    };
    if !result.missing.is_empty() || !result.unexpected.is_empty() {
        let summary = result.mismatch_summary();
        result.core.with_detail(summary);
    }
    result
}
