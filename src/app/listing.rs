//! `lscert` chain listing.

use std::fmt::Write;

use crate::certs::{cert_text, Certificate, Thresholds};
use crate::config::LsCertConfig;
use crate::validation::{chain_details, CertChainValidationResults};

/// Renders the `lscert` report for an already validated chain.
///
/// # Arguments
///
/// * `chain` - Certificates in presented order
/// * `results` - Validation results for the same chain
/// * `config` - Listing configuration
///
/// # Returns
///
/// A header naming the source, the validation status and overview, then either
/// the per-certificate listing or, with `show_overview`, nothing further.
pub fn chain_listing(
    chain: &[Certificate],
    results: &CertChainValidationResults,
    config: &LsCertConfig,
) -> String {
    let mut out = String::new();
    let check = &config.check;

    let _ = writeln!(out, "Certificate chain for {}", check.source.describe());
    let _ = writeln!(out, "({} certificate(s) found)\n", chain.len());
    let _ = writeln!(out, "Status: {}", results.status());
    let _ = writeln!(out, "Overview: {}", results.overview());

    if config.show_overview {
        return out;
    }

    let thresholds = Thresholds::from_days(
        check.inputs.age_warning.unwrap_or_default(),
        check.inputs.age_critical.unwrap_or_default(),
    );
    out.push('\n');
    out.push_str(&chain_details(chain, &thresholds, &check.options));

    if config.emit_cert_text {
        for (idx, cert) in chain.iter().enumerate() {
            let _ = writeln!(out, "\n===== Certificate {} of {} =====\n", idx + 1, chain.len());
            out.push_str(&cert_text(cert));
        }
    }

    out
}
