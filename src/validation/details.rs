//! Per-certificate detail blocks used in reports and by `lscert`.

use std::fmt::Write;

use super::options::ValidationOptions;
use crate::certs::{
    classify, expiration_status, format_cert_serial, format_date, has_weak_signature_algorithm,
    max_lifespan_in_days, Certificate, ChainPosition, Thresholds,
};

/// Placeholder printed instead of SANs entries when they are omitted.
pub const SANS_OMITTED: &str = "Omitted by request";

/// Signature algorithm with its weakness tag.
///
/// Roots are tagged `[IGNORED]` since clients never check a root's own signature;
/// weak roots get `[WEAK, IGNORED]` and weak non-roots `[WEAK]`.
pub fn signature_algorithm_label(cert: &Certificate, chain: &[Certificate]) -> String {
    let tag = if has_weak_signature_algorithm(cert, chain, false) {
        "[WEAK] "
    } else if classify(cert, chain) != ChainPosition::Root {
        ""
    } else if has_weak_signature_algorithm(cert, chain, true) {
        "[WEAK, IGNORED] "
    } else {
        "[IGNORED] "
    };
    format!("{tag}{}", cert.signature_algorithm())
}

/// SANs entries line content: the placeholder, or the count and list.
pub fn sans_entries_label(cert: &Certificate, omit: bool) -> String {
    let count = cert.dns_names().len();
    if omit {
        format!("{SANS_OMITTED} ({count} entries)")
    } else {
        format!("({count} entries) [{}]", cert.dns_names().join(", "))
    }
}

/// Renders the detail block for every certificate in the chain.
///
/// # Arguments
///
/// * `chain` - Certificates in presented order
/// * `thresholds` - Expiration thresholds for the status line
/// * `options` - Controls SANs omission, verbosity and which expired certs are ignored
pub fn chain_details(
    chain: &[Certificate],
    thresholds: &Thresholds,
    options: &ValidationOptions,
) -> String {
    let mut out = String::new();
    let total = chain.len();

    for (idx, cert) in chain.iter().enumerate() {
        let position = classify(cert, chain);
        let ignore_expired = match position {
            ChainPosition::Intermediate => options.ignore_expired_intermediate_certificates,
            ChainPosition::Root => options.ignore_expired_root_certificates,
            _ => false,
        };

        if idx > 0 {
            out.push('\n');
        }
        let _ = writeln!(out, "Certificate {} of {total} ({position}):", idx + 1);
        let _ = writeln!(out, "\tName: {}", cert.subject());
        let _ = writeln!(
            out,
            "\tSANs entries: {}",
            sans_entries_label(cert, options.omit_sans_entries)
        );
        let _ = writeln!(out, "\tIssuer: {}", cert.issuer());
        let _ = writeln!(out, "\tSerial: {}", format_cert_serial(cert.serial()));
        let _ = writeln!(out, "\tIssued On: {}", format_date(cert.not_before()));
        let _ = writeln!(out, "\tExpiration: {}", format_date(cert.not_after()));
        let _ = writeln!(
            out,
            "\tSignature Algorithm: {}",
            signature_algorithm_label(cert, chain)
        );
        if options.verbose {
            let _ = writeln!(out, "\tPublic Key: {}", cert.public_key().kind);
            let _ = writeln!(out, "\tLifespan: {} days", max_lifespan_in_days(cert));
        }
        let _ = writeln!(
            out,
            "\tStatus: {}",
            expiration_status(cert, thresholds, ignore_expired)
        );
    }

    out
}
