//! OpenSSL-like text dump of a certificate.

use std::fmt::Write;

use super::format::{format_cert_serial, format_date};
use super::model::Certificate;

fn hex_colon_upper(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(":")
}

/// Renders a multi-line description of the certificate.
pub fn cert_text(cert: &Certificate) -> String {
    let mut out = String::new();

    // Writing to a String cannot fail.
    let _ = writeln!(out, "Certificate:");
    let _ = writeln!(out, "  Version: {} (0x{:x})", cert.version(), cert.version().saturating_sub(1));
    let _ = writeln!(out, "  Serial Number: {}", format_cert_serial(cert.serial()));
    let _ = writeln!(
        out,
        "  Signature Algorithm: {} ({})",
        cert.signature_algorithm(),
        cert.signature_algorithm_oid()
    );
    let _ = writeln!(out, "  Issuer: {}", cert.issuer());
    let _ = writeln!(out, "  Validity:");
    let _ = writeln!(out, "    Not Before: {}", format_date(cert.not_before()));
    let _ = writeln!(out, "    Not After:  {}", format_date(cert.not_after()));
    let _ = writeln!(out, "  Subject: {}", cert.subject());
    let _ = writeln!(out, "  Subject Public Key Info:");
    let _ = writeln!(out, "    Public Key Algorithm: {}", cert.public_key().kind);

    let _ = writeln!(out, "  X509v3 extensions:");
    let _ = writeln!(
        out,
        "    Basic Constraints: CA:{}{}",
        if cert.is_ca() { "TRUE" } else { "FALSE" },
        cert.path_len_constraint()
            .map(|n| format!(", pathlen:{n}"))
            .unwrap_or_default()
    );
    if let Some(ku) = cert.key_usage() {
        let _ = writeln!(out, "    Key Usage: {}", ku.names().join(", "));
    }
    if let Some(eku) = cert.ext_key_usage() {
        let _ = writeln!(out, "    Extended Key Usage: {}", eku.join(", "));
    }

    let mut sans: Vec<String> = cert.dns_names().iter().map(|n| format!("DNS:{n}")).collect();
    sans.extend(cert.ip_addresses().iter().map(|ip| format!("IP Address:{ip}")));
    if !sans.is_empty() {
        let _ = writeln!(out, "    Subject Alternative Name: {}", sans.join(", "));
    }
    if let Some(skid) = cert.subject_key_id() {
        let _ = writeln!(out, "    Subject Key Identifier: {}", hex_colon_upper(skid));
    }
    if let Some(akid) = cert.authority_key_id() {
        let _ = writeln!(out, "    Authority Key Identifier: {}", hex_colon_upper(akid));
    }

    out
}
