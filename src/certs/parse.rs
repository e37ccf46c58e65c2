//! Certificate chain parsing from PEM or DER input.

use std::path::Path;

use log::debug;
use x509_parser::error::PEMError;
use x509_parser::nom;
use x509_parser::pem::parse_x509_pem;

use super::model::Certificate;
use crate::error_handling::CertError;

const PEM_BEGIN: &str = "-----BEGIN ";
const CERTIFICATE_LABEL: &str = "CERTIFICATE";

/// Reads a certificate chain from a file containing PEM or DER data.
///
/// # Arguments
///
/// * `path` - File to read
///
/// # Returns
///
/// The parsed chain in file order plus any trailing bytes that were not decoded.
///
/// # Errors
///
/// Returns a `CertError` if the file cannot be read or does not contain a usable chain.
pub fn parse_cert_file(path: impl AsRef<Path>) -> Result<(Vec<Certificate>, Vec<u8>), CertError> {
    let path = path.as_ref();
    debug!("Reading certificates from {}", path.display());
    let data = std::fs::read(path)?;
    parse_pem_or_der(&data)
}

/// Parses a certificate chain from raw bytes.
///
/// PEM input is decoded block by block after blank lines are stripped; leading
/// non-PEM data is skipped. A block with any label other than `CERTIFICATE` (CSR,
/// CRL, keys, PKCS#7, PGP) is rejected. Input without PEM markers is parsed as one
/// or more concatenated DER certificates.
///
/// # Errors
///
/// * `CertError::EmptyCertFile` - input is empty or whitespace
/// * `CertError::EmptyCertBlock` - a `BEGIN CERTIFICATE` block has no content
/// * `CertError::UnsupportedFileFormat` - a non-certificate PEM block was found
/// * `CertError::MalformedCertificate` - a PEM block is incomplete, or certificate
///   bytes failed to parse
/// * `CertError::NoCertsFound` - nothing was decoded
pub fn parse_pem_or_der(data: &[u8]) -> Result<(Vec<Certificate>, Vec<u8>), CertError> {
    if data.iter().all(u8::is_ascii_whitespace) {
        return Err(CertError::EmptyCertFile);
    }

    let text = String::from_utf8_lossy(data);
    if text.contains(PEM_BEGIN) {
        return parse_pem(&normalize_lines(&text));
    }

    parse_der(data)
}

/// Drops blank lines and surrounding whitespace so every PEM marker starts a line.
fn normalize_lines(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        out.push_str(line);
        out.push('\n');
    }
    out
}

fn parse_pem(text: &str) -> Result<(Vec<Certificate>, Vec<u8>), CertError> {
    let mut certs = Vec::new();
    let mut rest = text.as_bytes();

    loop {
        let (remaining, block) = match parse_x509_pem(rest) {
            Ok(parsed) => parsed,
            Err(nom::Err::Error(PEMError::MissingHeader)) => break,
            Err(nom::Err::Error(e) | nom::Err::Failure(e)) => {
                return Err(CertError::MalformedCertificate(format!(
                    "invalid PEM block: {e}"
                )))
            }
            Err(nom::Err::Incomplete(_)) => {
                return Err(CertError::MalformedCertificate(
                    "incomplete PEM block".to_string(),
                ))
            }
        };
        if block.label != CERTIFICATE_LABEL {
            return Err(CertError::UnsupportedFileFormat(block.label));
        }
        if block.contents.is_empty() {
            return Err(CertError::EmptyCertBlock);
        }
        certs.push(Certificate::from_der(&block.contents)?);
        rest = remaining;
    }

    if certs.is_empty() {
        return Err(CertError::NoCertsFound);
    }

    debug!("Decoded {} certificate(s) from PEM input", certs.len());
    Ok((certs, rest.to_vec()))
}

fn parse_der(data: &[u8]) -> Result<(Vec<Certificate>, Vec<u8>), CertError> {
    let mut certs = Vec::new();
    let mut rest = data;

    while !rest.is_empty() {
        let (remaining, _) = x509_parser::parse_x509_certificate(rest)
            .map_err(|e| CertError::MalformedCertificate(e.to_string()))?;
        let consumed = rest.len() - remaining.len();
        certs.push(Certificate::from_der(&rest[..consumed])?);
        rest = remaining;
    }

    if certs.is_empty() {
        return Err(CertError::NoCertsFound);
    }

    debug!("Decoded {} certificate(s) from DER input", certs.len());
    Ok((certs, Vec::new()))
}
