//! `cpcert` chain filtering and PEM output.

use std::io::Write;
use std::path::Path;

use log::debug;

use crate::certs::{classify, Certificate};
use crate::config::CpCertConfig;

/// Keeps the certificates whose chain position matches the configured filters.
///
/// Positions are classified against the full chain, so filtering never changes
/// what a certificate is considered to be.
pub fn select_certs(chain: &[Certificate], config: &CpCertConfig) -> Vec<Certificate> {
    chain
        .iter()
        .filter(|cert| {
            let position = classify(cert, chain);
            let keep = config.keeps(position);
            debug!("{} ({position}): {}", cert.display_name(), if keep { "kept" } else { "dropped" });
            keep
        })
        .cloned()
        .collect()
}

/// Writes `certs` PEM encoded to `path`, replacing any existing file.
///
/// # Errors
///
/// Returns an I/O error if the file cannot be created or written.
pub fn write_pem_file(path: impl AsRef<Path>, certs: &[Certificate]) -> std::io::Result<()> {
    let mut file = std::fs::File::create(path.as_ref())?;
    for cert in certs {
        file.write_all(cert.to_pem().as_bytes())?;
    }
    file.flush()
}
