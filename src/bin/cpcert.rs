//! `cpcert` chain copy tool (CLI binary).
//!
//! Reads a chain from a server or file, keeps the requested certificate types
//! and writes them PEM encoded to the output file.

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::info;

use cert_status::app::{config_error_output, retrieve_chain, select_certs, write_pem_file};
use cert_status::config::CpCertOpt;
use cert_status::initialization::{init_crypto_provider, init_logger_with};

#[tokio::main]
async fn main() -> Result<()> {
    let opt = CpCertOpt::parse();

    init_logger_with(opt.logging.log_level.into(), opt.logging.log_format)
        .context("Failed to initialize logger")?;
    init_crypto_provider();

    let config = match opt.validate() {
        Ok(config) => config,
        Err(e) => config_error_output(&e).exit(),
    };

    let source = config.source.describe();
    let chain = retrieve_chain(&config.source)
        .await
        .with_context(|| format!("Failed to retrieve certificates from {source}"))?;

    let selected = select_certs(&chain, &config);
    if selected.is_empty() {
        bail!(
            "None of the {} certificate(s) from {source} matched the requested types",
            chain.len()
        );
    }

    write_pem_file(&config.output, &selected)
        .with_context(|| format!("Failed to write {}", config.output.display()))?;
    info!(
        "Wrote {} of {} certificate(s) from {source} to {}",
        selected.len(),
        chain.len(),
        config.output.display()
    );
    println!(
        "Copied {} certificate(s) to {}",
        selected.len(),
        config.output.display()
    );
    Ok(())
}
