//! `check_cert` monitoring plugin (CLI binary).
//!
//! This is a thin wrapper around the `cert_status` library that handles:
//! - Command-line argument parsing
//! - Logger initialization
//! - Plugin output and exit code
//!
//! All core functionality is implemented in the library crate.

use anyhow::{Context, Result};
use clap::Parser;
use log::debug;

use cert_status::app::{
    config_error_output, failure_output, plugin_output, retrieve_chain, validate_chain,
};
use cert_status::config::CheckCertOpt;
use cert_status::initialization::{init_crypto_provider, init_logger_with};

#[tokio::main]
async fn main() -> Result<()> {
    let opt = CheckCertOpt::parse();

    init_logger_with(opt.logging.log_level.into(), opt.logging.log_format)
        .context("Failed to initialize logger")?;
    init_crypto_provider();

    let config = match opt.validate() {
        Ok(config) => config,
        Err(e) => config_error_output(&e).exit(),
    };

    let source = config.source.describe();
    let chain = match retrieve_chain(&config.source).await {
        Ok(chain) => chain,
        Err(e) => failure_output(&source, &e).exit(),
    };
    debug!("Validating {} cert(s) from {source}", chain.len());

    let results = validate_chain(chain, &config);
    plugin_output(&results).exit()
}
