//! `lscert` chain lister (CLI binary).
//!
//! Lists the certificates of a chain retrieved from a server or read from a file,
//! with the validation status on top. Exits with the aggregate state's code.

use anyhow::{Context, Result};
use clap::Parser;

use cert_status::app::{
    chain_listing, config_error_output, failure_output, retrieve_chain, validate_chain,
};
use cert_status::config::LsCertOpt;
use cert_status::initialization::{init_crypto_provider, init_logger_with};

#[tokio::main]
async fn main() -> Result<()> {
    let opt = LsCertOpt::parse();

    init_logger_with(opt.logging.log_level.into(), opt.logging.log_format)
        .context("Failed to initialize logger")?;
    init_crypto_provider();

    let config = match opt.validate() {
        Ok(config) => config,
        Err(e) => config_error_output(&e).exit(),
    };

    let chain = match retrieve_chain(&config.check.source).await {
        Ok(chain) => chain,
        Err(e) => failure_output(&config.check.source.describe(), &e).exit(),
    };

    let results = validate_chain(chain.clone(), &config.check);
    print!("{}", chain_listing(&chain, &results, &config));
    std::process::exit(results.state().exit_code());
}
