//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (ports, thresholds, timeouts, limits)
//! - CLI option types and parsing for every tool
//! - Validated library configurations

mod constants;
mod options;
mod types;

// Re-export all constants
pub use constants::*;
pub use options::{
    validate_ages, CertSumOpt, ChainSourceOpt, CheckCertOpt, CpCertOpt, LoggingOpt, LsCertOpt,
    ValidationOpt,
};
pub use types::{
    CertSumConfig, CertTypeFilter, ChainSource, CheckCertConfig, CpCertConfig, LogFormat,
    LogLevel, LsCertConfig, ValidatorName,
};

#[cfg(test)]
mod tests;
