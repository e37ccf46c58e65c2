//! Command line options for each tool.
//!
//! Every option struct converts into its library configuration through
//! `validate()`, which enforces the rules clap cannot express on its own.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser};

use super::constants::{
    DEFAULT_AGE_CRITICAL_DAYS, DEFAULT_AGE_WARNING_DAYS, DEFAULT_APP_INACTIVITY_TIMEOUT_SECS,
    DEFAULT_HOST_RATE_LIMIT, DEFAULT_PORT, DEFAULT_PORT_SCAN_RATE_LIMIT,
    DEFAULT_PORT_SCAN_TIMEOUT_MS, DEFAULT_TIMEOUT_SECS,
};
use super::types::{
    CertSumConfig, CertTypeFilter, ChainSource, CheckCertConfig, CpCertConfig, LogFormat,
    LogLevel, LsCertConfig, ValidatorName,
};
use crate::discovery::DiscoveryOptions;
use crate::error_handling::ConfigError;
use crate::hosts::dedupe_hosts;
use crate::validation::{sans_check_requested, ValidationInputs, ValidationOptions};

/// Logging flags shared by the plugin tools.
#[derive(Debug, Clone, Args)]
pub struct LoggingOpt {
    /// Log level: error|warn|info|debug|trace
    #[arg(long, value_enum, default_value_t = LogLevel::Warn)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,
}

/// Where to read the certificate chain from.
#[derive(Debug, Clone, Args)]
pub struct ChainSourceOpt {
    /// Server FQDN or IP address to retrieve the certificate chain from
    #[arg(long, short = 's')]
    pub server: Option<String>,

    /// Name used for SNI and hostname verification instead of --server
    #[arg(long)]
    pub dns_name: Option<String>,

    /// TCP port of the TLS service
    #[arg(long, short = 'p', default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// PEM or DER file holding the certificate chain
    #[arg(long, short = 'f')]
    pub input_filename: Option<PathBuf>,

    /// Connect and handshake timeout in seconds
    #[arg(long, short = 't', default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl ChainSourceOpt {
    /// Checks that exactly one source was given.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if both or neither of `--server` and
    /// `--input-filename` are set, or if the port or timeout is zero.
    pub fn validate(&self) -> Result<ChainSource, ConfigError> {
        let server = non_empty(&self.server);
        match (server, &self.input_filename) {
            (Some(_), Some(_)) => Err(ConfigError::new(
                "server",
                "--server and --input-filename are mutually exclusive",
            )),
            (None, None) => Err(ConfigError::new(
                "server",
                "one of --server or --input-filename is required",
            )),
            (None, Some(path)) => Ok(ChainSource::File(path.clone())),
            (Some(server), None) => {
                if self.port == 0 {
                    return Err(ConfigError::new("port", "must be between 1 and 65535"));
                }
                if self.timeout == 0 {
                    return Err(ConfigError::new("timeout", "must be greater than zero"));
                }
                Ok(ChainSource::Server {
                    server,
                    dns_name: non_empty(&self.dns_name).unwrap_or_default(),
                    port: self.port,
                    timeout: Duration::from_secs(self.timeout),
                })
            }
        }
    }
}

/// Checks the expiration thresholds.
///
/// # Errors
///
/// Returns a `ConfigError` unless `0 < critical < warning`.
pub fn validate_ages(age_warning: u32, age_critical: u32) -> Result<(), ConfigError> {
    if age_warning == 0 {
        return Err(ConfigError::new("age-warning", "must be greater than zero"));
    }
    if age_critical == 0 {
        return Err(ConfigError::new("age-critical", "must be greater than zero"));
    }
    if age_critical >= age_warning {
        return Err(ConfigError::new(
            "age-critical",
            format!("{age_critical} must be less than age-warning {age_warning}"),
        ));
    }
    Ok(())
}

/// Validation flags shared by `check_cert` and `lscert`.
#[derive(Debug, Clone, Args)]
pub struct ValidationOpt {
    /// Comma separated SANs entries the leaf must list; SKIPSANSCHECKS disables the check
    #[arg(long, value_delimiter = ',')]
    pub sans_entries: Vec<String>,

    /// Days before expiration that trigger a WARNING
    #[arg(long, short = 'w', default_value_t = DEFAULT_AGE_WARNING_DAYS)]
    pub age_warning: u32,

    /// Days before expiration that trigger a CRITICAL
    #[arg(long, short = 'c', default_value_t = DEFAULT_AGE_CRITICAL_DAYS)]
    pub age_critical: u32,

    /// Include public key and lifespan details
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Replace SANs entries in reports with a placeholder
    #[arg(long)]
    pub omit_sans_entries: bool,

    /// Ignore hostname verification failures for leaves without SANs entries
    #[arg(long)]
    pub ignore_hostname_verification_if_empty_sans: bool,

    /// Validators whose result should be ignored (repeatable or comma separated)
    #[arg(long, value_enum, value_delimiter = ',')]
    pub ignore_validation_result: Vec<ValidatorName>,

    /// Ignore intermediate certificates that expire soon
    #[arg(long)]
    pub ignore_expiring_intermediate_certs: bool,

    /// Ignore root certificates that expire soon
    #[arg(long)]
    pub ignore_expiring_root_certs: bool,

    /// Ignore expired intermediate certificates
    #[arg(long)]
    pub ignore_expired_intermediate_certs: bool,

    /// Ignore expired root certificates
    #[arg(long)]
    pub ignore_expired_root_certs: bool,
}

impl ValidationOpt {
    fn ignores(&self, name: ValidatorName) -> bool {
        self.ignore_validation_result.contains(&name)
    }

    /// Builds validator inputs and options for a chain from `source`.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the thresholds are invalid or every validator
    /// would be ignored.
    pub fn validate(
        &self,
        source: &ChainSource,
        dns_name: Option<&str>,
    ) -> Result<(ValidationInputs, ValidationOptions), ConfigError> {
        validate_ages(self.age_warning, self.age_critical)?;

        let (server, dns_name) = match source {
            ChainSource::Server {
                server, dns_name, ..
            } => (server.clone(), dns_name.clone()),
            ChainSource::File(_) => (
                String::new(),
                dns_name.map(str::trim).unwrap_or_default().to_string(),
            ),
        };

        let inputs = ValidationInputs {
            server,
            dns_name,
            sans_entries: self
                .sans_entries
                .iter()
                .map(|entry| entry.trim().to_string())
                .filter(|entry| !entry.is_empty())
                .collect(),
            age_warning: Some(self.age_warning),
            age_critical: Some(self.age_critical),
        };

        let options = ValidationOptions {
            ignore_hostname_verification_if_empty_sans: self
                .ignore_hostname_verification_if_empty_sans,
            ignore_validation_result_expiration: self.ignores(ValidatorName::Expiration),
            ignore_validation_result_hostname: self.ignores(ValidatorName::Hostname),
            ignore_validation_result_sans: self.ignores(ValidatorName::Sans),
            ignore_validation_result_chain_order: self.ignores(ValidatorName::ChainOrder),
            ignore_validation_result_root: self.ignores(ValidatorName::Root),
            ignore_expiring_intermediate_certificates: self.ignore_expiring_intermediate_certs,
            ignore_expiring_root_certificates: self.ignore_expiring_root_certs,
            ignore_expired_intermediate_certificates: self.ignore_expired_intermediate_certs,
            ignore_expired_root_certificates: self.ignore_expired_root_certs,
            omit_sans_entries: self.omit_sans_entries,
            verbose: self.verbose,
        };

        let applied = [
            !options.ignore_validation_result_expiration,
            inputs.hostname_check_requested() && !options.ignore_validation_result_hostname,
            sans_check_requested(&inputs.sans_entries) && !options.ignore_validation_result_sans,
            !options.ignore_validation_result_chain_order,
            !options.ignore_validation_result_root,
        ];
        if !applied.contains(&true) {
            return Err(ConfigError::new(
                "ignore-validation-result",
                "every validator is ignored or not applicable; nothing to check",
            ));
        }

        Ok((inputs, options))
    }
}

/// Nagios plugin that validates the certificate chain of a TLS service or file.
#[derive(Debug, Clone, Parser)]
#[command(name = "check_cert", version, about)]
pub struct CheckCertOpt {
    #[command(flatten)]
    pub source: ChainSourceOpt,

    #[command(flatten)]
    pub validation: ValidationOpt,

    #[command(flatten)]
    pub logging: LoggingOpt,
}

impl CheckCertOpt {
    /// Converts the options into a [`CheckCertConfig`].
    ///
    /// # Errors
    ///
    /// Returns the first `ConfigError` found.
    pub fn validate(&self) -> Result<CheckCertConfig, ConfigError> {
        let source = self.source.validate()?;
        let (inputs, options) = self
            .validation
            .validate(&source, self.source.dns_name.as_deref())?;
        Ok(CheckCertConfig {
            source,
            inputs,
            options,
        })
    }
}

/// Lists the certificates of a chain with their validation status.
#[derive(Debug, Clone, Parser)]
#[command(name = "lscert", version, about)]
pub struct LsCertOpt {
    #[command(flatten)]
    pub source: ChainSourceOpt,

    #[command(flatten)]
    pub validation: ValidationOpt,

    /// Print an OpenSSL-like text dump of every certificate
    #[arg(long)]
    pub emit_cert_text: bool,

    /// Print only the validation overview
    #[arg(long)]
    pub show_overview: bool,

    #[command(flatten)]
    pub logging: LoggingOpt,
}

impl LsCertOpt {
    /// Converts the options into an [`LsCertConfig`].
    ///
    /// # Errors
    ///
    /// Returns the first `ConfigError` found.
    pub fn validate(&self) -> Result<LsCertConfig, ConfigError> {
        let source = self.source.validate()?;
        let (inputs, options) = self
            .validation
            .validate(&source, self.source.dns_name.as_deref())?;
        Ok(LsCertConfig {
            check: CheckCertConfig {
                source,
                inputs,
                options,
            },
            emit_cert_text: self.emit_cert_text,
            show_overview: self.show_overview,
        })
    }
}

/// Discovers TLS services across hosts and summarizes their certificate chains.
#[derive(Debug, Clone, Parser)]
#[command(name = "certsum", version, about)]
pub struct CertSumOpt {
    /// Comma separated hosts: names, IP addresses, CIDR blocks or dash ranges
    #[arg(long, value_delimiter = ',', required = true)]
    pub hosts: Vec<String>,

    /// Comma separated ports to check on every host
    #[arg(long, value_delimiter = ',', default_value = "443")]
    pub cert_ports: Vec<u16>,

    /// Port checks in flight across all hosts
    #[arg(long, default_value_t = DEFAULT_PORT_SCAN_RATE_LIMIT)]
    pub port_scan_rate_limit: usize,

    /// Hosts scanned in parallel
    #[arg(long, default_value_t = DEFAULT_HOST_RATE_LIMIT)]
    pub host_rate_limit: usize,

    /// Port scan dial timeout in milliseconds
    #[arg(long, default_value_t = DEFAULT_PORT_SCAN_TIMEOUT_MS)]
    pub timeout_port_scan: u64,

    /// Certificate retrieval timeout in seconds
    #[arg(long, short = 't', default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,

    /// Cancel discovery when no progress is made for this many seconds
    #[arg(long, default_value_t = DEFAULT_APP_INACTIVITY_TIMEOUT_SECS)]
    pub timeout_app_inactivity: u64,

    /// Days before expiration that trigger a WARNING
    #[arg(long, short = 'w', default_value_t = DEFAULT_AGE_WARNING_DAYS)]
    pub age_warning: u32,

    /// Days before expiration that trigger a CRITICAL
    #[arg(long, short = 'c', default_value_t = DEFAULT_AGE_CRITICAL_DAYS)]
    pub age_critical: u32,

    /// List hosts where no checked port was open
    #[arg(long)]
    pub show_hosts_with_closed_ports: bool,

    /// Include chains without problems
    #[arg(long)]
    pub show_hosts_with_valid_certs: bool,

    /// Print every port check result
    #[arg(long)]
    pub show_port_scan_results: bool,

    /// Print a one line per chain overview table instead of details
    #[arg(long)]
    pub show_overview: bool,

    /// Replace SANs entries with a placeholder
    #[arg(long)]
    pub omit_sans_entries: bool,

    /// Log level: error|warn|info|debug|trace
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,
}

impl CertSumOpt {
    /// Converts the options into a [`CertSumConfig`].
    ///
    /// # Errors
    ///
    /// Returns the first `ConfigError` found.
    pub fn validate(&self) -> Result<CertSumConfig, ConfigError> {
        let hosts = dedupe_hosts(&self.hosts);
        if hosts.is_empty() {
            return Err(ConfigError::new("hosts", "at least one host is required"));
        }
        if self.cert_ports.is_empty() {
            return Err(ConfigError::new("cert-ports", "at least one port is required"));
        }
        if self.cert_ports.contains(&0) {
            return Err(ConfigError::new("cert-ports", "ports must be between 1 and 65535"));
        }
        if self.port_scan_rate_limit == 0 {
            return Err(ConfigError::new("port-scan-rate-limit", "must be greater than zero"));
        }
        if self.host_rate_limit == 0 {
            return Err(ConfigError::new("host-rate-limit", "must be greater than zero"));
        }
        if self.timeout_port_scan == 0 {
            return Err(ConfigError::new("timeout-port-scan", "must be greater than zero"));
        }
        if self.timeout == 0 {
            return Err(ConfigError::new("timeout", "must be greater than zero"));
        }
        if self.timeout_app_inactivity == 0 {
            return Err(ConfigError::new(
                "timeout-app-inactivity",
                "must be greater than zero",
            ));
        }
        validate_ages(self.age_warning, self.age_critical)?;

        let mut ports = self.cert_ports.clone();
        ports.sort_unstable();
        ports.dedup();

        Ok(CertSumConfig {
            hosts,
            discovery: DiscoveryOptions {
                ports,
                host_rate_limit: self.host_rate_limit,
                port_rate_limit: self.port_scan_rate_limit,
                cert_rate_limit: self.port_scan_rate_limit,
                port_timeout: Duration::from_millis(self.timeout_port_scan),
                cert_timeout: Duration::from_secs(self.timeout),
                inactivity_timeout: Duration::from_secs(self.timeout_app_inactivity),
            },
            age_warning: self.age_warning,
            age_critical: self.age_critical,
            show_hosts_with_closed_ports: self.show_hosts_with_closed_ports,
            show_hosts_with_valid_certs: self.show_hosts_with_valid_certs,
            show_port_scan_results: self.show_port_scan_results,
            show_overview: self.show_overview,
            omit_sans_entries: self.omit_sans_entries,
        })
    }
}

/// Copies the certificates of a chain into a PEM file.
#[derive(Debug, Clone, Parser)]
#[command(name = "cpcert", version, about)]
pub struct CpCertOpt {
    #[command(flatten)]
    pub source: ChainSourceOpt,

    /// File the selected certificates are written to
    #[arg(long, short = 'o')]
    pub output_filename: Option<PathBuf>,

    /// Certificate types to keep (repeatable or comma separated)
    #[arg(long, value_enum, value_delimiter = ',', default_value = "all")]
    pub cert_types_to_keep: Vec<CertTypeFilter>,

    #[command(flatten)]
    pub logging: LoggingOpt,
}

impl CpCertOpt {
    /// Converts the options into a [`CpCertConfig`].
    ///
    /// # Errors
    ///
    /// Returns the first `ConfigError` found.
    pub fn validate(&self) -> Result<CpCertConfig, ConfigError> {
        let source = self.source.validate()?;
        let output = match &self.output_filename {
            Some(path) if !path.as_os_str().is_empty() => path.clone(),
            _ => {
                return Err(ConfigError::new(
                    "output-filename",
                    "an output file is required",
                ))
            }
        };
        if let ChainSource::File(input) = &source {
            if input == &output {
                return Err(ConfigError::new(
                    "output-filename",
                    "must differ from --input-filename",
                ));
            }
        }

        let keep = if self.cert_types_to_keep.is_empty() {
            vec![CertTypeFilter::All]
        } else {
            self.cert_types_to_keep.clone()
        };

        Ok(CpCertConfig {
            source,
            output,
            keep,
        })
    }
}
