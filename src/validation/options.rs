//! Validation options.

/// Flags that tune how validators evaluate a chain.
///
/// All flags default to `false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationOptions {
    /// Ignore hostname verification failures when the leaf has no SANs entries.
    pub ignore_hostname_verification_if_empty_sans: bool,
    /// Ignore the expiration result when computing the overall state.
    pub ignore_validation_result_expiration: bool,
    /// Ignore the hostname result when computing the overall state.
    pub ignore_validation_result_hostname: bool,
    /// Ignore the SANs list result when computing the overall state.
    pub ignore_validation_result_sans: bool,
    /// Ignore the chain order result when computing the overall state.
    pub ignore_validation_result_chain_order: bool,
    /// Ignore the root presence result when computing the overall state.
    pub ignore_validation_result_root: bool,
    pub ignore_expiring_intermediate_certificates: bool,
    pub ignore_expiring_root_certificates: bool,
    pub ignore_expired_intermediate_certificates: bool,
    pub ignore_expired_root_certificates: bool,
    /// Replace SANs entries in reports with a placeholder.
    pub omit_sans_entries: bool,
    /// Add extra per-certificate detail to reports.
    pub verbose: bool,
}
