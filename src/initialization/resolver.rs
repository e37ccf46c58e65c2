//! DNS resolver initialization.

use std::sync::Arc;
use std::time::Duration;

use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::TokioAsyncResolver;

use crate::error_handling::InitializationError;

/// Initializes the DNS resolver used for server and host pattern lookups.
///
/// Prefers the system configuration (`/etc/resolv.conf` and hosts file) so that
/// internal names resolve the way they do for other tools on the host, and falls
/// back to the default public resolvers when no system configuration exists.
/// Both use a short timeout so unresponsive servers fail fast.
///
/// # Returns
///
/// A resolver wrapped in `Arc` for sharing across tasks.
///
/// # Errors
///
/// Returns `InitializationError::DnsResolverError` if the resolver cannot be built.
pub fn init_resolver() -> Result<Arc<TokioAsyncResolver>, InitializationError> {
    let (config, mut opts) = match hickory_resolver::system_conf::read_system_conf() {
        Ok((config, opts)) => (config, opts),
        Err(e) => {
            log::debug!("No system resolver configuration ({e}), using defaults");
            (ResolverConfig::default(), ResolverOpts::default())
        }
    };
    opts.timeout = Duration::from_secs(crate::config::DNS_TIMEOUT_SECS);
    opts.attempts = 2;

    if config.name_servers().is_empty() {
        return Err(InitializationError::DnsResolverError(
            "no name servers configured".to_string(),
        ));
    }

    Ok(Arc::new(TokioAsyncResolver::tokio(config, opts)))
}
