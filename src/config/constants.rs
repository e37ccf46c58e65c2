//! Configuration constants.
//!
//! Defaults shared by the command line tools and the library.

/// TCP port checked when none is given.
pub const DEFAULT_PORT: u16 = 443;

// Expiration thresholds
/// Days before expiration that trigger a WARNING.
pub const DEFAULT_AGE_WARNING_DAYS: u32 = 30;
/// Days before expiration that trigger a CRITICAL.
pub const DEFAULT_AGE_CRITICAL_DAYS: u32 = 15;

// Network operation timeouts
/// TCP connect and TLS handshake timeout in seconds, applied separately.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
/// Port scan dial timeout in milliseconds
pub const DEFAULT_PORT_SCAN_TIMEOUT_MS: u64 = 200;
/// DNS query timeout in seconds
pub const DNS_TIMEOUT_SECS: u64 = 3;
/// Discovery is cancelled when no port result arrives for this many seconds.
pub const DEFAULT_APP_INACTIVITY_TIMEOUT_SECS: u64 = 30;

// Discovery concurrency
/// Port checks in flight across all hosts; also the default cert retrieval limit.
pub const DEFAULT_PORT_SCAN_RATE_LIMIT: usize = 100;
/// Hosts scanned in parallel.
pub const DEFAULT_HOST_RATE_LIMIT: usize = 10;
/// Upper bound on the addresses a single CIDR or dash range may expand to.
pub const MAX_HOST_EXPANSION: usize = 65536;

/// Seconds between discovery progress log lines.
pub const LOGGING_INTERVAL_SECS: u64 = 5;
