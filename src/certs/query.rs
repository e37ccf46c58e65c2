//! Stateless queries over certificate chains.

use chrono::{DateTime, Duration, Utc};

use super::classify::{classify, ChainPosition};
use super::model::Certificate;

/// Expiration thresholds as absolute instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    /// Certificates expiring before this instant are in WARNING.
    pub warning: DateTime<Utc>,
    /// Certificates expiring before this instant are in CRITICAL.
    pub critical: DateTime<Utc>,
}

impl Thresholds {
    /// Thresholds `warn_days` and `crit_days` from now.
    pub fn from_days(warn_days: u32, crit_days: u32) -> Self {
        let now = Utc::now();
        Self {
            warning: now + Duration::days(i64::from(warn_days)),
            critical: now + Duration::days(i64::from(crit_days)),
        }
    }
}

/// Returns the certificate that expires first.
///
/// With `exclude_expired`, the first certificate that has not yet expired is
/// returned instead, falling back to the earliest-expired one when every
/// certificate has expired. Returns `None` for an empty chain.
pub fn next_to_expire(chain: &[Certificate], exclude_expired: bool) -> Option<&Certificate> {
    let mut sorted: Vec<&Certificate> = chain.iter().collect();
    sorted.sort_by_key(|cert| cert.not_after());

    if exclude_expired {
        if let Some(cert) = sorted.iter().find(|cert| !is_expired(cert)) {
            return Some(cert);
        }
    }
    sorted.first().copied()
}

pub fn is_expired(cert: &Certificate) -> bool {
    Utc::now() > cert.not_after()
}

/// Not yet expired, but expiring before either threshold.
pub fn is_expiring(cert: &Certificate, thresholds: &Thresholds) -> bool {
    !is_expired(cert)
        && (cert.not_after() < thresholds.critical || cert.not_after() < thresholds.warning)
}

fn count_position(chain: &[Certificate], matches: impl Fn(ChainPosition) -> bool) -> usize {
    chain
        .iter()
        .filter(|cert| matches(classify(cert, chain)))
        .count()
}

fn filter_position(
    chain: &[Certificate],
    matches: impl Fn(ChainPosition) -> bool,
) -> Vec<Certificate> {
    chain
        .iter()
        .filter(|cert| matches(classify(cert, chain)))
        .cloned()
        .collect()
}

pub fn num_expired_certs(chain: &[Certificate]) -> usize {
    chain.iter().filter(|cert| is_expired(cert)).count()
}

pub fn num_expiring_certs(chain: &[Certificate], thresholds: &Thresholds) -> usize {
    chain
        .iter()
        .filter(|cert| is_expiring(cert, thresholds))
        .count()
}

pub fn num_leaf_certs(chain: &[Certificate]) -> usize {
    count_position(chain, ChainPosition::is_leaf)
}

pub fn num_intermediate_certs(chain: &[Certificate]) -> usize {
    count_position(chain, |pos| pos == ChainPosition::Intermediate)
}

pub fn num_root_certs(chain: &[Certificate]) -> usize {
    count_position(chain, |pos| pos == ChainPosition::Root)
}

pub fn num_unknown_certs(chain: &[Certificate]) -> usize {
    count_position(chain, |pos| pos == ChainPosition::Unknown)
}

pub fn has_leaf_cert(chain: &[Certificate]) -> bool {
    num_leaf_certs(chain) > 0
}

pub fn has_intermediate_certs(chain: &[Certificate]) -> bool {
    num_intermediate_certs(chain) > 0
}

pub fn has_root_certs(chain: &[Certificate]) -> bool {
    num_root_certs(chain) > 0
}

pub fn has_expired_certs(chain: &[Certificate]) -> bool {
    num_expired_certs(chain) > 0
}

pub fn has_expiring_certs(chain: &[Certificate], thresholds: &Thresholds) -> bool {
    num_expiring_certs(chain, thresholds) > 0
}

/// Leaf certificates, self-signed or not, in chain order.
pub fn leaf_certs(chain: &[Certificate]) -> Vec<Certificate> {
    filter_position(chain, ChainPosition::is_leaf)
}

pub fn intermediate_certs(chain: &[Certificate]) -> Vec<Certificate> {
    filter_position(chain, |pos| pos == ChainPosition::Intermediate)
}

pub fn root_certs(chain: &[Certificate]) -> Vec<Certificate> {
    filter_position(chain, |pos| pos == ChainPosition::Root)
}

/// Every certificate that is not classified as a root.
pub fn non_root_certs(chain: &[Certificate]) -> Vec<Certificate> {
    filter_position(chain, |pos| pos != ChainPosition::Root)
}

/// The leaf certificate that expires first.
pub fn oldest_leaf_cert(chain: &[Certificate]) -> Option<Certificate> {
    next_to_expire(&leaf_certs(chain), false).cloned()
}

/// The intermediate certificate that expires first.
pub fn oldest_intermediate_cert(chain: &[Certificate]) -> Option<Certificate> {
    next_to_expire(&intermediate_certs(chain), false).cloned()
}

/// The root certificate that expires first.
pub fn oldest_root_cert(chain: &[Certificate]) -> Option<Certificate> {
    next_to_expire(&root_certs(chain), false).cloned()
}

/// Whole days until expiration, truncated. Negative once expired.
pub fn expires_in_days(cert: &Certificate) -> i64 {
    (cert.not_after() - Utc::now()).num_days()
}

/// Whole days between NotBefore and NotAfter, truncated.
pub fn max_lifespan_in_days(cert: &Certificate) -> i64 {
    (cert.not_after() - cert.not_before()).num_days()
}

/// Percentage of the validity period still remaining; 0.0 once expired.
pub fn life_remaining_percentage(cert: &Certificate) -> f64 {
    if is_expired(cert) {
        return 0.0;
    }
    let total = (cert.not_after() - cert.not_before()).num_seconds();
    if total <= 0 {
        return 0.0;
    }
    let remaining = (cert.not_after() - Utc::now()).num_seconds();
    (remaining as f64 / total as f64 * 100.0).clamp(0.0, 100.0)
}

pub fn life_remaining_percentage_truncated(cert: &Certificate) -> i64 {
    life_remaining_percentage(cert).trunc() as i64
}

/// Whether `cert` uses a weak signature algorithm.
///
/// Roots are only evaluated when `eval_root` is set; their signatures are not relied
/// upon by clients.
pub fn has_weak_signature_algorithm(
    cert: &Certificate,
    chain: &[Certificate],
    eval_root: bool,
) -> bool {
    if !eval_root && classify(cert, chain) == ChainPosition::Root {
        return false;
    }
    cert.signature_algorithm().is_weak()
}
