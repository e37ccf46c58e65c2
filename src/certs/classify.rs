//! Chain position classification.

use std::fmt;

use super::model::Certificate;
use super::signature::verify_signature;

/// Position of a certificate within a chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChainPosition {
    Leaf,
    LeafSelfSigned,
    Intermediate,
    Root,
    Unknown,
}

impl ChainPosition {
    /// Whether this position is either leaf variant.
    pub fn is_leaf(self) -> bool {
        matches!(self, ChainPosition::Leaf | ChainPosition::LeafSelfSigned)
    }
}

impl fmt::Display for ChainPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ChainPosition::Leaf => "leaf",
            ChainPosition::LeafSelfSigned => "leaf; self-signed",
            ChainPosition::Intermediate => "intermediate",
            ChainPosition::Root => "root",
            ChainPosition::Unknown => "UNKNOWN",
        };
        f.write_str(label)
    }
}

/// Returns whether the certificate is self-signed.
///
/// Subject and issuer must match and the certificate's signature must verify
/// against its own public key.
pub fn is_self_signed(cert: &Certificate) -> bool {
    cert.subject() == cert.issuer() && verify_signature(cert, cert).is_ok()
}

/// Classifies `cert` by its position in `chain`.
///
/// Version 1 and 2 certificates carry no extensions, so their position in the chain
/// decides. Version 3 certificates are classified from basic constraints, extended
/// key usage and key usage. An empty chain yields [`ChainPosition::Unknown`].
pub fn classify(cert: &Certificate, chain: &[Certificate]) -> ChainPosition {
    if chain.is_empty() {
        return ChainPosition::Unknown;
    }

    let self_signed = is_self_signed(cert);

    if cert.version() < 3 {
        let is_first = chain.first().is_some_and(|first| first == cert);
        return match (self_signed, is_first) {
            (true, true) => ChainPosition::LeafSelfSigned,
            (true, false) => ChainPosition::Root,
            (false, true) => ChainPosition::Leaf,
            (false, false) => ChainPosition::Intermediate,
        };
    }

    if cert.is_ca() {
        return if self_signed {
            ChainPosition::Root
        } else {
            ChainPosition::Intermediate
        };
    }

    if cert.ext_key_usage().is_some() {
        return if self_signed {
            ChainPosition::LeafSelfSigned
        } else {
            ChainPosition::Leaf
        };
    }

    let cert_sign = cert.key_usage().is_some_and(|ku| ku.cert_sign());
    match (cert_sign, self_signed) {
        (true, true) => ChainPosition::Root,
        (true, false) => ChainPosition::Intermediate,
        (false, true) => ChainPosition::LeafSelfSigned,
        (false, false) => ChainPosition::Leaf,
    }
}

/// Classifies every certificate of the chain, in chain order.
pub fn classify_chain(chain: &[Certificate]) -> Vec<ChainPosition> {
    chain.iter().map(|cert| classify(cert, chain)).collect()
}
