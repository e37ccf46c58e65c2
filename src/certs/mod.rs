//! Certificate chain model and chain level queries.
//!
//! This module covers everything that works on an already retrieved chain:
//! - Parsing PEM or DER input into owned [`Certificate`] values
//! - Signature verification, including legacy algorithms
//! - Chain position classification and self-signed detection
//! - Counts, filters and expiration queries
//! - Chain order detection and recommended ordering
//! - Formatting of serials, dates and expiration status, plus a text dump

mod classify;
mod format;
mod model;
mod order;
mod parse;
mod query;
mod signature;
mod text;

#[cfg(test)]
pub(crate) mod test_helpers;

// Re-export public API
pub use classify::{classify, classify_chain, is_self_signed, ChainPosition};
pub use format::{
    expiration_status, format_cert_serial, format_date, formatted_expiration, CERT_DATE_FORMAT,
};
pub use model::{Certificate, KeyUsage, PublicKeyInfo, PublicKeyKind, SignatureAlgorithm};
pub use order::{has_misordered_certs, order_cert_chain};
pub use parse::{parse_cert_file, parse_pem_or_der};
pub use query::{
    expires_in_days, has_expired_certs, has_expiring_certs, has_intermediate_certs,
    has_leaf_cert, has_root_certs, has_weak_signature_algorithm, intermediate_certs, is_expired,
    is_expiring, leaf_certs, life_remaining_percentage, life_remaining_percentage_truncated,
    max_lifespan_in_days, next_to_expire, non_root_certs, num_expired_certs,
    num_expiring_certs, num_intermediate_certs, num_leaf_certs, num_root_certs,
    num_unknown_certs, oldest_intermediate_cert, oldest_leaf_cert, oldest_root_cert, root_certs,
    Thresholds,
};
pub use signature::verify_signature;
pub use text::cert_text;
