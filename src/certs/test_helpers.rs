//! Shared test helpers for building certificate chains.
//!
//! Certificates are generated at test time with validity windows relative to now so
//! expiry based assertions never go stale.

use rcgen::{
    BasicConstraints, CertificateParams, DistinguishedName, DnType, ExtendedKeyUsagePurpose,
    IsCa, KeyPair, KeyUsagePurpose,
};
use time::{Duration, OffsetDateTime};

use super::model::Certificate;

/// A generated CA that can sign further certificates.
pub struct TestIssuer {
    pub cert: Certificate,
    rc: rcgen::Certificate,
    key: KeyPair,
}

fn params(cn: &str, sans: &[&str], not_after_days: i64) -> CertificateParams {
    let mut params = CertificateParams::new(sans.iter().map(|s| s.to_string()).collect::<Vec<_>>())
        .expect("valid SANs");
    let mut dn = DistinguishedName::new();
    dn.push(DnType::CommonName, cn);
    params.distinguished_name = dn;
    let now = OffsetDateTime::now_utc();
    params.not_before = now - Duration::days(365);
    params.not_after = now + Duration::days(not_after_days);
    params
}

fn ca_params(cn: &str, not_after_days: i64) -> CertificateParams {
    let mut params = params(cn, &[], not_after_days);
    params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
    params.key_usages = vec![KeyUsagePurpose::KeyCertSign, KeyUsagePurpose::CrlSign];
    params
}

fn leaf_params(cn: &str, sans: &[&str], not_after_days: i64) -> CertificateParams {
    let mut params = params(cn, sans, not_after_days);
    params.key_usages = vec![KeyUsagePurpose::DigitalSignature];
    params.extended_key_usages = vec![ExtendedKeyUsagePurpose::ServerAuth];
    params
}

fn to_model(rc: &rcgen::Certificate) -> Certificate {
    Certificate::from_der(rc.der()).expect("generated certificate parses")
}

/// Self-signed root expiring `not_after_days` from now.
pub fn root(cn: &str, not_after_days: i64) -> TestIssuer {
    let key = KeyPair::generate().expect("key generation");
    let rc = ca_params(cn, not_after_days)
        .self_signed(&key)
        .expect("self-signed root");
    TestIssuer {
        cert: to_model(&rc),
        rc,
        key,
    }
}

/// Intermediate CA signed by `issuer`.
pub fn intermediate(cn: &str, issuer: &TestIssuer, not_after_days: i64) -> TestIssuer {
    let key = KeyPair::generate().expect("key generation");
    let rc = ca_params(cn, not_after_days)
        .signed_by(&key, &issuer.rc, &issuer.key)
        .expect("signed intermediate");
    TestIssuer {
        cert: to_model(&rc),
        rc,
        key,
    }
}

/// Leaf with the given SANs signed by `issuer`.
pub fn leaf(cn: &str, sans: &[&str], issuer: &TestIssuer, not_after_days: i64) -> Certificate {
    let key = KeyPair::generate().expect("key generation");
    let rc = leaf_params(cn, sans, not_after_days)
        .signed_by(&key, &issuer.rc, &issuer.key)
        .expect("signed leaf");
    to_model(&rc)
}

/// Self-signed leaf with server auth extended key usage.
pub fn self_signed_leaf(cn: &str, sans: &[&str], not_after_days: i64) -> Certificate {
    let key = KeyPair::generate().expect("key generation");
    let rc = leaf_params(cn, sans, not_after_days)
        .self_signed(&key)
        .expect("self-signed leaf");
    to_model(&rc)
}

/// Leaf, intermediate and root, in served order.
pub fn chain(
    sans: &[&str],
    leaf_days: i64,
    intermediate_days: i64,
    root_days: i64,
) -> Vec<Certificate> {
    let root = root("Test Root CA", root_days);
    let intermediate = intermediate("Test Intermediate CA", &root, intermediate_days);
    let leaf_cn = sans.first().copied().unwrap_or("leaf.test");
    let leaf = leaf(leaf_cn, sans, &intermediate, leaf_days);
    vec![leaf, intermediate.cert, root.cert]
}

/// Certificate with `CA:FALSE`, no extended key usage and the given key usages,
/// self-signed or signed by `issuer`.
pub fn non_ca(
    cn: &str,
    key_usages: Vec<KeyUsagePurpose>,
    issuer: Option<&TestIssuer>,
    not_after_days: i64,
) -> Certificate {
    let mut params = params(cn, &[], not_after_days);
    params.is_ca = IsCa::ExplicitNoCa;
    params.key_usages = key_usages;
    let key = KeyPair::generate().expect("key generation");
    let rc = match issuer {
        Some(issuer) => params.signed_by(&key, &issuer.rc, &issuer.key),
        None => params.self_signed(&key),
    }
    .expect("non-CA certificate");
    to_model(&rc)
}
