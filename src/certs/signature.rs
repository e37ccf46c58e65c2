//! Signature verification between an issued certificate and its issuer.
//!
//! Modern algorithms go through `x509-parser`'s verifier. MD5-RSA, SHA1-RSA and
//! ECDSA-SHA1 are rejected there, so they are verified here directly with the RSA
//! and NIST curve crates. This only identifies who signed what; it is not a trust
//! decision.

use md5::Md5;
use p256::ecdsa::signature::hazmat::PrehashVerifier;
use rsa::pkcs8::DecodePublicKey;
use rsa::{Pkcs1v15Sign, RsaPublicKey};
use sha1::{Digest, Sha1};

use super::model::{Certificate, PublicKeyKind, SignatureAlgorithm};
use crate::error_handling::SignatureError;

/// Verifies that `issuer` signed `issued`.
///
/// # Arguments
///
/// * `issued` - Certificate whose signature is checked
/// * `issuer` - Certificate whose public key should have produced the signature
///
/// # Errors
///
/// Returns `SignatureError::NameMismatch` when `issued`'s issuer DN differs from
/// `issuer`'s subject DN, `SignatureError::UnsupportedAlgorithm` for algorithms with
/// no verification path, and `SignatureError::KeyMismatch` or
/// `SignatureError::Invalid` when the signature does not check out.
pub fn verify_signature(issued: &Certificate, issuer: &Certificate) -> Result<(), SignatureError> {
    if issued.issuer() != issuer.subject() {
        return Err(SignatureError::NameMismatch);
    }

    match issued.signature_algorithm() {
        SignatureAlgorithm::Md5WithRsa => {
            verify_rsa_pkcs1::<Md5>(issued, issuer, Pkcs1v15Sign::new::<Md5>())
        }
        SignatureAlgorithm::Sha1WithRsa => {
            verify_rsa_pkcs1::<Sha1>(issued, issuer, Pkcs1v15Sign::new::<Sha1>())
        }
        SignatureAlgorithm::EcdsaWithSha1 => verify_ecdsa_sha1(issued, issuer),
        alg @ (SignatureAlgorithm::Md2WithRsa
        | SignatureAlgorithm::DsaWithSha1
        | SignatureAlgorithm::DsaWithSha256
        | SignatureAlgorithm::Unknown) => {
            let name = if alg == SignatureAlgorithm::Unknown {
                issued.signature_algorithm_oid().to_string()
            } else {
                alg.to_string()
            };
            Err(SignatureError::UnsupportedAlgorithm(name))
        }
        _ => verify_modern(issued, issuer),
    }
}

fn verify_modern(issued: &Certificate, issuer: &Certificate) -> Result<(), SignatureError> {
    let (_, issued_x509) = x509_parser::parse_x509_certificate(issued.der())
        .map_err(|e| SignatureError::Invalid(e.to_string()))?;
    let (_, issuer_x509) = x509_parser::parse_x509_certificate(issuer.der())
        .map_err(|e| SignatureError::Invalid(e.to_string()))?;

    issued_x509
        .verify_signature(Some(issuer_x509.public_key()))
        .map_err(|e| SignatureError::Invalid(e.to_string()))
}

fn verify_rsa_pkcs1<D: Digest>(
    issued: &Certificate,
    issuer: &Certificate,
    scheme: Pkcs1v15Sign,
) -> Result<(), SignatureError> {
    if !matches!(issuer.public_key().kind, PublicKeyKind::Rsa { .. }) {
        return Err(SignatureError::KeyMismatch("RSA"));
    }
    let key = RsaPublicKey::from_public_key_der(&issuer.public_key().spki_der)
        .map_err(|_| SignatureError::KeyMismatch("RSA"))?;

    let hashed = D::digest(issued.tbs());
    key.verify(scheme, &hashed, issued.signature())
        .map_err(|e| SignatureError::Invalid(e.to_string()))
}

fn verify_ecdsa_sha1(issued: &Certificate, issuer: &Certificate) -> Result<(), SignatureError> {
    let bits = match issuer.public_key().kind {
        PublicKeyKind::Ecdsa { bits } => bits,
        _ => return Err(SignatureError::KeyMismatch("ECDSA")),
    };

    let digest = Sha1::digest(issued.tbs());
    let spki = &issuer.public_key().spki_der;
    let sig = issued.signature();

    match bits {
        256 => {
            let key = p256::ecdsa::VerifyingKey::from_public_key_der(spki)
                .map_err(|_| SignatureError::KeyMismatch("ECDSA P-256"))?;
            let signature = p256::ecdsa::Signature::from_der(sig)
                .map_err(|e| SignatureError::Invalid(e.to_string()))?;
            key.verify_prehash(&left_pad(&digest, 32), &signature)
                .map_err(|e| SignatureError::Invalid(e.to_string()))
        }
        384 => {
            let key = p384::ecdsa::VerifyingKey::from_public_key_der(spki)
                .map_err(|_| SignatureError::KeyMismatch("ECDSA P-384"))?;
            let signature = p384::ecdsa::Signature::from_der(sig)
                .map_err(|e| SignatureError::Invalid(e.to_string()))?;
            key.verify_prehash(&left_pad(&digest, 48), &signature)
                .map_err(|e| SignatureError::Invalid(e.to_string()))
        }
        other => Err(SignatureError::UnsupportedAlgorithm(format!(
            "ECDSA-SHA1 on {other} bit curve"
        ))),
    }
}

/// Left-pads a digest with zero bytes up to the curve's field size.
fn left_pad(digest: &[u8], len: usize) -> Vec<u8> {
    if digest.len() >= len {
        return digest.to_vec();
    }
    let mut padded = vec![0u8; len - digest.len()];
    padded.extend_from_slice(digest);
    padded
}
