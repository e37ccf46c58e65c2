//! Owned certificate model.
//!
//! `x509-parser` hands out certificates that borrow from the DER buffer. Validators,
//! reports and the discovery pipeline all need to share certificates freely, so each
//! certificate is parsed once into an owned, immutable [`Certificate`].

use std::fmt;
use std::net::IpAddr;

use chrono::{DateTime, Utc};
use x509_parser::extensions::{GeneralName, ParsedExtension};
use pem::{EncodeConfig, LineEnding, Pem};
use x509_parser::public_key::PublicKey;

use crate::error_handling::CertError;

const PEM_CERTIFICATE_TAG: &str = "CERTIFICATE";

/// Signature algorithm OIDs.
mod oid {
    pub const MD2_WITH_RSA: &str = "1.2.840.113549.1.1.2";
    pub const MD5_WITH_RSA: &str = "1.2.840.113549.1.1.4";
    pub const SHA1_WITH_RSA: &str = "1.2.840.113549.1.1.5";
    pub const RSASSA_PSS: &str = "1.2.840.113549.1.1.10";
    pub const SHA256_WITH_RSA: &str = "1.2.840.113549.1.1.11";
    pub const SHA384_WITH_RSA: &str = "1.2.840.113549.1.1.12";
    pub const SHA512_WITH_RSA: &str = "1.2.840.113549.1.1.13";
    pub const DSA_WITH_SHA1: &str = "1.2.840.10040.4.3";
    pub const DSA_WITH_SHA256: &str = "2.16.840.1.101.3.4.3.2";
    pub const ECDSA_WITH_SHA1: &str = "1.2.840.10045.4.1";
    pub const ECDSA_WITH_SHA256: &str = "1.2.840.10045.4.3.2";
    pub const ECDSA_WITH_SHA384: &str = "1.2.840.10045.4.3.3";
    pub const ECDSA_WITH_SHA512: &str = "1.2.840.10045.4.3.4";
    pub const ED25519: &str = "1.3.101.112";
}

/// Signature algorithm used by the issuer to sign a certificate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
pub enum SignatureAlgorithm {
    #[strum(to_string = "MD2-RSA")]
    Md2WithRsa,
    #[strum(to_string = "MD5-RSA")]
    Md5WithRsa,
    #[strum(to_string = "SHA1-RSA")]
    Sha1WithRsa,
    #[strum(to_string = "SHA256-RSA")]
    Sha256WithRsa,
    #[strum(to_string = "SHA384-RSA")]
    Sha384WithRsa,
    #[strum(to_string = "SHA512-RSA")]
    Sha512WithRsa,
    #[strum(to_string = "RSASSA-PSS")]
    RsaPss,
    #[strum(to_string = "DSA-SHA1")]
    DsaWithSha1,
    #[strum(to_string = "DSA-SHA256")]
    DsaWithSha256,
    #[strum(to_string = "ECDSA-SHA1")]
    EcdsaWithSha1,
    #[strum(to_string = "ECDSA-SHA256")]
    EcdsaWithSha256,
    #[strum(to_string = "ECDSA-SHA384")]
    EcdsaWithSha384,
    #[strum(to_string = "ECDSA-SHA512")]
    EcdsaWithSha512,
    #[strum(to_string = "Ed25519")]
    Ed25519,
    #[strum(to_string = "Unknown")]
    Unknown,
}

impl SignatureAlgorithm {
    /// Maps a dotted OID string to a known algorithm.
    pub fn from_oid(oid: &str) -> Self {
        match oid {
            oid::MD2_WITH_RSA => Self::Md2WithRsa,
            oid::MD5_WITH_RSA => Self::Md5WithRsa,
            oid::SHA1_WITH_RSA => Self::Sha1WithRsa,
            oid::SHA256_WITH_RSA => Self::Sha256WithRsa,
            oid::SHA384_WITH_RSA => Self::Sha384WithRsa,
            oid::SHA512_WITH_RSA => Self::Sha512WithRsa,
            oid::RSASSA_PSS => Self::RsaPss,
            oid::DSA_WITH_SHA1 => Self::DsaWithSha1,
            oid::DSA_WITH_SHA256 => Self::DsaWithSha256,
            oid::ECDSA_WITH_SHA1 => Self::EcdsaWithSha1,
            oid::ECDSA_WITH_SHA256 => Self::EcdsaWithSha256,
            oid::ECDSA_WITH_SHA384 => Self::EcdsaWithSha384,
            oid::ECDSA_WITH_SHA512 => Self::EcdsaWithSha512,
            oid::ED25519 => Self::Ed25519,
            _ => Self::Unknown,
        }
    }

    /// Algorithms considered too weak for certificates in a served chain.
    pub fn is_weak(self) -> bool {
        matches!(
            self,
            Self::Md2WithRsa
                | Self::Md5WithRsa
                | Self::Sha1WithRsa
                | Self::DsaWithSha1
                | Self::EcdsaWithSha1
        )
    }
}

/// Key usage bits (RFC 5280 section 4.2.1.3), same bit positions as the extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyUsage(u16);

impl KeyUsage {
    pub const DIGITAL_SIGNATURE: u16 = 1;
    pub const CONTENT_COMMITMENT: u16 = 1 << 1;
    pub const KEY_ENCIPHERMENT: u16 = 1 << 2;
    pub const DATA_ENCIPHERMENT: u16 = 1 << 3;
    pub const KEY_AGREEMENT: u16 = 1 << 4;
    pub const CERT_SIGN: u16 = 1 << 5;
    pub const CRL_SIGN: u16 = 1 << 6;
    pub const ENCIPHER_ONLY: u16 = 1 << 7;
    pub const DECIPHER_ONLY: u16 = 1 << 8;

    const NAMES: [(u16, &'static str); 9] = [
        (Self::DIGITAL_SIGNATURE, "Digital Signature"),
        (Self::CONTENT_COMMITMENT, "Content Commitment"),
        (Self::KEY_ENCIPHERMENT, "Key Encipherment"),
        (Self::DATA_ENCIPHERMENT, "Data Encipherment"),
        (Self::KEY_AGREEMENT, "Key Agreement"),
        (Self::CERT_SIGN, "Certificate Sign"),
        (Self::CRL_SIGN, "CRL Sign"),
        (Self::ENCIPHER_ONLY, "Encipher Only"),
        (Self::DECIPHER_ONLY, "Decipher Only"),
    ];

    pub fn from_bits(bits: u16) -> Self {
        Self(bits)
    }

    pub fn bits(self) -> u16 {
        self.0
    }

    pub fn contains(self, bit: u16) -> bool {
        self.0 & bit != 0
    }

    pub fn cert_sign(self) -> bool {
        self.contains(Self::CERT_SIGN)
    }

    pub fn crl_sign(self) -> bool {
        self.contains(Self::CRL_SIGN)
    }

    /// Names of the set bits, in bit order.
    pub fn names(self) -> Vec<&'static str> {
        Self::NAMES
            .iter()
            .filter(|(bit, _)| self.contains(*bit))
            .map(|(_, name)| *name)
            .collect()
    }
}

/// Kind of subject public key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublicKeyKind {
    /// RSA key with its modulus size in bits.
    Rsa { bits: usize },
    /// Elliptic curve key with its size in bits.
    Ecdsa { bits: usize },
    /// Anything else, named by its algorithm OID.
    Other(String),
}

impl fmt::Display for PublicKeyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PublicKeyKind::Rsa { bits } => write!(f, "RSA ({bits} bit)"),
            PublicKeyKind::Ecdsa { bits } => match bits {
                256 => write!(f, "ECDSA (P-256)"),
                384 => write!(f, "ECDSA (P-384)"),
                521 => write!(f, "ECDSA (P-521)"),
                _ => write!(f, "ECDSA ({bits} bit)"),
            },
            PublicKeyKind::Other(oid) => write!(f, "{oid}"),
        }
    }
}

/// Subject public key: its kind plus the DER encoded SubjectPublicKeyInfo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKeyInfo {
    pub kind: PublicKeyKind,
    pub spki_der: Vec<u8>,
}

/// A parsed, immutable X.509 certificate.
#[derive(Debug, Clone)]
pub struct Certificate {
    der: Vec<u8>,
    subject: String,
    issuer: String,
    common_name: Option<String>,
    dns_names: Vec<String>,
    ip_addresses: Vec<IpAddr>,
    serial: Vec<u8>,
    not_before: DateTime<Utc>,
    not_after: DateTime<Utc>,
    version: u32,
    is_ca: bool,
    path_len_constraint: Option<u32>,
    key_usage: Option<KeyUsage>,
    ext_key_usage: Option<Vec<String>>,
    signature_algorithm: SignatureAlgorithm,
    signature_algorithm_oid: String,
    tbs: Vec<u8>,
    signature: Vec<u8>,
    public_key: PublicKeyInfo,
    subject_key_id: Option<Vec<u8>>,
    authority_key_id: Option<Vec<u8>>,
}

impl PartialEq for Certificate {
    fn eq(&self, other: &Self) -> bool {
        self.der == other.der
    }
}

impl Eq for Certificate {}

impl Certificate {
    /// Parses a single DER encoded certificate.
    ///
    /// # Errors
    ///
    /// Returns `CertError::MalformedCertificate` if the bytes are not a valid
    /// certificate or carry malformed extensions.
    pub fn from_der(der: &[u8]) -> Result<Self, CertError> {
        let (_, cert) = x509_parser::parse_x509_certificate(der)
            .map_err(|e| CertError::MalformedCertificate(e.to_string()))?;
        let malformed = |what: &str| CertError::MalformedCertificate(what.to_string());

        let not_before = DateTime::from_timestamp(cert.validity().not_before.timestamp(), 0)
            .ok_or_else(|| malformed("NotBefore out of range"))?;
        let not_after = DateTime::from_timestamp(cert.validity().not_after.timestamp(), 0)
            .ok_or_else(|| malformed("NotAfter out of range"))?;

        let common_name = cert
            .subject()
            .iter_common_name()
            .next()
            .and_then(|attr| attr.as_str().ok())
            .map(str::to_string);

        let mut dns_names = Vec::new();
        let mut ip_addresses = Vec::new();
        let mut is_ca = false;
        let mut path_len_constraint = None;
        let mut key_usage = None;
        let mut ext_key_usage = None;
        let mut subject_key_id = None;
        let mut authority_key_id = None;

        for ext in cert.extensions() {
            match ext.parsed_extension() {
                ParsedExtension::SubjectAlternativeName(san) => {
                    for name in &san.general_names {
                        match name {
                            GeneralName::DNSName(dns) => dns_names.push(dns.to_string()),
                            GeneralName::IPAddress(raw) => {
                                if let Some(ip) = ip_from_bytes(raw) {
                                    ip_addresses.push(ip);
                                }
                            }
                            _ => {}
                        }
                    }
                }
                ParsedExtension::BasicConstraints(bc) => {
                    is_ca = bc.ca;
                    path_len_constraint = bc.path_len_constraint;
                }
                ParsedExtension::KeyUsage(ku) => {
                    key_usage = Some(KeyUsage::from_bits(ku.flags));
                }
                ParsedExtension::ExtendedKeyUsage(eku) => {
                    let mut purposes = Vec::new();
                    let known = [
                        (eku.any, "Any"),
                        (eku.server_auth, "ServerAuth"),
                        (eku.client_auth, "ClientAuth"),
                        (eku.code_signing, "CodeSigning"),
                        (eku.email_protection, "EmailProtection"),
                        (eku.time_stamping, "TimeStamping"),
                        (eku.ocsp_signing, "OCSPSigning"),
                    ];
                    purposes.extend(known.iter().filter(|(set, _)| *set).map(|(_, n)| n.to_string()));
                    purposes.extend(eku.other.iter().map(|oid| oid.to_id_string()));
                    ext_key_usage = Some(purposes);
                }
                ParsedExtension::SubjectKeyIdentifier(kid) => {
                    subject_key_id = Some(kid.0.to_vec());
                }
                ParsedExtension::AuthorityKeyIdentifier(aki) => {
                    authority_key_id = aki.key_identifier.as_ref().map(|kid| kid.0.to_vec());
                }
                _ => {}
            }
        }

        let spki = cert.public_key();
        let kind = match spki.parsed() {
            Ok(PublicKey::RSA(rsa)) => PublicKeyKind::Rsa {
                bits: rsa.key_size(),
            },
            Ok(PublicKey::EC(ec)) => PublicKeyKind::Ecdsa {
                bits: ec.key_size(),
            },
            _ => PublicKeyKind::Other(spki.algorithm.algorithm.to_id_string()),
        };

        let signature_algorithm_oid = cert.signature_algorithm.algorithm.to_id_string();

        Ok(Self {
            der: der.to_vec(),
            subject: cert.subject().to_string(),
            issuer: cert.issuer().to_string(),
            common_name,
            dns_names,
            ip_addresses,
            serial: cert.raw_serial().to_vec(),
            not_before,
            not_after,
            version: cert.version().0 + 1,
            is_ca,
            path_len_constraint,
            key_usage,
            ext_key_usage,
            signature_algorithm: SignatureAlgorithm::from_oid(&signature_algorithm_oid),
            signature_algorithm_oid,
            tbs: cert.tbs_certificate.as_ref().to_vec(),
            signature: cert.signature_value.data.to_vec(),
            public_key: PublicKeyInfo {
                kind,
                spki_der: spki.raw.to_vec(),
            },
            subject_key_id,
            authority_key_id,
        })
    }

    /// Raw DER bytes as presented by the peer or read from disk.
    pub fn der(&self) -> &[u8] {
        &self.der
    }

    /// Subject distinguished name in its canonical string form.
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Issuer distinguished name in its canonical string form.
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// First Common Name attribute of the subject, if any.
    pub fn common_name(&self) -> Option<&str> {
        self.common_name.as_deref()
    }

    /// DNS names from the Subject Alternative Name extension.
    pub fn dns_names(&self) -> &[String] {
        &self.dns_names
    }

    /// IP addresses from the Subject Alternative Name extension.
    pub fn ip_addresses(&self) -> &[IpAddr] {
        &self.ip_addresses
    }

    /// Serial number as the raw big-endian DER integer bytes.
    pub fn serial(&self) -> &[u8] {
        &self.serial
    }

    pub fn not_before(&self) -> DateTime<Utc> {
        self.not_before
    }

    pub fn not_after(&self) -> DateTime<Utc> {
        self.not_after
    }

    /// Certificate version (1, 2 or 3).
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Whether basic constraints mark this certificate as a CA.
    pub fn is_ca(&self) -> bool {
        self.is_ca
    }

    pub fn path_len_constraint(&self) -> Option<u32> {
        self.path_len_constraint
    }

    /// Key usage extension, `None` when absent.
    pub fn key_usage(&self) -> Option<KeyUsage> {
        self.key_usage
    }

    /// Extended key usage purposes, `None` when the extension is absent.
    pub fn ext_key_usage(&self) -> Option<&[String]> {
        self.ext_key_usage.as_deref()
    }

    pub fn signature_algorithm(&self) -> SignatureAlgorithm {
        self.signature_algorithm
    }

    /// Signature algorithm OID in dotted form, useful when the algorithm is unknown.
    pub fn signature_algorithm_oid(&self) -> &str {
        &self.signature_algorithm_oid
    }

    /// Raw DER of the to-be-signed portion.
    pub fn tbs(&self) -> &[u8] {
        &self.tbs
    }

    /// Raw signature bytes.
    pub fn signature(&self) -> &[u8] {
        &self.signature
    }

    pub fn public_key(&self) -> &PublicKeyInfo {
        &self.public_key
    }

    pub fn subject_key_id(&self) -> Option<&[u8]> {
        self.subject_key_id.as_deref()
    }

    pub fn authority_key_id(&self) -> Option<&[u8]> {
        self.authority_key_id.as_deref()
    }

    /// Name used when a single label is needed for display: the Common Name when
    /// present and non-empty, otherwise the first DNS name, otherwise the subject.
    pub fn display_name(&self) -> &str {
        match self.common_name() {
            Some(cn) if !cn.is_empty() => cn,
            _ => self
                .dns_names
                .first()
                .map(String::as_str)
                .unwrap_or(&self.subject),
        }
    }

    /// PEM encoding with 64 character lines and LF line endings.
    pub fn to_pem(&self) -> String {
        let block = Pem::new(PEM_CERTIFICATE_TAG, self.der.clone());
        pem::encode_config(&block, EncodeConfig::new().set_line_ending(LineEnding::LF))
    }
}

fn ip_from_bytes(raw: &[u8]) -> Option<IpAddr> {
    match raw.len() {
        4 => <[u8; 4]>::try_from(raw).ok().map(IpAddr::from),
        16 => <[u8; 16]>::try_from(raw).ok().map(IpAddr::from),
        _ => None,
    }
}
