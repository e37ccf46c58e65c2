// Shared test helpers for certificate generation and local TLS servers.
//
// This module provides common utilities used across multiple test files to reduce duplication.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rcgen::{
    BasicConstraints, CertificateParams, DistinguishedName, DnType, ExtendedKeyUsagePurpose,
    IsCa, KeyPair, KeyUsagePurpose,
};
use time::{Duration, OffsetDateTime};
use tokio::io::AsyncReadExt;
use tokio::net::TcpListener;
use tokio_rustls::rustls::crypto::ring::default_provider;
use tokio_rustls::rustls::pki_types::{CertificateDer, PrivateKeyDer, PrivatePkcs8KeyDer};
use tokio_rustls::rustls::ServerConfig;
use tokio_rustls::TlsAcceptor;

use cert_status::certs::Certificate;

/// A generated chain with the leaf key, ready to be served.
pub struct GeneratedChain {
    /// Leaf, intermediate, root.
    pub ders: Vec<CertificateDer<'static>>,
    pub leaf_key: KeyPair,
}

impl GeneratedChain {
    #[allow(dead_code)] // Used by other test files
    pub fn certs(&self) -> Vec<Certificate> {
        self.ders
            .iter()
            .map(|der| Certificate::from_der(der.as_ref()).expect("generated certificate parses"))
            .collect()
    }
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

/// Leaf, intermediate and root expiring the given number of days from now.
#[allow(dead_code)] // Used by other test files
pub fn generate_chain(
    sans: &[&str],
    leaf_days: i64,
    intermediate_days: i64,
    root_days: i64,
) -> GeneratedChain {
    let root_key = KeyPair::generate().expect("key generation");
    let root = ca_params("Test Root CA", root_days)
        .self_signed(&root_key)
        .expect("root");

    let int_key = KeyPair::generate().expect("key generation");
    let intermediate = ca_params("Test Intermediate CA", intermediate_days)
        .signed_by(&int_key, &root, &root_key)
        .expect("intermediate");

    let leaf_key = KeyPair::generate().expect("key generation");
    let leaf_cn = sans.first().copied().unwrap_or("leaf.test");
    let leaf = leaf_params(leaf_cn, sans, leaf_days)
        .signed_by(&leaf_key, &intermediate, &int_key)
        .expect("leaf");

    GeneratedChain {
        ders: vec![leaf.der().clone(), intermediate.der().clone(), root.der().clone()],
        leaf_key,
    }
}

/// Self-signed server certificate.
#[allow(dead_code)] // Used by other test files
pub fn self_signed_leaf(cn: &str, sans: &[&str], not_after_days: i64) -> Certificate {
    let key = KeyPair::generate().expect("key generation");
    let cert = leaf_params(cn, sans, not_after_days)
        .self_signed(&key)
        .expect("self-signed leaf");
    Certificate::from_der(cert.der()).expect("generated certificate parses")
}

/// Writes certificates as concatenated PEM blocks.
#[allow(dead_code)] // Used by other test files
pub fn write_pem(dir: &Path, name: &str, certs: &[Certificate]) -> PathBuf {
    let path = dir.join(name);
    let pem: String = certs.iter().map(Certificate::to_pem).collect();
    std::fs::write(&path, pem).expect("Failed to write PEM file");
    path
}

/// Serves `chain` over TLS on a loopback port until the test ends.
///
/// Every accepted connection completes the handshake and is held until the client
/// closes it.
#[allow(dead_code)] // Used by other test files
pub async fn spawn_tls_server(chain: &GeneratedChain) -> SocketAddr {
    let key = PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(chain.leaf_key.serialize_der()));
    let config = ServerConfig::builder_with_provider(Arc::new(default_provider()))
        .with_safe_default_protocol_versions()
        .expect("protocol versions")
        .with_no_client_auth()
        .with_single_cert(chain.ders.clone(), key)
        .expect("server config");
    let acceptor = TlsAcceptor::from(Arc::new(config));

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind TLS listener");
    let addr = listener.local_addr().expect("local addr");

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let acceptor = acceptor.clone();
            tokio::spawn(async move {
                if let Ok(mut tls) = acceptor.accept(stream).await {
                    let mut buf = [0u8; 64];
                    let _ = tls.read(&mut buf).await;
                }
            });
        }
    });

    addr
}

/// A loopback port with nothing listening on it.
#[allow(dead_code)] // Used by other test files
pub async fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind listener");
    let port = listener.local_addr().expect("local addr").port();
    drop(listener);
    port
}
