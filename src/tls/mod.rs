//! TLS certificate chain retrieval.
//!
//! This module connects to a TLS endpoint and captures the certificate chain the
//! peer presents during the handshake:
//! - The TCP connection and the handshake each run under the given timeout
//! - Server name indication is sent when a host name is provided
//! - Chain verification is disabled so invalid chains remain inspectable
//!
//! Uses `tokio-rustls` for the async TLS connection and `x509-parser` (through
//! [`Certificate::from_der`]) for certificate parsing.

mod verifier;

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio_rustls::rustls::crypto::ring::default_provider;
use tokio_rustls::rustls::pki_types::ServerName;
use tokio_rustls::rustls::ClientConfig;
use tokio_rustls::TlsConnector;

use crate::certs::Certificate;
use crate::error_handling::FetchError;

use verifier::NoCertificateVerification;

/// Builds a client configuration that accepts any server chain.
fn client_config() -> Result<ClientConfig, FetchError> {
    let config = ClientConfig::builder_with_provider(Arc::new(default_provider()))
        .with_safe_default_protocol_versions()?
        .dangerous()
        .with_custom_certificate_verifier(Arc::new(NoCertificateVerification))
        .with_no_client_auth();
    Ok(config)
}

/// Server name used for SNI: `host_val` when given, otherwise the IP literal.
fn server_name_for(host_val: &str, ip: IpAddr) -> Result<ServerName<'static>, FetchError> {
    let host_val = host_val.trim();
    if host_val.is_empty() {
        return Ok(ServerName::IpAddress(ip.into()));
    }
    ServerName::try_from(host_val.to_string())
        .map_err(|_| FetchError::InvalidServerName(host_val.to_string()))
}

/// Retrieves the certificate chain presented by a TLS server.
///
/// # Arguments
///
/// * `host_val` - Host name sent for SNI; may be empty
/// * `ip_addr` - IP address to connect to
/// * `port` - TCP port
/// * `timeout` - Limit applied separately to the TCP connect and the handshake
///
/// # Returns
///
/// The certificates in the order the server presented them.
///
/// # Errors
///
/// Returns an error if:
/// - `ip_addr` is empty or not an IP address
/// - The TCP connection fails or times out
/// - The TLS handshake fails or times out
/// - The server presents no certificates, or one fails to parse
///
/// A failure to close the connection cleanly is logged and does not discard the
/// retrieved chain.
pub async fn get_certs(
    host_val: &str,
    ip_addr: &str,
    port: u16,
    timeout: Duration,
) -> Result<Vec<Certificate>, FetchError> {
    let ip_addr = ip_addr.trim();
    if ip_addr.is_empty() {
        return Err(FetchError::MissingValue("IP address"));
    }
    let ip: IpAddr = ip_addr
        .parse()
        .map_err(|_| FetchError::InvalidAddress(ip_addr.to_string()))?;
    let addr = SocketAddr::new(ip, port);
    let server_name = server_name_for(host_val, ip)?;
    let connector = TlsConnector::from(Arc::new(client_config()?));

    debug!("Connecting to {addr} (SNI: {host_val:?})");
    let sock = match tokio::time::timeout(timeout, TcpStream::connect(addr)).await {
        Ok(Ok(sock)) => sock,
        Ok(Err(source)) => {
            return Err(FetchError::Connect {
                addr: addr.to_string(),
                source,
            })
        }
        Err(_) => {
            return Err(FetchError::Timeout {
                stage: "TCP connection",
                addr: addr.to_string(),
                timeout,
            })
        }
    };

    let mut tls_stream = match tokio::time::timeout(timeout, connector.connect(server_name, sock))
        .await
    {
        Ok(Ok(stream)) => stream,
        Ok(Err(source)) => {
            return Err(FetchError::Handshake {
                addr: addr.to_string(),
                source,
            })
        }
        Err(_) => {
            return Err(FetchError::Timeout {
                stage: "TLS handshake",
                addr: addr.to_string(),
                timeout,
            })
        }
    };

    let chain = match tls_stream.get_ref().1.peer_certificates() {
        Some(certs) if !certs.is_empty() => certs
            .iter()
            .map(|der| Certificate::from_der(der.as_ref()))
            .collect::<Result<Vec<_>, _>>()?,
        _ => return Err(FetchError::NoPeerCerts(addr.to_string())),
    };
    debug!("Retrieved {} cert(s) from {addr}", chain.len());

    if let Err(e) = tls_stream.shutdown().await {
        warn!("Failed to close TLS connection to {addr}: {e}");
    }

    Ok(chain)
}
