//! Port probing and chain retrieval seams.

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use futures::future::BoxFuture;
use futures::FutureExt;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpSocket;

use crate::certs::Certificate;
use crate::error_handling::{FetchError, PortCheckError};
use crate::tls::get_certs;

/// Checks whether a TCP port accepts connections.
pub trait PortProber: Send + Sync + 'static {
    fn check_port(
        &self,
        ip: IpAddr,
        port: u16,
        timeout: Duration,
    ) -> BoxFuture<'_, Result<(), PortCheckError>>;
}

/// Retrieves the certificate chain served on an open port.
pub trait CertFetcher: Send + Sync + 'static {
    fn fetch(
        &self,
        host_val: String,
        ip: IpAddr,
        port: u16,
        timeout: Duration,
    ) -> BoxFuture<'_, Result<Vec<Certificate>, FetchError>>;
}

/// Dials with TCP keep-alive disabled, then closes the connection.
#[derive(Debug, Default, Clone, Copy)]
pub struct TcpPortProber;

impl PortProber for TcpPortProber {
    fn check_port(
        &self,
        ip: IpAddr,
        port: u16,
        timeout: Duration,
    ) -> BoxFuture<'_, Result<(), PortCheckError>> {
        check_port(ip, port, timeout).boxed()
    }
}

/// Retrieves chains with [`get_certs`].
#[derive(Debug, Default, Clone, Copy)]
pub struct TlsCertFetcher;

impl CertFetcher for TlsCertFetcher {
    fn fetch(
        &self,
        host_val: String,
        ip: IpAddr,
        port: u16,
        timeout: Duration,
    ) -> BoxFuture<'_, Result<Vec<Certificate>, FetchError>> {
        async move { get_certs(&host_val, &ip.to_string(), port, timeout).await }.boxed()
    }
}

/// Opens and closes a TCP connection to `ip:port`.
///
/// # Errors
///
/// Returns `PortCheckError::Dial` if the connection fails or times out,
/// `PortCheckError::KeepAlive` if keep-alive cannot be disabled, or
/// `PortCheckError::Close` if the established connection does not close cleanly.
pub async fn check_port(ip: IpAddr, port: u16, timeout: Duration) -> Result<(), PortCheckError> {
    let addr = SocketAddr::new(ip, port);
    let socket = match ip {
        IpAddr::V4(_) => TcpSocket::new_v4(),
        IpAddr::V6(_) => TcpSocket::new_v6(),
    }
    .map_err(|e| PortCheckError::Dial(e.to_string()))?;
    socket
        .set_keepalive(false)
        .map_err(|e| PortCheckError::KeepAlive(e.to_string()))?;

    let mut stream = match tokio::time::timeout(timeout, socket.connect(addr)).await {
        Ok(Ok(stream)) => stream,
        Ok(Err(e)) => return Err(PortCheckError::Dial(e.to_string())),
        Err(_) => {
            return Err(PortCheckError::Dial(format!(
                "{addr} timed out after {timeout:?}"
            )))
        }
    };

    stream
        .shutdown()
        .await
        .map_err(|e| PortCheckError::Close(e.to_string()))
}
