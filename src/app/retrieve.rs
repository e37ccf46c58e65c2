//! Certificate chain retrieval for the single-chain tools.

use std::net::IpAddr;

use log::{debug, warn};

use crate::certs::{parse_cert_file, Certificate};
use crate::config::{ChainSource, MAX_HOST_EXPANSION};
use crate::error_handling::{HostError, RetrievalError};
use crate::hosts::expand_host;
use crate::initialization::init_resolver;
use crate::plugin::ServiceState;
use crate::tls::get_certs;

/// Resolves a server value to the address to connect to.
///
/// IP literals are used as-is; anything else goes through DNS and the first
/// address wins.
///
/// # Errors
///
/// Returns a `HostError` if the name does not resolve or names a range.
pub async fn resolve_server(server: &str) -> Result<IpAddr, HostError> {
    if let Ok(ip) = server.trim().parse::<IpAddr>() {
        return Ok(ip);
    }

    let resolver =
        init_resolver().map_err(|e| HostError::ResolveFailed(format!("{server}: {e}")))?;
    let pattern = expand_host(server, &resolver, MAX_HOST_EXPANSION).await?;
    if pattern.range {
        return Err(HostError::UnrecognizedIpAddress(server.to_string()));
    }
    pattern
        .expanded
        .first()
        .copied()
        .ok_or_else(|| HostError::ResolveFailed(server.to_string()))
}

/// Name sent for SNI: the DNS name when given, else the server when it is a host name.
pub fn sni_value(server: &str, dns_name: &str) -> String {
    if !dns_name.trim().is_empty() {
        dns_name.trim().to_string()
    } else if server.trim().parse::<IpAddr>().is_ok() {
        String::new()
    } else {
        server.trim().to_string()
    }
}

/// Reads a chain from a file or retrieves it from a server.
///
/// # Errors
///
/// Returns a `RetrievalError` describing which step failed.
pub async fn retrieve_chain(source: &ChainSource) -> Result<Vec<Certificate>, RetrievalError> {
    match source {
        ChainSource::File(path) => {
            let (certs, trailing) = parse_cert_file(path)?;
            if !trailing.iter().all(u8::is_ascii_whitespace) {
                warn!(
                    "Ignoring {} trailing byte(s) after the last certificate in {}",
                    trailing.len(),
                    path.display()
                );
            }
            debug!("Read {} cert(s) from {}", certs.len(), path.display());
            Ok(certs)
        }
        ChainSource::Server {
            server,
            dns_name,
            port,
            timeout,
        } => {
            let ip = resolve_server(server).await?;
            let host_val = sni_value(server, dns_name);
            let certs = get_certs(&host_val, &ip.to_string(), *port, *timeout).await?;
            Ok(certs)
        }
    }
}

/// Monitoring state for a chain that could not be obtained.
///
/// Unreadable input is UNKNOWN; an unreachable or misbehaving server is CRITICAL.
pub fn retrieval_failure_state(err: &RetrievalError) -> ServiceState {
    match err {
        RetrievalError::File(_) => ServiceState::Unknown,
        RetrievalError::Resolve(_) | RetrievalError::Fetch(_) => ServiceState::Critical,
    }
}
