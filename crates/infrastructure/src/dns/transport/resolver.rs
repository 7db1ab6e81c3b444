use dnschat_domain::{DnsError, ServerAddr};
use std::net::SocketAddr;
use std::time::Duration;
use tracing::debug;

/// Resolves a hostname to all its IP addresses (IPv4 + IPv6).
pub async fn resolve_all(
    hostname: &str,
    port: u16,
    timeout: Duration,
) -> Result<Vec<SocketAddr>, DnsError> {
    let target = format!("{}:{}", hostname, port);

    let addrs_iter = tokio::time::timeout(timeout, tokio::net::lookup_host(&target))
        .await
        .map_err(|_| DnsError::timeout(format!("Timeout resolving {}", target)))?
        .map_err(|e| {
            DnsError::network_unavailable(format!("DNS resolution failed for {}: {}", target, e))
        })?;

    let addrs: Vec<SocketAddr> = addrs_iter.collect();

    if addrs.is_empty() {
        return Err(DnsError::network_unavailable(format!(
            "No addresses found for {}",
            target
        )));
    }

    debug!(host = %hostname, addresses = addrs.len(), "Server hostname resolved");

    Ok(addrs)
}

/// Every socket address for `addr`, resolving the hostname if needed.
pub async fn socket_addrs(
    addr: &ServerAddr,
    timeout: Duration,
) -> Result<Vec<SocketAddr>, DnsError> {
    match addr {
        ServerAddr::Resolved(socket_addr) => Ok(vec![*socket_addr]),
        ServerAddr::Unresolved { hostname, port } => resolve_all(hostname, *port, timeout).await,
    }
}

/// First socket address for `addr`.
pub async fn socket_addr(addr: &ServerAddr, timeout: Duration) -> Result<SocketAddr, DnsError> {
    let addrs = socket_addrs(addr, timeout).await?;
    addrs
        .into_iter()
        .next()
        .ok_or_else(|| DnsError::network_unavailable(format!("No addresses found for {}", addr)))
}
