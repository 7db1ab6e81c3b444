//! UDP Transport for DNS queries (RFC 1035 §4.2.1)
//!
//! One datagram out, one datagram back, on a socket bound for this attempt
//! only. The socket is closed when the attempt ends, whatever the outcome.

use super::{map_io_error, resolver, DnsTransport};
use async_trait::async_trait;
use bytes::Bytes;
use dnschat_domain::{DnsError, ServerAddr};
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;
use tokio::net::UdpSocket;
use tracing::{debug, warn};

/// Maximum UDP DNS response size with EDNS(0)
const MAX_UDP_RESPONSE_SIZE: usize = 4096;

/// DNS over UDP transport
pub struct UdpTransport {
    server: ServerAddr,
}

impl UdpTransport {
    pub fn new(server: ServerAddr) -> Self {
        Self { server }
    }
}

#[async_trait]
impl DnsTransport for UdpTransport {
    async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<Bytes, DnsError> {
        let server_addr = resolver::socket_addr(&self.server, timeout).await?;

        // Bind to ephemeral port (0 = OS assigns)
        let bind_addr: SocketAddr = if server_addr.is_ipv4() {
            (Ipv4Addr::UNSPECIFIED, 0).into()
        } else {
            (Ipv6Addr::UNSPECIFIED, 0).into()
        };

        let socket = UdpSocket::bind(bind_addr)
            .await
            .map_err(|e| map_io_error(&e, "Failed to bind UDP socket"))?;

        let bytes_sent = tokio::time::timeout(timeout, socket.send_to(message_bytes, server_addr))
            .await
            .map_err(|_| {
                DnsError::timeout(format!("Timeout sending UDP query to {}", server_addr))
            })?
            .map_err(|e| {
                map_io_error(&e, format!("Failed to send UDP query to {}", server_addr))
            })?;

        debug!(
            server = %server_addr,
            bytes_sent = bytes_sent,
            "UDP query sent"
        );

        let mut recv_buf = vec![0u8; MAX_UDP_RESPONSE_SIZE];

        let (bytes_received, from_addr) =
            tokio::time::timeout(timeout, socket.recv_from(&mut recv_buf))
                .await
                .map_err(|_| {
                    DnsError::timeout(format!(
                        "Timeout waiting for UDP response from {}",
                        server_addr
                    ))
                })?
                .map_err(|e| {
                    map_io_error(
                        &e,
                        format!("Failed to receive UDP response from {}", server_addr),
                    )
                })?;

        if from_addr != server_addr {
            warn!(
                expected = %server_addr,
                received_from = %from_addr,
                "UDP response from unexpected source"
            );
            return Err(DnsError::invalid_response(format!(
                "DNS response from unexpected source: {}",
                from_addr
            )));
        }

        recv_buf.truncate(bytes_received);

        debug!(
            server = %server_addr,
            bytes_received = bytes_received,
            "UDP response received"
        );

        Ok(Bytes::from(recv_buf))
    }
}
