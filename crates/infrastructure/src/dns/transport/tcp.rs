//! TCP Transport for DNS queries (RFC 1035 §4.2.2)
//!
//! Each attempt opens its own connection and drops it on exit; messages are
//! framed with a 2-byte big-endian length prefix.

use super::{map_io_error, resolver, DnsTransport};
use async_trait::async_trait;
use bytes::Bytes;
use dnschat_domain::{DnsError, ServerAddr};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::debug;

const MAX_TCP_MESSAGE_SIZE: usize = 65535;

pub struct TcpTransport {
    server: ServerAddr,
}

impl TcpTransport {
    pub fn new(server: ServerAddr) -> Self {
        Self { server }
    }

    async fn connect(&self, timeout: Duration) -> Result<TcpStream, DnsError> {
        let server_addr = resolver::socket_addr(&self.server, timeout).await?;

        let stream = tokio::time::timeout(timeout, TcpStream::connect(server_addr))
            .await
            .map_err(|_| {
                DnsError::timeout(format!("Timeout connecting to TCP server {}", server_addr))
            })?
            .map_err(|e| map_io_error(&e, format!("Failed to connect to {}", server_addr)))?;

        stream
            .set_nodelay(true)
            .map_err(|e| map_io_error(&e, format!("Failed to set TCP_NODELAY on {}", server_addr)))?;

        Ok(stream)
    }
}

#[async_trait]
impl DnsTransport for TcpTransport {
    async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<Bytes, DnsError> {
        let mut stream = self.connect(timeout).await?;

        tokio::time::timeout(timeout, send_with_length_prefix(&mut stream, message_bytes))
            .await
            .map_err(|_| {
                DnsError::timeout(format!("Timeout sending TCP query to {}", self.server))
            })??;

        debug!(
            server = %self.server,
            message_len = message_bytes.len(),
            "TCP query sent"
        );

        let response_bytes = tokio::time::timeout(timeout, read_with_length_prefix(&mut stream))
            .await
            .map_err(|_| {
                DnsError::timeout(format!(
                    "Timeout waiting for TCP response from {}",
                    self.server
                ))
            })??;

        debug!(
            server = %self.server,
            response_len = response_bytes.len(),
            "TCP response received"
        );

        Ok(Bytes::from(response_bytes))
    }
}

pub(crate) async fn send_with_length_prefix<S>(
    stream: &mut S,
    message_bytes: &[u8],
) -> Result<(), DnsError>
where
    S: AsyncWriteExt + Unpin,
{
    let length = u16::try_from(message_bytes.len()).map_err(|_| {
        DnsError::query_failed(format!(
            "DNS message too large for TCP framing: {} bytes",
            message_bytes.len()
        ))
    })?;

    stream
        .write_all(&length.to_be_bytes())
        .await
        .map_err(|e| map_io_error(&e, "Failed to write length prefix"))?;
    stream
        .write_all(message_bytes)
        .await
        .map_err(|e| map_io_error(&e, "Failed to write DNS message"))?;
    stream
        .flush()
        .await
        .map_err(|e| map_io_error(&e, "Failed to flush stream"))?;

    Ok(())
}

pub(crate) async fn read_with_length_prefix<S>(stream: &mut S) -> Result<Vec<u8>, DnsError>
where
    S: AsyncReadExt + Unpin,
{
    let mut len_buf = [0u8; 2];
    stream
        .read_exact(&mut len_buf)
        .await
        .map_err(|e| read_error(&e, "Failed to read response length"))?;

    let response_len = u16::from_be_bytes(len_buf) as usize;

    if response_len > MAX_TCP_MESSAGE_SIZE {
        return Err(DnsError::invalid_response(format!(
            "Response too large: {} bytes (max {})",
            response_len, MAX_TCP_MESSAGE_SIZE
        )));
    }

    let mut response = vec![0u8; response_len];
    stream
        .read_exact(&mut response)
        .await
        .map_err(|e| read_error(&e, "Failed to read response body"))?;

    Ok(response)
}

/// A peer closing mid-frame leaves a short message, not a network fault.
fn read_error(err: &std::io::Error, context: &str) -> DnsError {
    if err.kind() == std::io::ErrorKind::UnexpectedEof {
        DnsError::invalid_response(format!("{}: connection closed mid-message", context))
    } else {
        map_io_error(err, context)
    }
}
