//! DoH relay transport (RFC 8484, POST form).
//!
//! The same wire message UDP and TCP carry is posted to a relay, which
//! forwards it and returns the raw answer as the response body.

use super::DnsTransport;
use async_trait::async_trait;
use bytes::Bytes;
use dnschat_domain::DnsError;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use std::sync::LazyLock;
use std::time::Duration;
use tracing::debug;

const DNS_MESSAGE: &str = "application/dns-message";

/// Largest body that can still be a DNS message.
const MAX_BODY_LEN: usize = u16::MAX as usize;

static SHARED_CLIENT: LazyLock<reqwest::Client> = LazyLock::new(|| {
    reqwest::Client::builder()
        .use_rustls_tls()
        .pool_max_idle_per_host(4)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
});

pub struct HttpsTransport {
    url: String,
}

impl HttpsTransport {
    pub fn new(url: String) -> Self {
        Self { url }
    }

    fn request_error(&self, err: reqwest::Error) -> DnsError {
        if err.is_timeout() {
            DnsError::timeout(format!("DoH request to {} timed out", self.url))
        } else if err.is_connect() {
            DnsError::server_unreachable(format!("DoH relay {} unreachable: {}", self.url, err))
        } else {
            DnsError::query_failed(format!("DoH request to {} failed: {}", self.url, err))
        }
    }

    async fn post(&self, message_bytes: &[u8], timeout: Duration) -> Result<Bytes, DnsError> {
        let response = SHARED_CLIENT
            .post(&self.url)
            .header(CONTENT_TYPE, DNS_MESSAGE)
            .header(ACCEPT, DNS_MESSAGE)
            .timeout(timeout)
            .body(message_bytes.to_vec())
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DnsError::server_unreachable(format!(
                "DoH relay {} answered HTTP {}",
                self.url,
                status.as_u16()
            )));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        if !content_type.starts_with(DNS_MESSAGE) {
            return Err(DnsError::invalid_response(format!(
                "DoH relay {} sent '{}' instead of {}",
                self.url, content_type, DNS_MESSAGE
            )));
        }

        let body = response.bytes().await.map_err(|e| self.request_error(e))?;
        if body.len() > MAX_BODY_LEN {
            return Err(DnsError::invalid_response(format!(
                "DoH body of {} bytes exceeds a DNS message",
                body.len()
            )));
        }
        Ok(body)
    }
}

#[async_trait]
impl DnsTransport for HttpsTransport {
    async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<Bytes, DnsError> {
        debug!(url = %self.url, message_len = message_bytes.len(), "Posting DoH query");

        // The request timeout covers connect and headers; this one also bounds the body read.
        let bytes = tokio::time::timeout(timeout, self.post(message_bytes, timeout))
            .await
            .map_err(|_| {
                DnsError::timeout(format!(
                    "DoH relay {} gave no answer within {}ms",
                    self.url,
                    timeout.as_millis()
                ))
            })??;

        debug!(url = %self.url, bytes_received = bytes.len(), "DoH answer received");

        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dnschat_domain::DnsErrorKind;

    #[test]
    fn test_timeout_error_names_relay() {
        let transport = HttpsTransport::new("https://relay.example/dns-query".to_string());
        let err = DnsError::timeout(format!("DoH request to {} timed out", transport.url));
        assert_eq!(err.kind, DnsErrorKind::Timeout);
        assert!(err.message.contains("relay.example"));
    }

    #[tokio::test]
    async fn test_closed_port_is_an_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let transport = HttpsTransport::new(format!("https://{}/dns-query", addr));
        let err = transport
            .send(&[0u8; 12], Duration::from_secs(2))
            .await
            .unwrap_err();
        assert!(
            matches!(
                err.kind,
                DnsErrorKind::ServerUnreachable | DnsErrorKind::QueryFailed
            ),
            "{}",
            err
        );
    }
}
