#[cfg(feature = "dns-over-https")]
pub mod https;
pub mod native;
pub mod resolver;
pub mod tcp;
pub mod udp;

use async_trait::async_trait;
use bytes::Bytes;
use dnschat_domain::{
    DnsError, DnsQuery, ServerAddr, ServerEntry, TransportConfig, TransportKind, TxtRecordFragment,
};
use std::io;
use std::sync::Arc;
use std::time::Duration;

use super::forwarding::{MessageBuilder, ResponseParser};

/// Carries an encoded DNS message to the server and returns the raw reply.
#[async_trait]
pub trait DnsTransport: Send + Sync {
    async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<Bytes, DnsError>;
}

/// One way of obtaining the TXT strings published under a query name.
#[async_trait]
pub trait TxtLookup: Send + Sync {
    fn kind(&self) -> TransportKind;

    async fn lookup_txt(
        &self,
        name: &str,
        timeout: Duration,
    ) -> Result<Vec<TxtRecordFragment>, DnsError>;
}

/// Hand-built query over a [`DnsTransport`], validated against the question sent.
pub struct WireLookup<T> {
    kind: TransportKind,
    transport: T,
    fixed_id: Option<u16>,
}

impl<T: DnsTransport> WireLookup<T> {
    pub fn new(kind: TransportKind, transport: T) -> Self {
        Self {
            kind,
            transport,
            fixed_id: None,
        }
    }

    /// Sends every query with the same transaction id instead of a random one.
    pub fn with_fixed_id(mut self, id: u16) -> Self {
        self.fixed_id = Some(id);
        self
    }
}

#[async_trait]
impl<T: DnsTransport> TxtLookup for WireLookup<T> {
    fn kind(&self) -> TransportKind {
        self.kind
    }

    async fn lookup_txt(
        &self,
        name: &str,
        timeout: Duration,
    ) -> Result<Vec<TxtRecordFragment>, DnsError> {
        let query = match self.fixed_id {
            Some(id) => DnsQuery::txt(id, name),
            None => MessageBuilder::txt_query(name),
        };
        let message = MessageBuilder::encode(&query)?;
        let response = self.transport.send(&message, timeout).await?;
        ResponseParser::parse_for(&query, &response)
    }
}

/// Stands in for a transport compiled out of this build.
pub struct UnavailableTransport {
    kind: TransportKind,
    feature: &'static str,
}

impl UnavailableTransport {
    pub fn new(kind: TransportKind, feature: &'static str) -> Self {
        Self { kind, feature }
    }
}

#[async_trait]
impl TxtLookup for UnavailableTransport {
    fn kind(&self) -> TransportKind {
        self.kind
    }

    async fn lookup_txt(
        &self,
        _name: &str,
        _timeout: Duration,
    ) -> Result<Vec<TxtRecordFragment>, DnsError> {
        Err(DnsError::platform_unsupported(format!(
            "{} transport not available in this build (enable the '{}' feature)",
            self.kind, self.feature
        )))
    }
}

/// Builds the transport used for one attempt against one server.
pub trait TransportFactory: Send + Sync {
    /// `None` means the transport does not apply to `server` and is skipped.
    fn create(&self, kind: TransportKind, server: &ServerEntry) -> Option<Arc<dyn TxtLookup>>;
}

pub struct DefaultTransportFactory {
    port: u16,
    #[cfg_attr(not(feature = "dns-over-https"), allow(dead_code))]
    doh_url: Arc<str>,
}

impl DefaultTransportFactory {
    pub fn new(port: u16, doh_url: impl Into<Arc<str>>) -> Self {
        Self {
            port,
            doh_url: doh_url.into(),
        }
    }

    pub fn from_config(config: &TransportConfig) -> Self {
        Self::new(config.port, config.doh_url.as_str())
    }
}

impl TransportFactory for DefaultTransportFactory {
    fn create(&self, kind: TransportKind, server: &ServerEntry) -> Option<Arc<dyn TxtLookup>> {
        let addr = ServerAddr::from_host(&server.host, self.port);
        match kind {
            TransportKind::Native => Some(Arc::new(native::NativeTransport::new(addr))),
            TransportKind::Udp => Some(Arc::new(WireLookup::new(
                kind,
                udp::UdpTransport::new(addr),
            ))),
            TransportKind::Tcp => Some(Arc::new(WireLookup::new(
                kind,
                tcp::TcpTransport::new(addr),
            ))),
            TransportKind::Https if !server.doh => None,
            #[cfg(feature = "dns-over-https")]
            TransportKind::Https => Some(Arc::new(
                // RFC 8484 §4.1: id 0 keeps DoH responses cacheable.
                WireLookup::new(kind, https::HttpsTransport::new(self.doh_url.to_string()))
                    .with_fixed_id(0),
            )),
            #[cfg(not(feature = "dns-over-https"))]
            TransportKind::Https => Some(Arc::new(UnavailableTransport::new(
                kind,
                "dns-over-https",
            ))),
        }
    }
}

/// Maps a socket error onto the engine's error taxonomy.
pub fn map_io_error(err: &io::Error, context: impl std::fmt::Display) -> DnsError {
    let message = format!("{}: {}", context, err);
    match err.kind() {
        io::ErrorKind::PermissionDenied => DnsError::permission_denied(message),
        io::ErrorKind::ConnectionRefused
        | io::ErrorKind::ConnectionReset
        | io::ErrorKind::ConnectionAborted
        | io::ErrorKind::HostUnreachable => DnsError::server_unreachable(message),
        io::ErrorKind::NetworkUnreachable
        | io::ErrorKind::NetworkDown
        | io::ErrorKind::AddrNotAvailable
        | io::ErrorKind::NotConnected => DnsError::network_unavailable(message),
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => DnsError::timeout(message),
        io::ErrorKind::Unsupported => DnsError::platform_unsupported(message),
        _ => DnsError::query_failed(message),
    }
}
