use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;

/// One concrete way of carrying a TXT query to the server.
///
/// Variants are declared in default fallback priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    Native,
    Udp,
    Tcp,
    Https,
}

impl TransportKind {
    pub const PRIORITY: [TransportKind; 4] = [
        TransportKind::Native,
        TransportKind::Udp,
        TransportKind::Tcp,
        TransportKind::Https,
    ];

    pub fn protocol_name(&self) -> &'static str {
        match self {
            TransportKind::Native => "NATIVE",
            TransportKind::Udp => "UDP",
            TransportKind::Tcp => "TCP",
            TransportKind::Https => "HTTPS",
        }
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.protocol_name())
    }
}

impl FromStr for TransportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "native" => Ok(TransportKind::Native),
            "udp" => Ok(TransportKind::Udp),
            "tcp" => Ok(TransportKind::Tcp),
            "https" | "doh" => Ok(TransportKind::Https),
            other => Err(format!(
                "Unknown transport '{}'. Expected one of: native, udp, tcp, https",
                other
            )),
        }
    }
}

/// Address of the server a query is sent to. Hostnames are resolved lazily by the transport.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ServerAddr {
    Resolved(SocketAddr),
    Unresolved { hostname: Arc<str>, port: u16 },
}

impl ServerAddr {
    /// Builds an address from a registry host and the configured DNS port.
    ///
    /// IP literals (including bracketed IPv6) resolve immediately; anything else is kept as a hostname.
    pub fn from_host(host: &str, port: u16) -> Self {
        let bare = host
            .strip_prefix('[')
            .and_then(|h| h.strip_suffix(']'))
            .unwrap_or(host);
        match bare.parse::<std::net::IpAddr>() {
            Ok(ip) => ServerAddr::Resolved(SocketAddr::new(ip, port)),
            Err(_) => ServerAddr::Unresolved {
                hostname: host.into(),
                port,
            },
        }
    }

    pub fn socket_addr(&self) -> Option<SocketAddr> {
        match self {
            ServerAddr::Resolved(addr) => Some(*addr),
            ServerAddr::Unresolved { .. } => None,
        }
    }
}

impl fmt::Display for ServerAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerAddr::Resolved(addr) => write!(f, "{}", addr),
            ServerAddr::Unresolved { hostname, port } => write!(f, "{}:{}", hostname, port),
        }
    }
}
