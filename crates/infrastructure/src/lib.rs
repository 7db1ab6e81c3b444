//! DNSChat Infrastructure Layer
//!
//! Wire codec, transports and the fallback engine behind `ChatTransportPort`.
pub mod dns;
