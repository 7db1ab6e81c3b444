mod chat_transport;

pub use chat_transport::ChatTransportPort;

// Re-export for convenience
pub use dnschat_domain::{ChatReply, ChatRequest, DnsError};
