use async_trait::async_trait;
use dnschat_domain::{ChatReply, DnsError};

/// Sends one chat message over DNS and returns the reassembled reply.
#[async_trait]
pub trait ChatTransportPort: Send + Sync {
    async fn send(
        &self,
        message: &str,
        conversation_id: &str,
        server: Option<&str>,
    ) -> Result<ChatReply, DnsError>;
}
