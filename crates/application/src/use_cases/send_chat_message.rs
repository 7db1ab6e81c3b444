use crate::ports::ChatTransportPort;
use dnschat_domain::{ChatReply, ChatRequest, DnsError};
use std::sync::Arc;
use tracing::debug;

pub struct SendChatMessageUseCase {
    transport: Arc<dyn ChatTransportPort>,
}

impl SendChatMessageUseCase {
    pub fn new(transport: Arc<dyn ChatTransportPort>) -> Self {
        Self { transport }
    }

    pub async fn execute(&self, request: &ChatRequest) -> Result<ChatReply, DnsError> {
        let message = request.message.trim();
        if message.is_empty() {
            return Err(DnsError::query_failed("Message cannot be empty"));
        }

        debug!(
            conversation = %request.conversation_id,
            server = ?request.server,
            message_len = message.len(),
            "Sending chat message"
        );

        self.transport
            .send(message, request.conversation_id.trim(), request.server.as_deref())
            .await
    }
}
