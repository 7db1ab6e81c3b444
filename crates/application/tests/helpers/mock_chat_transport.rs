#![allow(dead_code)]

use async_trait::async_trait;
use dnschat_application::ports::ChatTransportPort;
use dnschat_domain::{ChatReply, DnsError};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub message: String,
    pub conversation_id: String,
    pub server: Option<String>,
}

#[derive(Clone)]
pub struct MockChatTransport {
    response: Arc<Mutex<Result<String, DnsError>>>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl MockChatTransport {
    pub fn replying(text: &str) -> Self {
        Self {
            response: Arc::new(Mutex::new(Ok(text.to_string()))),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing(error: DnsError) -> Self {
        Self {
            response: Arc::new(Mutex::new(Err(error))),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatTransportPort for MockChatTransport {
    async fn send(
        &self,
        message: &str,
        conversation_id: &str,
        server: Option<&str>,
    ) -> Result<ChatReply, DnsError> {
        self.calls.lock().unwrap().push(RecordedCall {
            message: message.to_string(),
            conversation_id: conversation_id.to_string(),
            server: server.map(str::to_string),
        });
        let server: Arc<str> = server.unwrap_or("ch.at").into();
        self.response
            .lock()
            .unwrap()
            .clone()
            .map(|text| ChatReply { text, server })
    }
}
