use dnschat_application::SendChatMessageUseCase;
use dnschat_domain::Config;
use dnschat_infrastructure::dns::DnsChatClient;
use std::sync::Arc;

pub struct ChatServices {
    pub client: Arc<DnsChatClient>,
    pub send_message: Arc<SendChatMessageUseCase>,
}

impl ChatServices {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let client = Arc::new(DnsChatClient::from_config(config)?);
        let send_message = Arc::new(SendChatMessageUseCase::new(client.clone()));
        Ok(Self {
            client,
            send_message,
        })
    }
}
