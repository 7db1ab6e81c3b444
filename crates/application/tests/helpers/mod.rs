pub mod mock_chat_transport;

pub use mock_chat_transport::{MockChatTransport, RecordedCall};
