pub mod send_chat_message;

// Re-export use cases
pub use send_chat_message::SendChatMessageUseCase;
