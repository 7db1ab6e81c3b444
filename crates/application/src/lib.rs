//! DNSChat Application Layer
pub mod ports;
pub mod use_cases;

pub use ports::ChatTransportPort;
pub use use_cases::SendChatMessageUseCase;
