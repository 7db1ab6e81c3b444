pub mod chat_client;
pub mod forwarding;
pub mod label_codec;
pub mod orchestrator;
pub mod rate_limiter;
pub mod resume_gate;
pub mod transport;

pub use chat_client::DnsChatClient;
pub use forwarding::{MessageBuilder, Reassembler, ResponseParser};
pub use orchestrator::{QueryOutcome, TransportOrchestrator};
pub use rate_limiter::RateLimiter;
pub use resume_gate::{AttemptSettler, ResumeGate};
pub use transport::{DefaultTransportFactory, TransportFactory, TxtLookup};
