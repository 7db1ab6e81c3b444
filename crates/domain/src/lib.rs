//! DNSChat Domain Layer
pub mod chat;
pub mod config;
pub mod dns_protocol;
pub mod dns_query;
pub mod errors;
pub mod transport_attempt;
pub mod txt_record;

pub use chat::{ChatReply, ChatRequest};
pub use config::{
    normalize_server_host, CliOverrides, Config, ConfigError, LabelMode, LoggingConfig,
    RateLimitConfig, ServerEntry, ServerRegistry, TransportConfig,
};
pub use dns_protocol::{ServerAddr, TransportKind};
pub use dns_query::{DnsQuery, QCLASS_IN, QTYPE_TXT};
pub use errors::{DnsError, DnsErrorKind};
pub use transport_attempt::{AttemptOutcome, TransportAttempt};
pub use txt_record::{ParsedFragmentId, TxtRecordFragment};
