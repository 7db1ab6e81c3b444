pub mod errors;
pub mod logging;
pub mod rate_limit;
pub mod root;
pub mod server;
pub mod transport;

pub use errors::ConfigError;
pub use logging::LoggingConfig;
pub use rate_limit::RateLimitConfig;
pub use root::{CliOverrides, Config};
pub use server::{normalize_server_host, ServerEntry, ServerRegistry};
pub use transport::{LabelMode, TransportConfig};
