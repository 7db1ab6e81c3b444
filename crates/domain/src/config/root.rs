use serde::{Deserialize, Serialize};

use super::errors::ConfigError;
use super::logging::LoggingConfig;
use super::rate_limit::RateLimitConfig;
use super::server::{default_servers, ServerEntry, ServerRegistry};
use super::transport::TransportConfig;
use crate::TransportKind;

/// Main configuration structure for DNSChat
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Permitted resolver hosts
    #[serde(default = "default_servers")]
    pub servers: Vec<ServerEntry>,

    /// Transport selection, timeouts and query-name encoding
    #[serde(default)]
    pub transport: TransportConfig,

    /// Outgoing query budget
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            servers: default_servers(),
            transport: TransportConfig::default(),
            rate_limit: RateLimitConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file or use defaults
    ///
    /// Priority order:
    /// 1. Explicitly provided path
    /// 2. dnschat.toml in current directory
    /// 3. /etc/dnschat/config.toml
    /// 4. Default configuration
    pub fn load(path: Option<&str>, cli_overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = path {
            Self::from_file(path)?
        } else if std::path::Path::new("dnschat.toml").exists() {
            Self::from_file("dnschat.toml")?
        } else if std::path::Path::new("/etc/dnschat/config.toml").exists() {
            Self::from_file("/etc/dnschat/config.toml")?
        } else {
            Self::default()
        };

        config.apply_cli_overrides(cli_overrides);
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.to_string(), e.to_string()))?;
        toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Apply command-line overrides to configuration
    fn apply_cli_overrides(&mut self, overrides: CliOverrides) {
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
        if let Some(timeout_ms) = overrides.timeout_ms {
            self.transport.timeout_ms = timeout_ms;
        }
        if let Some(transports) = overrides.transports {
            self.transport.allowed_transports = transports;
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.transport.allowed_transports.is_empty() {
            return Err(ConfigError::Validation(
                "At least one transport must be allowed".to_string(),
            ));
        }

        if self.transport.timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "Transport timeout cannot be 0".to_string(),
            ));
        }

        if self.transport.empty_answer_attempts == 0 {
            return Err(ConfigError::Validation(
                "Each transport needs at least one attempt".to_string(),
            ));
        }

        if self.rate_limit.max_queries == 0 || self.rate_limit.window_secs == 0 {
            return Err(ConfigError::Validation(
                "Rate limit must allow at least one query per non-empty window".to_string(),
            ));
        }

        self.registry().map(|_| ())
    }

    /// Build the immutable server allow-list
    pub fn registry(&self) -> Result<ServerRegistry, ConfigError> {
        ServerRegistry::new(self.servers.clone())
            .map_err(|e| ConfigError::Validation(e.message))
    }
}

/// Command-line overrides for configuration
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub log_level: Option<String>,
    pub timeout_ms: Option<u64>,
    pub transports: Option<Vec<TransportKind>>,
}
