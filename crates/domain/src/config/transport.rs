use crate::TransportKind;
use serde::{Deserialize, Serialize};

/// How a chat message is turned into a query name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelMode {
    /// Message and conversation id are segmented into as many 63-byte labels as needed.
    #[default]
    Chunked,
    /// Legacy single-label encoding: the message is cut to 63 bytes and anything beyond is lost.
    SingleLabel,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TransportConfig {
    /// Transports to try, in order.
    #[serde(default = "default_allowed_transports")]
    pub allowed_transports: Vec<TransportKind>,

    /// Budget for a single transport attempt.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_doh_url")]
    pub doh_url: String,

    #[serde(default)]
    pub label_mode: LabelMode,

    /// Tries per transport when the server answers without TXT data.
    #[serde(default = "default_empty_answer_attempts")]
    pub empty_answer_attempts: u32,

    /// Pause before the first re-ask; doubled for each one after.
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            allowed_transports: default_allowed_transports(),
            timeout_ms: default_timeout_ms(),
            port: default_port(),
            doh_url: default_doh_url(),
            label_mode: LabelMode::default(),
            empty_answer_attempts: default_empty_answer_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

impl TransportConfig {
    /// Allowed transports with duplicates removed, keeping first occurrence.
    pub fn ordered_transports(&self) -> Vec<TransportKind> {
        let mut ordered = Vec::with_capacity(self.allowed_transports.len());
        for kind in &self.allowed_transports {
            if !ordered.contains(kind) {
                ordered.push(*kind);
            }
        }
        ordered
    }
}

fn default_allowed_transports() -> Vec<TransportKind> {
    TransportKind::PRIORITY.to_vec()
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_empty_answer_attempts() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    200
}

fn default_port() -> u16 {
    53
}

fn default_doh_url() -> String {
    "https://cloudflare-dns.com/dns-query".to_string()
}
