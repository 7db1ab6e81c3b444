use crate::DnsError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// One permitted resolver host.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ServerEntry {
    pub host: String,

    /// Human-readable name shown by the UI.
    pub label: String,

    #[serde(default)]
    pub default: bool,

    /// Whether the DoH relay may carry queries meant for this host.
    #[serde(default = "default_true")]
    pub doh: bool,
}

impl ServerEntry {
    pub fn new(host: &str, label: &str) -> Self {
        Self {
            host: host.to_string(),
            label: label.to_string(),
            default: false,
            doh: true,
        }
    }

    fn as_default(mut self) -> Self {
        self.default = true;
        self
    }

    fn without_doh(mut self) -> Self {
        self.doh = false;
        self
    }
}

fn default_true() -> bool {
    true
}

pub(crate) fn default_servers() -> Vec<ServerEntry> {
    vec![
        ServerEntry::new("ch.at", "ch.at (default)")
            .as_default()
            .without_doh(),
        ServerEntry::new("llm.pieter.com", "llm.pieter.com"),
        ServerEntry::new("8.8.8.8", "Google DNS"),
        ServerEntry::new("8.8.4.4", "Google DNS (secondary)"),
        ServerEntry::new("1.1.1.1", "Cloudflare DNS"),
        ServerEntry::new("1.0.0.1", "Cloudflare DNS (secondary)"),
    ]
}

/// Lower-cases, trims and strips trailing dots from a server host.
pub fn normalize_server_host(host: &str) -> Result<String, DnsError> {
    let normalized = host.trim().to_ascii_lowercase();
    let normalized = normalized.trim_end_matches('.');
    if normalized.is_empty() {
        return Err(DnsError::query_failed("DNS server cannot be empty"));
    }
    Ok(normalized.to_string())
}

/// Immutable allow-list of resolver hosts, loaded once at startup.
#[derive(Debug, Clone)]
pub struct ServerRegistry {
    entries: Arc<[ServerEntry]>,
}

impl ServerRegistry {
    /// Builds a registry; hosts are normalised, exactly one entry must be the default.
    pub fn new(entries: Vec<ServerEntry>) -> Result<Self, DnsError> {
        if entries.is_empty() {
            return Err(DnsError::query_failed("Server registry cannot be empty"));
        }

        let mut normalized: Vec<ServerEntry> = Vec::with_capacity(entries.len());
        for mut entry in entries {
            entry.host = normalize_server_host(&entry.host)?;
            if normalized.iter().any(|e| e.host == entry.host) {
                return Err(DnsError::query_failed(format!(
                    "Duplicate server in registry: {}",
                    entry.host
                )));
            }
            normalized.push(entry);
        }

        let defaults = normalized.iter().filter(|e| e.default).count();
        if defaults != 1 {
            return Err(DnsError::query_failed(format!(
                "Server registry must mark exactly one default, found {}",
                defaults
            )));
        }

        Ok(Self {
            entries: normalized.into(),
        })
    }

    pub fn entries(&self) -> &[ServerEntry] {
        &self.entries
    }

    pub fn default_entry(&self) -> &ServerEntry {
        // `new` guarantees exactly one default.
        self.entries
            .iter()
            .find(|e| e.default)
            .unwrap_or(&self.entries[0])
    }

    /// Returns the registry entry for `host`, refusing anything outside the allow-list.
    pub fn resolve(&self, host: Option<&str>) -> Result<&ServerEntry, DnsError> {
        let Some(host) = host else {
            return Ok(self.default_entry());
        };
        let normalized = normalize_server_host(host)?;
        self.entries
            .iter()
            .find(|e| e.host == normalized)
            .ok_or_else(|| DnsError::query_failed(format!("DNS server not allowed: {}", normalized)))
    }

    pub fn is_allowed(&self, host: &str) -> bool {
        self.resolve(Some(host)).is_ok()
    }
}

impl Default for ServerRegistry {
    fn default() -> Self {
        Self {
            entries: default_servers().into(),
        }
    }
}
