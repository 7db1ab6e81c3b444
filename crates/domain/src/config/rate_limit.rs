use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_max_queries")]
    pub max_queries: usize,

    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_queries: default_max_queries(),
            window_secs: default_window_secs(),
        }
    }
}

fn default_max_queries() -> usize {
    60
}

fn default_window_secs() -> u64 {
    60
}
