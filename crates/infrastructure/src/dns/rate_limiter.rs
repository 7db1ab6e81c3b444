use dnschat_domain::RateLimitConfig;
use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};
use tracing::debug;

/// Sliding-window admission control for outgoing queries.
///
/// The window is the only state shared between concurrent queries.
#[derive(Debug)]
pub struct RateLimiter {
    max_queries: usize,
    window: Duration,
    admitted: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    pub fn new(max_queries: usize, window: Duration) -> Self {
        Self {
            max_queries,
            window,
            admitted: Mutex::new(VecDeque::with_capacity(max_queries)),
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(config.max_queries, Duration::from_secs(config.window_secs))
    }

    pub fn admit(&self) -> bool {
        self.admit_at(Instant::now())
    }

    /// Admits a query issued at `now`, recording it if the window has room.
    pub fn admit_at(&self, now: Instant) -> bool {
        let mut admitted = self
            .admitted
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        while let Some(&oldest) = admitted.front() {
            if now.saturating_duration_since(oldest) >= self.window {
                admitted.pop_front();
            } else {
                break;
            }
        }

        if admitted.len() >= self.max_queries {
            debug!(
                in_window = admitted.len(),
                max_queries = self.max_queries,
                "Rate limit reached"
            );
            return false;
        }

        admitted.push_back(now);
        true
    }

    pub fn max_queries(&self) -> usize {
        self.max_queries
    }

    pub fn window(&self) -> Duration {
        self.window
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::from_config(&RateLimitConfig::default())
    }
}
