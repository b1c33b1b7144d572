//! Rate limiter tuning.

use std::collections::HashMap;
use std::time::Duration;

/// Configuration for rate limiting behavior.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Base delay between requests to the same host.
    pub base_delay: Duration,
    /// Minimum delay (floor).
    pub min_delay: Duration,
    /// Maximum delay (ceiling for backoff).
    pub max_delay: Duration,
    /// Multiplier for exponential backoff on rate limit.
    pub backoff_multiplier: f64,
    /// Multiplier for recovery on success (< 1.0 to decrease delay).
    pub recovery_multiplier: f64,
    /// Number of consecutive successes before reducing delay.
    pub recovery_threshold: u32,
    /// Per-host base delay overrides (e.g. a stricter floor for rateyourmusic.com).
    pub host_delays: HashMap<String, Duration>,
}

impl RateLimitConfig {
    /// Base delay for a host, honoring per-host overrides.
    pub fn base_delay_for(&self, host: &str) -> Duration {
        self.host_delays
            .iter()
            .find(|(suffix, _)| host == suffix.as_str() || host.ends_with(&format!(".{}", suffix)))
            .map(|(_, delay)| *delay)
            .unwrap_or(self.base_delay)
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_millis(250),
            min_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(60),
            backoff_multiplier: 2.0,
            recovery_multiplier: 0.8,
            recovery_threshold: 5,
            host_delays: HashMap::new(),
        }
    }
}

/// Snapshot of a host's limiter state.
#[derive(Debug, Clone)]
pub struct HostStats {
    pub current_delay: Duration,
    pub in_backoff: bool,
    pub total_requests: u64,
    pub rate_limit_hits: u64,
}
