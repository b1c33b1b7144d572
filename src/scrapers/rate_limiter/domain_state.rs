//! Per-host rate limiting state.

use std::time::{Duration, Instant};

/// State for a single host.
#[derive(Debug, Clone)]
pub struct HostState {
    /// Delay this host settles back to after a backoff.
    pub base_delay: Duration,
    /// Current delay for this host.
    pub current_delay: Duration,
    /// Last request time.
    pub last_request: Option<Instant>,
    /// Earliest instant the server allowed us back (from Retry-After).
    pub retry_after: Option<Instant>,
    /// Consecutive successes since last rate limit.
    pub consecutive_successes: u32,
    /// Whether currently in backoff.
    pub in_backoff: bool,
    /// Total requests made.
    pub total_requests: u64,
    /// Total rate limit hits.
    pub rate_limit_hits: u64,
}

impl HostState {
    pub fn new(base_delay: Duration) -> Self {
        Self {
            base_delay,
            current_delay: base_delay,
            last_request: None,
            retry_after: None,
            consecutive_successes: 0,
            in_backoff: false,
            total_requests: 0,
            rate_limit_hits: 0,
        }
    }

    /// Multiply the current delay, capped at `max`.
    pub fn back_off(&mut self, multiplier: f64, max: Duration) {
        let next = Duration::from_secs_f64(self.current_delay.as_secs_f64() * multiplier);
        self.current_delay = next.min(max);
        self.consecutive_successes = 0;
    }

    /// Time until this host is ready for another request.
    pub fn time_until_ready(&self) -> Duration {
        let now = Instant::now();
        let by_delay = match self.last_request {
            Some(last) => self.current_delay.saturating_sub(last.elapsed()),
            None => Duration::ZERO,
        };
        let by_server = self
            .retry_after
            .map(|at| at.saturating_duration_since(now))
            .unwrap_or(Duration::ZERO);
        by_delay.max(by_server)
    }
}
