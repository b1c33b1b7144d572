//! Adaptive per-host rate limiter.
//!
//! Spaces out requests to the same host and adapts the spacing to responses:
//! backs off on 429/503 (honoring Retry-After), mildly on other 5xx, and
//! gradually recovers on success. It never retries a request itself.

mod config;
mod domain_state;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use url::Url;

pub use config::{HostStats, RateLimitConfig};
use domain_state::HostState;

/// Adaptive rate limiter that tracks per-host request timing.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    config: Arc<RateLimitConfig>,
    hosts: Arc<RwLock<HashMap<String, HostState>>>,
}

impl RateLimiter {
    /// Create a new rate limiter with default config.
    pub fn new() -> Self {
        Self::with_config(RateLimitConfig::default())
    }

    /// Create a new rate limiter with custom config.
    pub fn with_config(config: RateLimitConfig) -> Self {
        Self {
            config: Arc::new(config),
            hosts: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Extract host from URL.
    pub fn extract_host(url: &str) -> Option<String> {
        Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(|s| s.to_string()))
    }

    /// Wait until the host is ready, then mark a request as started.
    pub async fn acquire(&self, url: &str) -> Option<String> {
        let host = Self::extract_host(url)?;

        let wait_time = {
            let hosts = self.hosts.read().await;
            hosts
                .get(&host)
                .map(|s| s.time_until_ready())
                .unwrap_or(Duration::ZERO)
        };

        if wait_time > Duration::ZERO {
            debug!("Rate limiting {}: waiting {:?}", host, wait_time);
            tokio::time::sleep(wait_time).await;
        }

        {
            let mut hosts = self.hosts.write().await;
            let state = hosts
                .entry(host.clone())
                .or_insert_with(|| HostState::new(self.config.base_delay_for(&host)));
            state.last_request = Some(Instant::now());
            state.retry_after = None;
            state.total_requests += 1;
        }

        Some(host)
    }

    /// Feed a response status back into the limiter.
    pub async fn report_status(&self, host: &str, status: u16, retry_after: Option<Duration>) {
        match status {
            429 | 503 => self.report_rate_limit(host, status, retry_after).await,
            500..=599 => self.report_server_error(host).await,
            200..=399 => self.report_success(host).await,
            _ => {}
        }
    }

    /// Report a successful request - may decrease delay.
    pub async fn report_success(&self, host: &str) {
        let mut hosts = self.hosts.write().await;
        let Some(state) = hosts.get_mut(host) else {
            return;
        };
        state.consecutive_successes += 1;

        if state.in_backoff && state.consecutive_successes >= self.config.recovery_threshold {
            let reduced = Duration::from_secs_f64(
                state.current_delay.as_secs_f64() * self.config.recovery_multiplier,
            );
            state.current_delay = reduced.max(self.config.min_delay);

            if state.current_delay <= state.base_delay {
                state.in_backoff = false;
                state.current_delay = state.base_delay;
                info!("{} recovered from rate limit backoff", host);
            } else {
                debug!("{} delay reduced to {:?}", host, state.current_delay);
            }

            state.consecutive_successes = 0;
        }
    }

    /// Report a definite rate limit hit (429 or 503) - increases delay.
    pub async fn report_rate_limit(&self, host: &str, status: u16, retry_after: Option<Duration>) {
        let mut hosts = self.hosts.write().await;
        let Some(state) = hosts.get_mut(host) else {
            return;
        };
        state.rate_limit_hits += 1;
        state.in_backoff = true;
        state.back_off(self.config.backoff_multiplier, self.config.max_delay);
        if let Some(wait) = retry_after {
            state.retry_after = Some(Instant::now() + wait.min(self.config.max_delay));
        }

        warn!(
            "Rate limited by {} (HTTP {}), backing off to {:?}",
            host, status, state.current_delay
        );
    }

    /// Report a server error (5xx other than 503) - mild backoff.
    pub async fn report_server_error(&self, host: &str) {
        let mut hosts = self.hosts.write().await;
        if let Some(state) = hosts.get_mut(host) {
            state.back_off(1.5, self.config.max_delay);
            debug!(
                "Server error for {}, delay increased to {:?}",
                host, state.current_delay
            );
        }
    }

    /// Get statistics for all hosts.
    pub async fn get_stats(&self) -> HashMap<String, HostStats> {
        let hosts = self.hosts.read().await;
        hosts
            .iter()
            .map(|(k, v)| {
                (
                    k.clone(),
                    HostStats {
                        current_delay: v.current_delay,
                        in_backoff: v.in_backoff,
                        total_requests: v.total_requests,
                        rate_limit_hits: v.rate_limit_hits,
                    },
                )
            })
            .collect()
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a Retry-After header given in seconds.
pub fn parse_retry_after(value: &str) -> Option<Duration> {
    value.trim().parse::<u64>().ok().map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_host() {
        assert_eq!(
            RateLimiter::extract_host("https://www.last.fm/music/Low"),
            Some("www.last.fm".to_string())
        );
        assert_eq!(RateLimiter::extract_host("not a url"), None);
    }

    #[tokio::test]
    async fn test_backoff_on_rate_limit() {
        let limiter = RateLimiter::with_config(RateLimitConfig {
            base_delay: Duration::from_millis(100),
            backoff_multiplier: 2.0,
            ..Default::default()
        });

        limiter.acquire("https://api.spotify.com/v1/search").await;
        limiter.report_status("api.spotify.com", 429, None).await;

        let stats = limiter.get_stats().await;
        let host = stats.get("api.spotify.com").unwrap();
        assert!(host.current_delay >= Duration::from_millis(200));
        assert!(host.in_backoff);
        assert_eq!(host.rate_limit_hits, 1);
    }

    #[tokio::test]
    async fn test_recovery_after_successes() {
        let limiter = RateLimiter::with_config(RateLimitConfig {
            base_delay: Duration::from_millis(0),
            min_delay: Duration::from_millis(0),
            recovery_threshold: 2,
            recovery_multiplier: 0.0,
            ..Default::default()
        });

        limiter.acquire("https://example.com/a").await;
        limiter.report_status("example.com", 503, None).await;
        limiter.report_status("example.com", 200, None).await;
        limiter.report_status("example.com", 200, None).await;

        let stats = limiter.get_stats().await;
        assert!(!stats["example.com"].in_backoff);
    }

    #[test]
    fn test_host_delay_override() {
        let mut config = RateLimitConfig::default();
        config
            .host_delays
            .insert("rateyourmusic.com".to_string(), Duration::from_secs(3));
        assert_eq!(
            config.base_delay_for("www.rateyourmusic.com"),
            Duration::from_secs(3)
        );
        assert_eq!(config.base_delay_for("last.fm"), config.base_delay);
    }

    #[test]
    fn test_parse_retry_after() {
        assert_eq!(parse_retry_after(" 7 "), Some(Duration::from_secs(7)));
        assert_eq!(parse_retry_after("Wed, 21 Oct 2015 07:28:00 GMT"), None);
    }
}
