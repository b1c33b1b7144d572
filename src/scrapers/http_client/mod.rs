//! HTTP document fetcher with per-host adaptive rate limiting.

mod user_agent;

pub use user_agent::{resolve_user_agent, USER_AGENT};

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::fetcher::{DocumentFetcher, FetchError};
use super::rate_limiter::{parse_retry_after, RateLimiter};

/// HTTP client used to fetch source pages.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    request_delay: Duration,
    rate_limiter: RateLimiter,
}

impl HttpClient {
    /// Create a new HTTP client.
    pub fn new(timeout: Duration, request_delay: Duration) -> Result<Self, FetchError> {
        Self::with_user_agent(timeout, request_delay, None)
    }

    /// Create a new HTTP client with custom user agent configuration.
    /// - None: Use default tracklist user agent
    /// - Some("impersonate"): Use random real browser user agent
    /// - Some(custom): Use custom user agent string
    pub fn with_user_agent(
        timeout: Duration,
        request_delay: Duration,
        user_agent_config: Option<&str>,
    ) -> Result<Self, FetchError> {
        let user_agent = resolve_user_agent(user_agent_config);
        let client = Client::builder()
            .user_agent(&user_agent)
            .timeout(timeout)
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self {
            client,
            request_delay,
            rate_limiter: RateLimiter::new(),
        })
    }

    /// Share a rate limiter with other clients (e.g. the catalog client).
    pub fn with_rate_limiter(mut self, rate_limiter: RateLimiter) -> Self {
        self.rate_limiter = rate_limiter;
        self
    }

    /// Get the rate limiter for this client.
    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.rate_limiter
    }

    /// GET a page and return its body as text.
    /// Non-success statuses are errors; nothing is retried.
    pub async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        let host = self.rate_limiter.acquire(url).await;

        let start = Instant::now();
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if let Some(ref host) = host {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(parse_retry_after);
            self.rate_limiter
                .report_status(host, status.as_u16(), retry_after)
                .await;
        }

        debug!(
            "GET {} -> {} in {}ms",
            url,
            status.as_u16(),
            start.elapsed().as_millis()
        );

        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;

        // Base politeness delay (rate limiter handles additional adaptive delay)
        if !self.request_delay.is_zero() {
            tokio::time::sleep(self.request_delay).await;
        }

        Ok(body)
    }
}

#[async_trait]
impl DocumentFetcher for HttpClient {
    async fn fetch(&self, uri: &str) -> Result<String, FetchError> {
        self.get_text(uri).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> HttpClient {
        HttpClient::new(Duration::from_secs(5), Duration::ZERO).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_returns_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/charts")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body("<html><body>ok</body></html>")
            .create_async()
            .await;

        let body = client()
            .fetch(&format!("{}/charts", server.url()))
            .await
            .unwrap();

        assert!(body.contains("ok"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_non_success_status_is_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/missing")
            .with_status(404)
            .create_async()
            .await;

        let err = client()
            .fetch(&format!("{}/missing", server.url()))
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Status { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_rate_limit_response_backs_off() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/busy")
            .with_status(429)
            .create_async()
            .await;

        let client = client();
        let url = format!("{}/busy", server.url());
        assert!(client.fetch(&url).await.is_err());

        let stats = client.rate_limiter().get_stats().await;
        let host = RateLimiter::extract_host(&url).unwrap();
        assert!(stats[&host].in_backoff);
    }
}
