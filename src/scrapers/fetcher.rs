//! Document fetching abstraction used by the crawler.

use async_trait::async_trait;
use thiserror::Error;

/// Errors raised while fetching a document.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Source of raw document text for a URI.
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    /// Fetch the document at `uri`, failing on network errors or non-success status.
    async fn fetch(&self, uri: &str) -> Result<String, FetchError>;
}
