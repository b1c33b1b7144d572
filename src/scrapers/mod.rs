//! Source extraction: fetching pages and normalizing them into protocol lines.

pub mod crawler;
pub mod extract;
mod fetcher;
mod http_client;
pub mod rate_limiter;
pub mod registry;
pub mod strategies;

pub use crawler::{CrawlError, Crawler, SourceReference};
pub use fetcher::{DocumentFetcher, FetchError};
pub use http_client::{resolve_user_agent, HttpClient, USER_AGENT};
pub use rate_limiter::{RateLimitConfig, RateLimiter};
pub use registry::select_strategy;
pub use strategies::{ExtractionStrategy, PageExtract};
