//! Per-source extraction strategies plugged into the crawler.

mod bbc;
mod lastfm;
mod pitchfork;
mod rateyourmusic;
mod reddit;
mod webpage;
mod youtube;

pub use bbc::Bbc;
pub use lastfm::Lastfm;
pub use pitchfork::Pitchfork;
pub use rateyourmusic::RateYourMusic;
pub use reddit::Reddit;
pub use webpage::Webpage;
pub use youtube::YouTube;

use scraper::Html;
use url::Url;

use crate::protocol::IntermediateLine;

/// What one fetched page contributes to a crawl.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageExtract {
    /// Lines in document order.
    pub lines: Vec<IntermediateLine>,
    /// Linear "next page" link, possibly relative.
    pub next: Option<String>,
    /// Branching work (similar items, drill-down pages), possibly relative.
    pub follow_ups: Vec<String>,
}

impl PageExtract {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty() && self.next.is_none() && self.follow_ups.is_empty()
    }
}

/// Source-specific page extraction.
pub trait ExtractionStrategy: Send + Sync {
    /// Short identifier used in logs and the `sources` command.
    fn name(&self) -> &'static str;

    /// Hosts this strategy is registered for.
    fn hosts(&self) -> &'static [&'static str];

    /// Whether the strategy handles pages from `host`.
    fn matches_host(&self, host: &str) -> bool {
        host_matches(host, self.hosts())
    }

    /// Extract lines and follow-up links from a parsed page.
    fn extract_page(&self, document: &Html, page_url: &Url) -> PageExtract;
}

/// Exact or subdomain match against a host table.
pub fn host_matches(host: &str, hosts: &[&str]) -> bool {
    let host = host.trim_end_matches('.').to_ascii_lowercase();
    hosts
        .iter()
        .any(|known| host == *known || host.ends_with(&format!(".{}", known)))
}
