//! Paginating crawler shared by every extraction strategy.
//!
//! The start page and its linear "next" chain are bounded by the page
//! budget. Follow-up links (similar items, drill-down pages) go onto a FIFO
//! work queue that is drained completely; those pages contribute lines and
//! further follow-ups but never paginate. Every URI is fetched at most once.

use std::collections::{HashSet, VecDeque};

use scraper::Html;
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

use super::fetcher::{DocumentFetcher, FetchError};
use super::strategies::{ExtractionStrategy, PageExtract};
use crate::pipeline::PipelineObserver;
use crate::protocol::{render, IntermediateLine};

/// Errors that abort a crawl. No partial buffer survives them.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("failed to fetch {uri}: {source}")]
    Fetch {
        uri: String,
        #[source]
        source: FetchError,
    },

    #[error("invalid link {link:?} relative to {base}: {source}")]
    InvalidUri {
        link: String,
        base: String,
        #[source]
        source: url::ParseError,
    },
}

/// A URI to crawl and how many pages of it to follow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceReference {
    uri: Url,
    page_budget: u32,
}

impl SourceReference {
    /// A budget of 0 still fetches the start page.
    pub fn new(uri: &str, page_budget: u32) -> Result<Self, url::ParseError> {
        Ok(Self {
            uri: Url::parse(uri)?,
            page_budget: page_budget.max(1),
        })
    }

    pub fn uri(&self) -> &Url {
        &self.uri
    }

    pub fn page_budget(&self) -> u32 {
        self.page_budget
    }
}

/// Resolve a (possibly relative) link against the source URI.
fn resolve(origin: &Url, link: &str) -> Result<Url, CrawlError> {
    origin.join(link).map_err(|source| CrawlError::InvalidUri {
        link: link.to_string(),
        base: origin.to_string(),
        source,
    })
}

/// Drives fetch, extract and recurse for one strategy at a time.
pub struct Crawler<'a> {
    fetcher: &'a dyn DocumentFetcher,
    observer: &'a dyn PipelineObserver,
}

impl<'a> Crawler<'a> {
    pub fn new(fetcher: &'a dyn DocumentFetcher, observer: &'a dyn PipelineObserver) -> Self {
        Self { fetcher, observer }
    }

    /// Crawl and return the rendered protocol buffer.
    pub async fn crawl(
        &self,
        strategy: &dyn ExtractionStrategy,
        source: &SourceReference,
    ) -> Result<String, CrawlError> {
        let lines = self.crawl_lines(strategy, source).await?;
        Ok(render(&lines))
    }

    /// Crawl and return the extracted lines in document order.
    pub async fn crawl_lines(
        &self,
        strategy: &dyn ExtractionStrategy,
        source: &SourceReference,
    ) -> Result<Vec<IntermediateLine>, CrawlError> {
        let origin = source.uri();
        let mut lines: Vec<IntermediateLine> = Vec::new();
        let mut visited: HashSet<String> = HashSet::new();
        let mut work: VecDeque<Url> = VecDeque::new();
        let mut budget = source.page_budget();
        let mut pages = 0u32;

        info!(
            "Crawling {} with {} (page budget {})",
            origin,
            strategy.name(),
            budget
        );

        let mut current = Some(origin.clone());
        while let Some(uri) = current.take() {
            if !visited.insert(uri.to_string()) {
                break;
            }
            let page = self.visit(strategy, &uri).await?;
            pages += 1;
            lines.extend(page.lines);
            for link in &page.follow_ups {
                work.push_back(resolve(origin, link)?);
            }

            if budget > 1 {
                if let Some(next) = page.next {
                    budget -= 1;
                    current = Some(resolve(origin, &next)?);
                }
            }
        }

        while let Some(uri) = work.pop_front() {
            if !visited.insert(uri.to_string()) {
                continue;
            }
            let page = self.visit(strategy, &uri).await?;
            pages += 1;
            lines.extend(page.lines);
            for link in &page.follow_ups {
                work.push_back(resolve(origin, link)?);
            }
        }

        info!(
            "Crawl of {} complete: {} pages, {} lines",
            origin,
            pages,
            lines.len()
        );
        Ok(lines)
    }

    /// Fetch one page and run the strategy over it.
    async fn visit(
        &self,
        strategy: &dyn ExtractionStrategy,
        uri: &Url,
    ) -> Result<PageExtract, CrawlError> {
        let body = self
            .fetcher
            .fetch(uri.as_str())
            .await
            .map_err(|source| CrawlError::Fetch {
                uri: uri.to_string(),
                source,
            })?;

        let page = {
            let document = Html::parse_document(&body);
            strategy.extract_page(&document, uri)
        };

        debug!(
            "{}: {} lines, next={:?}, {} follow-ups",
            uri,
            page.lines.len(),
            page.next,
            page.follow_ups.len()
        );
        self.observer.page_extracted(uri.as_str(), &page.lines);
        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_reference_budget_floor() {
        let source = SourceReference::new("https://www.last.fm/music/Low", 0).unwrap();
        assert_eq!(source.page_budget(), 1);
        assert!(SourceReference::new("not a uri", 2).is_err());
    }

    #[test]
    fn test_resolve_relative_against_origin() {
        let origin = Url::parse("https://pitchfork.com/reviews/best/tracks/").unwrap();
        assert_eq!(
            resolve(&origin, "?page=2").unwrap().as_str(),
            "https://pitchfork.com/reviews/best/tracks/?page=2"
        );
        assert_eq!(
            resolve(&origin, "https://www.last.fm/x").unwrap().as_str(),
            "https://www.last.fm/x"
        );
    }
}
