//! Resolution orchestrator: source URI to intermediate buffer to tracks.

mod observer;

pub use observer::{NoopObserver, PipelineObserver, TracingObserver};

use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::catalog::{Catalog, Track};
use crate::entries::{Entry, ResolveError};
use crate::protocol::{self, Directive};
use crate::queue::Queue;
use crate::scrapers::{select_strategy, CrawlError, Crawler, DocumentFetcher, SourceReference};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid source URI {uri:?}: {source}")]
    InvalidSource {
        uri: String,
        #[source]
        source: url::ParseError,
    },

    #[error(transparent)]
    Crawl(#[from] CrawlError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

/// Knobs for a resolution run.
#[derive(Debug, Clone)]
pub struct ResolveOptions {
    /// Skip entries with no catalog match instead of failing the run.
    pub skip_not_found: bool,
    /// Track limit for `#top` artists.
    pub top_tracks: usize,
    /// Page budget when the caller gives none.
    pub default_pages: u32,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            skip_not_found: true,
            top_tracks: 5,
            default_pages: 1,
        }
    }
}

/// Entries and playlist directives parsed from a buffer.
#[derive(Debug, Default)]
pub struct Seeded {
    pub entries: Queue<Entry>,
    pub directives: Vec<Directive>,
}

/// Runs extraction and resolution against injected collaborators.
pub struct Pipeline {
    fetcher: Arc<dyn DocumentFetcher>,
    catalog: Arc<dyn Catalog>,
    observer: Arc<dyn PipelineObserver>,
    options: ResolveOptions,
}

impl Pipeline {
    pub fn new(fetcher: Arc<dyn DocumentFetcher>, catalog: Arc<dyn Catalog>) -> Self {
        Self {
            fetcher,
            catalog,
            observer: Arc::new(TracingObserver),
            options: ResolveOptions::default(),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn PipelineObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn with_options(mut self, options: ResolveOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &ResolveOptions {
        &self.options
    }

    /// Build a source reference, falling back to the default page budget.
    pub fn source(&self, uri: &str, pages: Option<u32>) -> Result<SourceReference, PipelineError> {
        let pages = pages.unwrap_or(self.options.default_pages);
        SourceReference::new(uri, pages).map_err(|source| PipelineError::InvalidSource {
            uri: uri.to_string(),
            source,
        })
    }

    /// Crawl a source into the intermediate protocol buffer.
    pub async fn extract(&self, source: &SourceReference) -> Result<String, CrawlError> {
        let strategy = select_strategy(source.uri());
        Crawler::new(self.fetcher.as_ref(), self.observer.as_ref())
            .crawl(strategy, source)
            .await
    }

    /// Parse a buffer into top-level entries.
    pub fn seed(&self, text: &str) -> Seeded {
        let seed = protocol::parse(text);
        Seeded {
            entries: seed
                .entries
                .into_iter()
                .map(|entry| Entry::from_seed(entry, self.options.top_tracks))
                .collect(),
            directives: seed.directives,
        }
    }

    /// Dispatch each entry in order and concatenate their tracks.
    pub async fn resolve(&self, entries: Queue<Entry>) -> Result<Queue<Track>, PipelineError> {
        let catalog = self.catalog.as_ref();
        let observer = self.observer.as_ref();
        let skip_not_found = self.options.skip_not_found;
        let total = entries.len();

        let resolved = entries
            .map_sequential(move |mut entry| async move {
                match entry.dispatch(catalog).await {
                    Ok(tracks) => {
                        observer.entry_resolved(entry.reference(), tracks.len());
                        Ok(tracks)
                    }
                    Err(err) if skip_not_found && err.is_not_found() => {
                        observer.entry_failed(entry.reference(), &err);
                        Ok(Queue::new())
                    }
                    Err(err) => Err(err),
                }
            })
            .await?;

        let tracks = resolved.flatten();
        info!("Resolved {} entries into {} tracks", total, tracks.len());
        Ok(tracks)
    }

    /// Apply playlist directives: uniqueness, then ordering, then shuffling.
    pub fn finish(&self, tracks: Queue<Track>, directives: &[Directive]) -> Queue<Track> {
        let mut tracks = tracks;
        if directives.contains(&Directive::Unique) {
            tracks = tracks.dedup_by_key(|t| t.id.clone());
        }
        if directives.contains(&Directive::OrderByPopularity) {
            tracks = tracks.sort_by(|a, b| {
                b.popularity.unwrap_or(0).cmp(&a.popularity.unwrap_or(0))
            });
        }
        if directives.contains(&Directive::Reverse) {
            tracks = tracks.reverse();
        }
        if directives.contains(&Directive::Shuffle) {
            tracks = tracks.shuffle();
        }
        tracks
    }

    /// Resolve protocol text (a buffer or hand-written references).
    pub async fn resolve_text(&self, text: &str) -> Result<Queue<Track>, PipelineError> {
        let Seeded {
            entries,
            directives,
        } = self.seed(text);
        let tracks = self.resolve(entries).await?;
        Ok(self.finish(tracks, &directives))
    }

    /// Crawl a source URI and resolve everything it lists.
    pub async fn extract_and_resolve(
        &self,
        uri: &str,
        pages: Option<u32>,
    ) -> Result<Queue<Track>, PipelineError> {
        let source = self.source(uri, pages)?;
        let buffer = self.extract(&source).await?;
        self.resolve_text(&buffer).await
    }
}
