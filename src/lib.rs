//! tracklist - turn music web pages and references into resolved playlists.
//!
//! Pages are crawled by per-source extraction strategies into a line-oriented
//! intermediate protocol, which is parsed into catalog entries (artists,
//! albums, tracks) and resolved against the Spotify catalog into an ordered
//! queue of tracks.

pub mod catalog;
pub mod cli;
pub mod config;
pub mod entries;
pub mod pipeline;
pub mod protocol;
pub mod queue;
pub mod scrapers;

pub use catalog::{Catalog, CatalogError, SpotifyClient, Track};
pub use entries::{Entry, ResolveError};
pub use pipeline::{Pipeline, PipelineError, PipelineObserver, ResolveOptions};
pub use protocol::IntermediateLine;
pub use queue::Queue;
pub use scrapers::{CrawlError, DocumentFetcher, FetchError, HttpClient, SourceReference};
