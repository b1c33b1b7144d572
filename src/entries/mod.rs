//! Catalog entries: references to artists, albums and tracks that resolve
//! lazily into tracks.

mod album;
mod artist;
mod identity;
mod track;

pub use album::{album_order, AlbumEntry};
pub use artist::ArtistEntry;
pub use identity::{looks_like_catalog_id, HasCatalogId, Identity};
pub use track::TrackEntry;

use thiserror::Error;

use crate::catalog::{Catalog, CatalogError, Track};
use crate::protocol::SeedEntry;
use crate::queue::Queue;

/// Why an entry could not be resolved. Both variants carry the reference of
/// the entry (or sub-entry) that failed.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("no catalog match for {reference:?}")]
    NotFound { reference: String },

    #[error("catalog error while resolving {reference:?}: {source}")]
    Catalog {
        reference: String,
        #[source]
        source: CatalogError,
    },
}

impl ResolveError {
    pub(crate) fn not_found(reference: &str) -> Self {
        Self::NotFound {
            reference: reference.to_string(),
        }
    }

    pub(crate) fn catalog(reference: &str, source: CatalogError) -> Self {
        Self::Catalog {
            reference: reference.to_string(),
            source,
        }
    }

    /// Not-found failures may be skipped; everything else should abort.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn reference(&self) -> &str {
        match self {
            Self::NotFound { reference } | Self::Catalog { reference, .. } => reference,
        }
    }
}

/// A top-level entry parsed from the protocol.
#[derive(Debug, Clone)]
pub enum Entry {
    Artist(ArtistEntry),
    Album(AlbumEntry),
    Track(TrackEntry),
}

impl Entry {
    /// Build an entry from a parsed line. `#top` artists are limited to
    /// `top_tracks` tracks.
    pub fn from_seed(seed: SeedEntry, top_tracks: usize) -> Self {
        match seed {
            SeedEntry::Track { reference } => Self::Track(TrackEntry::new(reference)),
            SeedEntry::Album { reference } => Self::Album(AlbumEntry::new(reference)),
            SeedEntry::Artist { reference, top } => {
                let limit = top.then_some(top_tracks);
                Self::Artist(ArtistEntry::new(reference).with_limit(limit))
            }
        }
    }

    pub fn reference(&self) -> &str {
        match self {
            Self::Artist(e) => e.reference(),
            Self::Album(e) => e.reference(),
            Self::Track(e) => e.reference(),
        }
    }

    pub async fn resolve_identity(&mut self, catalog: &dyn Catalog) -> Result<&str, ResolveError> {
        match self {
            Self::Artist(e) => e.resolve_identity(catalog).await,
            Self::Album(e) => e.resolve_identity(catalog).await,
            Self::Track(e) => e.resolve_identity(catalog).await,
        }
    }

    /// Expand the entry into its tracks.
    pub async fn dispatch(&mut self, catalog: &dyn Catalog) -> Result<Queue<Track>, ResolveError> {
        match self {
            Self::Artist(e) => e.dispatch(catalog).await,
            Self::Album(e) => e.dispatch(catalog).await,
            Self::Track(e) => e.dispatch(catalog).await,
        }
    }
}
