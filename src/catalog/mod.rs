//! Remote music catalog used to resolve references into tracks.

mod config;
mod models;
mod spotify;

pub use config::CatalogConfig;
pub use models::{
    AlbumType, ArtistCredit, CatalogAlbum, CatalogArtist, CatalogEntity, CatalogTrack, EntityKind,
};
pub use spotify::SpotifyClient;

use async_trait::async_trait;
use thiserror::Error;

/// The pipeline's output record.
pub type Track = CatalogTrack;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("no {kind} matches {query:?}")]
    NoMatch { kind: EntityKind, query: String },

    #[error("catalog request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("catalog returned HTTP {status} for {url}")]
    Status { status: u16, url: String },

    #[error("catalog authentication failed: {0}")]
    Auth(String),

    #[error("failed to decode catalog response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("expected {expected} from catalog, got {found}")]
    UnexpectedEntity {
        expected: EntityKind,
        found: EntityKind,
    },
}

/// Search, fetch and listing operations against a music catalog.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Search entities of `kind` by free text, best match first.
    async fn search(&self, kind: EntityKind, query: &str)
        -> Result<Vec<CatalogEntity>, CatalogError>;

    /// Fetch one entity with full metadata (albums include their tracks).
    async fn fetch(&self, kind: EntityKind, id: &str) -> Result<CatalogEntity, CatalogError>;

    /// List an artist's albums (without tracks).
    async fn artist_albums(&self, artist_id: &str) -> Result<Vec<CatalogAlbum>, CatalogError>;
}

impl CatalogEntity {
    pub fn into_artist(self) -> Result<CatalogArtist, CatalogError> {
        match self {
            Self::Artist(artist) => Ok(artist),
            other => Err(unexpected(EntityKind::Artist, &other)),
        }
    }

    pub fn into_album(self) -> Result<CatalogAlbum, CatalogError> {
        match self {
            Self::Album(album) => Ok(album),
            other => Err(unexpected(EntityKind::Album, &other)),
        }
    }

    pub fn into_track(self) -> Result<CatalogTrack, CatalogError> {
        match self {
            Self::Track(track) => Ok(track),
            other => Err(unexpected(EntityKind::Track, &other)),
        }
    }
}

fn unexpected(expected: EntityKind, found: &CatalogEntity) -> CatalogError {
    CatalogError::UnexpectedEntity {
        expected,
        found: found.kind(),
    }
}
