use tracing::debug;

use super::album::{album_order, AlbumEntry};
use super::identity::{self, Identity};
use super::ResolveError;
use crate::catalog::{Catalog, CatalogAlbum, CatalogArtist, CatalogEntity, EntityKind, Track};
use crate::queue::Queue;

/// An artist reference, expanded into tracks from the artist's albums.
#[derive(Debug, Clone)]
pub struct ArtistEntry {
    reference: String,
    result_limit: Option<usize>,
    identity: Identity<CatalogArtist>,
    albums: Option<Vec<CatalogAlbum>>,
}

impl ArtistEntry {
    pub fn new(reference: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            result_limit: None,
            identity: Identity::Unresolved,
            albums: None,
        }
    }

    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.result_limit = limit;
        self
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }

    pub fn result_limit(&self) -> Option<usize> {
        self.result_limit
    }

    pub fn identity(&self) -> &Identity<CatalogArtist> {
        &self.identity
    }

    pub async fn resolve_identity(&mut self, catalog: &dyn Catalog) -> Result<&str, ResolveError> {
        identity::resolve(
            &mut self.identity,
            catalog,
            EntityKind::Artist,
            &self.reference,
            CatalogEntity::into_artist,
        )
        .await
    }

    /// The artist's album listing, fetched once.
    pub async fn albums(&mut self, catalog: &dyn Catalog) -> Result<&[CatalogAlbum], ResolveError> {
        if self.albums.is_none() {
            let id = self.resolve_identity(catalog).await?.to_string();
            let albums = catalog
                .artist_albums(&id)
                .await
                .map_err(|e| ResolveError::catalog(&self.reference, e))?;
            self.albums = Some(albums);
        }
        Ok(self.albums.as_deref().unwrap_or_default())
    }

    /// Expand into tracks crediting this artist, best albums first.
    pub async fn dispatch(&mut self, catalog: &dyn Catalog) -> Result<Queue<Track>, ResolveError> {
        let artist_id = self.resolve_identity(catalog).await?.to_string();
        let listing: Queue<AlbumEntry> = self
            .albums(catalog)
            .await?
            .iter()
            .cloned()
            .map(AlbumEntry::from_listing)
            .collect();

        let albums = listing
            .map_sequential(move |mut album| async move {
                album.resolve_full(catalog).await?;
                Ok::<_, ResolveError>(album)
            })
            .await?
            .sort_by(album_order);

        let tracks = albums
            .map_sequential(move |mut album| async move { album.dispatch(catalog).await })
            .await?
            .flatten();

        let mut names = vec![self.reference.as_str()];
        if let Some(artist) = self.identity.value() {
            names.push(artist.name.as_str());
        }
        let tracks = tracks
            .filter(|track| track.credits(&artist_id, &names))
            .limit(self.result_limit);

        debug!("Artist {:?}: {} tracks", self.reference, tracks.len());
        Ok(tracks)
    }
}
