use std::cmp::Ordering;

use tracing::debug;

use super::identity::{self, Identity};
use super::{ResolveError, TrackEntry};
use crate::catalog::{Catalog, CatalogAlbum, CatalogEntity, EntityKind, Track};
use crate::queue::Queue;

/// An album reference, expanded into its tracks on dispatch.
#[derive(Debug, Clone)]
pub struct AlbumEntry {
    reference: String,
    result_limit: Option<usize>,
    fetch_tracks: bool,
    identity: Identity<CatalogAlbum>,
}

impl AlbumEntry {
    pub fn new(reference: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            result_limit: None,
            fetch_tracks: true,
            identity: Identity::Unresolved,
        }
    }

    /// An album taken from an artist's album listing.
    pub fn from_listing(album: CatalogAlbum) -> Self {
        Self {
            reference: album.name.clone(),
            result_limit: None,
            fetch_tracks: true,
            identity: Identity::Searched(album),
        }
    }

    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.result_limit = limit;
        self
    }

    /// Dispatch resolves identity only and yields no tracks.
    pub fn without_tracks(mut self) -> Self {
        self.fetch_tracks = false;
        self
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }

    pub fn result_limit(&self) -> Option<usize> {
        self.result_limit
    }

    pub fn identity(&self) -> &Identity<CatalogAlbum> {
        &self.identity
    }

    pub fn album(&self) -> Option<&CatalogAlbum> {
        self.identity.value()
    }

    pub async fn resolve_identity(&mut self, catalog: &dyn Catalog) -> Result<&str, ResolveError> {
        identity::resolve(
            &mut self.identity,
            catalog,
            EntityKind::Album,
            &self.reference,
            CatalogEntity::into_album,
        )
        .await
    }

    /// Resolve identity, then fetch full metadata (tracks, popularity) once.
    pub async fn resolve_full(
        &mut self,
        catalog: &dyn Catalog,
    ) -> Result<&CatalogAlbum, ResolveError> {
        if !self.identity.is_full() {
            let id = self.resolve_identity(catalog).await?.to_string();
            debug!("Fetching album {}", id);
            let album = catalog
                .fetch(EntityKind::Album, &id)
                .await
                .and_then(CatalogEntity::into_album)
                .map_err(|e| ResolveError::catalog(&self.reference, e))?;
            self.identity.promote(album, |a, id| a.id = id);
        }
        match &self.identity {
            Identity::Full(album) => Ok(album),
            _ => Err(ResolveError::not_found(&self.reference)),
        }
    }

    /// Expand into the album's tracks in album order, truncated to the limit.
    pub async fn dispatch(&mut self, catalog: &dyn Catalog) -> Result<Queue<Track>, ResolveError> {
        if !self.fetch_tracks {
            self.resolve_identity(catalog).await?;
            return Ok(Queue::new());
        }

        let album = self.resolve_full(catalog).await?;
        let entries: Queue<TrackEntry> = album
            .tracks
            .iter()
            .map(|track| TrackEntry::resolved(track.clone(), Some(album.name.clone())))
            .collect();

        let tracks = entries
            .map_sequential(move |mut entry| async move { entry.dispatch(catalog).await })
            .await?
            .flatten()
            .limit(self.result_limit);

        debug!("Album {:?}: {} tracks", self.reference, tracks.len());
        Ok(tracks)
    }
}

fn type_rank(entry: &AlbumEntry) -> u8 {
    use crate::catalog::AlbumType;
    match entry.album().map(|a| a.album_type) {
        Some(AlbumType::Album) => 0,
        Some(AlbumType::Single) => 1,
        Some(AlbumType::Compilation) => 2,
        Some(AlbumType::Other) | None => 3,
    }
}

/// Studio albums before singles before compilations, then more popular first.
pub fn album_order(a: &AlbumEntry, b: &AlbumEntry) -> Ordering {
    let popularity = |e: &AlbumEntry| e.album().and_then(|a| a.popularity).unwrap_or(0);
    type_rank(a)
        .cmp(&type_rank(b))
        .then_with(|| popularity(b).cmp(&popularity(a)))
}
