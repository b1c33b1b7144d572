use tracing::debug;

use super::identity::{self, Identity};
use super::ResolveError;
use crate::catalog::{Catalog, CatalogEntity, EntityKind, Track};
use crate::queue::Queue;

/// A single track reference.
#[derive(Debug, Clone)]
pub struct TrackEntry {
    reference: String,
    album_title: Option<String>,
    identity: Identity<Track>,
}

impl TrackEntry {
    pub fn new(reference: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            album_title: None,
            identity: Identity::Unresolved,
        }
    }

    /// A track already known from its album's metadata.
    pub fn resolved(track: Track, album_title: Option<String>) -> Self {
        Self {
            reference: track.to_string(),
            album_title,
            identity: Identity::Full(track),
        }
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }

    pub fn album_title(&self) -> Option<&str> {
        self.album_title.as_deref()
    }

    pub fn identity(&self) -> &Identity<Track> {
        &self.identity
    }

    pub async fn resolve_identity(&mut self, catalog: &dyn Catalog) -> Result<&str, ResolveError> {
        identity::resolve(
            &mut self.identity,
            catalog,
            EntityKind::Track,
            &self.reference,
            CatalogEntity::into_track,
        )
        .await
    }

    /// Resolve into a single-track queue.
    pub async fn dispatch(&mut self, catalog: &dyn Catalog) -> Result<Queue<Track>, ResolveError> {
        let id = self.resolve_identity(catalog).await?.to_string();

        if let Identity::IdOnly(_) = self.identity {
            debug!("Fetching track {}", id);
            let track = catalog
                .fetch(EntityKind::Track, &id)
                .await
                .and_then(CatalogEntity::into_track)
                .map_err(|e| ResolveError::catalog(&self.reference, e))?;
            self.identity.promote(track, |t, id| t.id = id);
        }

        let mut track = match &self.identity {
            Identity::Searched(track) | Identity::Full(track) => track.clone(),
            _ => return Err(ResolveError::not_found(&self.reference)),
        };
        if track.album.is_none() {
            track.album = self.album_title.clone();
        }
        Ok(Queue::from(vec![track]))
    }
}
