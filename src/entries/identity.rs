//! How an entry's catalog identity became known, and the shared resolution
//! policy that gets it there.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::ResolveError;
use crate::scrapers::extract::pattern;
use crate::catalog::{
    Catalog, CatalogAlbum, CatalogArtist, CatalogEntity, CatalogError, CatalogTrack, EntityKind,
};

/// Bare catalog id: 22 base-62 characters.
static CATALOG_ID: LazyLock<Option<Regex>> = LazyLock::new(|| pattern(r"^[0-9A-Za-z]{22}$"));

/// `spotify:<kind>:<id>` URI.
static CATALOG_URI: LazyLock<Option<Regex>> =
    LazyLock::new(|| pattern(r"^spotify:(artist|album|track):([0-9A-Za-z]{22})$"));

/// Identity state of an entry. Exactly one source of the id exists at a time
/// and a known id is never replaced.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Identity<T> {
    #[default]
    Unresolved,
    /// First hit of a catalog search.
    Searched(T),
    /// Full metadata fetched by id.
    Full(T),
    /// Only the id is known (the reference already looked like one).
    IdOnly(String),
}

/// Entities that carry a catalog id.
pub trait HasCatalogId {
    fn catalog_id(&self) -> &str;
}

impl HasCatalogId for CatalogArtist {
    fn catalog_id(&self) -> &str {
        &self.id
    }
}

impl HasCatalogId for CatalogAlbum {
    fn catalog_id(&self) -> &str {
        &self.id
    }
}

impl HasCatalogId for CatalogTrack {
    fn catalog_id(&self) -> &str {
        &self.id
    }
}

impl<T: HasCatalogId> Identity<T> {
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::Unresolved => None,
            Self::Searched(value) | Self::Full(value) => Some(value.catalog_id()),
            Self::IdOnly(id) => Some(id),
        }
    }

    pub fn is_resolved(&self) -> bool {
        !matches!(self, Self::Unresolved)
    }

    pub fn is_full(&self) -> bool {
        matches!(self, Self::Full(_))
    }

    /// Searched or fetched metadata, if any.
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Searched(value) | Self::Full(value) => Some(value),
            _ => None,
        }
    }

    /// Replace the state with full metadata, keeping the id already known.
    pub(crate) fn promote(&mut self, full: T, keep_id: impl FnOnce(&mut T, String)) {
        let mut full = full;
        if let Some(id) = self.id() {
            if id != full.catalog_id() {
                let id = id.to_string();
                keep_id(&mut full, id);
            }
        }
        *self = Self::Full(full);
    }
}

/// Extract a catalog id from a reference that already looks like one.
pub fn looks_like_catalog_id(reference: &str, kind: EntityKind) -> Option<String> {
    let reference = reference.trim();
    if CATALOG_ID.as_ref().is_some_and(|re| re.is_match(reference)) {
        return Some(reference.to_string());
    }
    let caps = CATALOG_URI.as_ref()?.captures(reference)?;
    if &caps[1] == kind.as_str() {
        Some(caps[2].to_string())
    } else {
        None
    }
}

/// Resolve `identity` once, searching the catalog by `reference`.
///
/// A cached identity returns immediately. Otherwise the first search hit is
/// adopted; when the search fails or finds nothing, a reference shaped like a
/// catalog id becomes the id.
pub(crate) async fn resolve<'a, T: HasCatalogId>(
    identity: &'a mut Identity<T>,
    catalog: &dyn Catalog,
    kind: EntityKind,
    reference: &str,
    convert: fn(CatalogEntity) -> Result<T, CatalogError>,
) -> Result<&'a str, ResolveError> {
    if !identity.is_resolved() {
        *identity = search(catalog, kind, reference, convert).await?;
    }
    match &*identity {
        Identity::Searched(value) | Identity::Full(value) => Ok(value.catalog_id()),
        Identity::IdOnly(id) => Ok(id.as_str()),
        Identity::Unresolved => Err(ResolveError::not_found(reference)),
    }
}

async fn search<T>(
    catalog: &dyn Catalog,
    kind: EntityKind,
    reference: &str,
    convert: fn(CatalogEntity) -> Result<T, CatalogError>,
) -> Result<Identity<T>, ResolveError> {
    let failure = match catalog.search(kind, reference).await {
        Ok(hits) => match hits.into_iter().next() {
            Some(hit) => {
                let value = convert(hit).map_err(|e| ResolveError::catalog(reference, e))?;
                return Ok(Identity::Searched(value));
            }
            None => None,
        },
        Err(CatalogError::NoMatch { .. }) => None,
        Err(err) => Some(err),
    };

    if let Some(id) = looks_like_catalog_id(reference, kind) {
        debug!("Using {:?} as {} id", id, kind);
        return Ok(Identity::IdOnly(id));
    }

    Err(match failure {
        None => ResolveError::not_found(reference),
        Some(err) => ResolveError::catalog(reference, err),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_id_shapes() {
        let id = "4uLU6hMCjMI75M1A2tKUQC";
        assert_eq!(
            looks_like_catalog_id(id, EntityKind::Track).as_deref(),
            Some(id)
        );
        assert_eq!(
            looks_like_catalog_id(&format!("spotify:album:{}", id), EntityKind::Album).as_deref(),
            Some(id)
        );
        assert_eq!(
            looks_like_catalog_id(&format!("spotify:album:{}", id), EntityKind::Artist),
            None
        );
        assert_eq!(looks_like_catalog_id("Low - Lullaby", EntityKind::Track), None);
        assert_eq!(looks_like_catalog_id("4uLU6hMCjMI75M1A2tKUQ", EntityKind::Track), None);
    }

    #[test]
    fn test_identity_accessors() {
        let artist = CatalogArtist {
            id: "low".into(),
            name: "Low".into(),
            popularity: None,
            genres: Vec::new(),
        };
        let mut identity = Identity::Searched(artist.clone());
        assert_eq!(identity.id(), Some("low"));
        assert!(!identity.is_full());

        identity.promote(
            CatalogArtist {
                id: "relinked".into(),
                ..artist
            },
            |a, id| a.id = id,
        );
        assert!(identity.is_full());
        assert_eq!(identity.id(), Some("low"));

        let bare: Identity<CatalogArtist> = Identity::IdOnly("x".into());
        assert_eq!(bare.id(), Some("x"));
        assert!(bare.value().is_none());
        assert!(!Identity::<CatalogArtist>::Unresolved.is_resolved());
    }
}
