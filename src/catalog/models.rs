//! Catalog entities as the resolution pipeline sees them.

use std::fmt;

/// Kind of catalog entity to search for or fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Artist,
    Album,
    Track,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Artist => "artist",
            Self::Album => "album",
            Self::Track => "track",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An artist credited on an album or track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtistCredit {
    pub id: String,
    pub name: String,
}

impl ArtistCredit {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogArtist {
    pub id: String,
    pub name: String,
    pub popularity: Option<u32>,
    pub genres: Vec<String>,
}

/// Release type as reported by the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AlbumType {
    Album,
    Single,
    Compilation,
    Other,
}

impl AlbumType {
    pub fn parse(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "album" => Self::Album,
            "single" => Self::Single,
            "compilation" => Self::Compilation,
            _ => Self::Other,
        }
    }
}

/// An album. `tracks` is empty until the full album has been fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogAlbum {
    pub id: String,
    pub name: String,
    pub album_type: AlbumType,
    pub artists: Vec<ArtistCredit>,
    pub popularity: Option<u32>,
    pub release_date: Option<String>,
    pub tracks: Vec<CatalogTrack>,
}

/// A fully resolved track, the pipeline's output record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogTrack {
    pub id: String,
    pub name: String,
    pub uri: String,
    pub artists: Vec<ArtistCredit>,
    pub album: Option<String>,
    pub popularity: Option<u32>,
    pub disc_number: u32,
    pub track_number: u32,
    pub duration_ms: u64,
}

impl CatalogTrack {
    /// Credited artist names joined for display.
    pub fn artist_names(&self) -> String {
        self.artists
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Whether the track credits the given artist, by id or by name.
    pub fn credits(&self, artist_id: &str, names: &[&str]) -> bool {
        let names: Vec<String> = names.iter().map(|n| n.to_lowercase()).collect();
        self.artists.iter().any(|credit| {
            credit.id == artist_id || names.contains(&credit.name.to_lowercase())
        })
    }
}

impl fmt::Display for CatalogTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.artist_names(), self.name)
    }
}

/// Any entity returned by a search or fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogEntity {
    Artist(CatalogArtist),
    Album(CatalogAlbum),
    Track(CatalogTrack),
}

impl CatalogEntity {
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Artist(_) => EntityKind::Artist,
            Self::Album(_) => EntityKind::Album,
            Self::Track(_) => EntityKind::Track,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Self::Artist(a) => &a.id,
            Self::Album(a) => &a.id,
            Self::Track(t) => &t.id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(credits: &[(&str, &str)]) -> CatalogTrack {
        CatalogTrack {
            id: "t".into(),
            name: "Words".into(),
            uri: "spotify:track:t".into(),
            artists: credits
                .iter()
                .map(|(id, name)| ArtistCredit::new(*id, *name))
                .collect(),
            album: None,
            popularity: None,
            disc_number: 1,
            track_number: 1,
            duration_ms: 0,
        }
    }

    #[test]
    fn test_credits_by_id_or_name() {
        let t = track(&[("a1", "Low"), ("a2", "Dirty Three")]);
        assert!(t.credits("a2", &[]));
        assert!(t.credits("zz", &["low"]));
        assert!(!t.credits("zz", &["Codeine"]));
        assert_eq!(t.to_string(), "Low, Dirty Three - Words");
    }

    #[test]
    fn test_credits_name_match_ignores_unicode_case() {
        let t = track(&[("a1", "Sigur Rós")]);
        assert!(t.credits("zz", &["SIGUR RÓS"]));
        assert!(!t.credits("zz", &["Sigur Ros"]));
    }

    #[test]
    fn test_album_type_parse() {
        assert_eq!(AlbumType::parse("Album"), AlbumType::Album);
        assert_eq!(AlbumType::parse("compilation"), AlbumType::Compilation);
        assert_eq!(AlbumType::parse("appears_on"), AlbumType::Other);
        assert!(AlbumType::Album < AlbumType::Single);
        assert!(AlbumType::Single < AlbumType::Compilation);
    }
}
