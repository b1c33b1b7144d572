use std::fmt;

/// Separator between artist and title/album.
pub const SEPARATOR: &str = "\t-\t";
pub const ALBUM_MARKER: &str = "#album";
pub const TOP_MARKER: &str = "#top";
pub const ARTIST_MARKER: &str = "#artist";
/// Prefix marking a track line whose text would otherwise read as a `#` line.
pub const LITERAL_ESCAPE: char = '\\';

/// A track reference as scraped from a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackLine {
    pub artist: Option<String>,
    pub title: String,
}

impl TrackLine {
    pub fn new(artist: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            artist: Some(artist.into()),
            title: title.into(),
        }
    }

    /// A title whose artist is unknown (e.g. free link text).
    pub fn untitled_artist(title: impl Into<String>) -> Self {
        Self {
            artist: None,
            title: title.into(),
        }
    }
}

/// One line of extracted output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntermediateLine {
    Track(TrackLine),
    Album { artist: String, album: String },
    TopArtist(String),
}

impl IntermediateLine {
    pub fn track(artist: impl Into<String>, title: impl Into<String>) -> Self {
        Self::Track(TrackLine::new(artist, title))
    }

    pub fn album(artist: impl Into<String>, album: impl Into<String>) -> Self {
        Self::Album {
            artist: artist.into(),
            album: album.into(),
        }
    }

    pub fn top_artist(artist: impl Into<String>) -> Self {
        Self::TopArtist(artist.into())
    }
}

impl fmt::Display for IntermediateLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Track(line) => {
                let text = match &line.artist {
                    Some(artist) => format!("{}{}{}", artist, SEPARATOR, line.title),
                    None => line.title.clone(),
                };
                if text.starts_with('#') || text.starts_with(LITERAL_ESCAPE) {
                    write!(f, "{}", LITERAL_ESCAPE)?;
                }
                f.write_str(&text)
            }
            Self::Album { artist, album } => {
                write!(f, "{} {}{}{}", ALBUM_MARKER, artist, SEPARATOR, album)
            }
            Self::TopArtist(artist) => write!(f, "{} {}", TOP_MARKER, artist),
        }
    }
}
