//! Parse protocol text into seed entries and playlist directives.

use super::line::{ALBUM_MARKER, ARTIST_MARKER, LITERAL_ESCAPE, SEPARATOR, TOP_MARKER};

/// Playlist-wide instruction carried on a `#` line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    Shuffle,
    Reverse,
    Unique,
    OrderByPopularity,
}

impl Directive {
    fn parse(body: &str) -> Option<Self> {
        let words: Vec<String> = body
            .split_whitespace()
            .map(|w| w.to_ascii_lowercase())
            .collect();
        match words.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
            ["shuffle"] => Some(Self::Shuffle),
            ["reverse"] => Some(Self::Reverse),
            ["unique"] => Some(Self::Unique),
            ["order", "by", "popularity"] => Some(Self::OrderByPopularity),
            _ => None,
        }
    }
}

/// An entry to resolve, before it is bound to a catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedEntry {
    /// `artist - title`, a bare title, or a catalog track id.
    Track { reference: String },
    /// `artist - album`, or a catalog album id.
    Album { reference: String },
    /// An artist name or id; `top` limits the expansion.
    Artist { reference: String, top: bool },
}

/// Classification of a single protocol line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedLine {
    Entry(SeedEntry),
    Directive(Directive),
    Ignored,
}

/// Parsed protocol buffer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Seed {
    pub entries: Vec<SeedEntry>,
    pub directives: Vec<Directive>,
}

/// Parse a whole protocol buffer, preserving line order.
pub fn parse(text: &str) -> Seed {
    let mut seed = Seed::default();
    for line in text.lines() {
        match parse_line(line) {
            ParsedLine::Entry(entry) => seed.entries.push(entry),
            ParsedLine::Directive(directive) => {
                if !seed.directives.contains(&directive) {
                    seed.directives.push(directive);
                }
            }
            ParsedLine::Ignored => {}
        }
    }
    seed
}

/// Parse one protocol line.
pub fn parse_line(line: &str) -> ParsedLine {
    let line = line.trim();
    if line.is_empty() {
        return ParsedLine::Ignored;
    }

    // Escaped text is always a track reference, never a marker or directive.
    if let Some(rest) = line.strip_prefix(LITERAL_ESCAPE) {
        return non_empty(rest.trim(), |reference| SeedEntry::Track { reference });
    }

    if let Some(id) = spotify_uri_id(line, "track") {
        return ParsedLine::Entry(SeedEntry::Track { reference: id });
    }
    if let Some(id) = spotify_uri_id(line, "album") {
        return ParsedLine::Entry(SeedEntry::Album { reference: id });
    }
    if let Some(id) = spotify_uri_id(line, "artist") {
        return ParsedLine::Entry(SeedEntry::Artist {
            reference: id,
            top: false,
        });
    }

    if let Some(rest) = strip_marker(line, ALBUM_MARKER) {
        return non_empty(rest, |reference| SeedEntry::Album { reference });
    }
    if let Some(rest) = strip_marker(line, TOP_MARKER) {
        return non_empty(rest, |reference| SeedEntry::Artist {
            reference,
            top: true,
        });
    }
    if let Some(rest) = strip_marker(line, ARTIST_MARKER) {
        return non_empty(rest, |reference| SeedEntry::Artist {
            reference,
            top: false,
        });
    }

    if let Some(body) = line.strip_prefix('#') {
        return Directive::parse(body)
            .map(ParsedLine::Directive)
            .unwrap_or(ParsedLine::Ignored);
    }

    ParsedLine::Entry(SeedEntry::Track {
        reference: normalize_reference(line),
    })
}

/// Collapse the tab separator to the human form `artist - title`.
pub fn normalize_reference(text: &str) -> String {
    text.replace(SEPARATOR, " - ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn strip_marker<'a>(line: &'a str, marker: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(marker)?;
    // `#albums` is not `#album`
    if rest.is_empty() || rest.starts_with(char::is_whitespace) {
        Some(rest.trim())
    } else {
        None
    }
}

fn non_empty(rest: &str, build: impl FnOnce(String) -> SeedEntry) -> ParsedLine {
    if rest.is_empty() {
        ParsedLine::Ignored
    } else {
        ParsedLine::Entry(build(normalize_reference(rest)))
    }
}

fn spotify_uri_id(line: &str, kind: &str) -> Option<String> {
    let rest = line.strip_prefix("spotify:")?.strip_prefix(kind)?;
    let id = rest.strip_prefix(':')?;
    if id.is_empty() || id.contains(char::is_whitespace) {
        None
    } else {
        Some(id.to_string())
    }
}
