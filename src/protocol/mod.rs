//! The intermediate line protocol handed from extraction to resolution.
//!
//! Each line is one of:
//! - `ARTIST\t-\tTITLE` (a track reference; bare `TITLE` when the artist is unknown)
//! - `#album ARTIST\t-\tALBUM`
//! - `#top ARTIST`
//!
//! Input written by hand may also use `#artist ARTIST`, `spotify:<kind>:<id>`
//! references and directive lines such as `#shuffle`.
//!
//! A track line whose text begins with `#` or `\` is written with a leading
//! `\` so it is never read back as a marker or directive.

mod line;
mod parser;

pub use line::{
    IntermediateLine, TrackLine, ALBUM_MARKER, ARTIST_MARKER, LITERAL_ESCAPE, SEPARATOR, TOP_MARKER,
};
pub use parser::{normalize_reference, parse, parse_line, Directive, ParsedLine, Seed, SeedEntry};

/// Render lines into a protocol buffer, one per line.
pub fn render(lines: &[IntermediateLine]) -> String {
    let mut buffer = String::new();
    for line in lines {
        buffer.push_str(&line.to_string());
        buffer.push('\n');
    }
    buffer
}
