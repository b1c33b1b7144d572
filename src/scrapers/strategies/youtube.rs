//! YouTube playlists and videos. Titles follow `Artist - Title (Official Video)`.

use scraper::Html;
use url::Url;

use super::{ExtractionStrategy, PageExtract};
use crate::protocol::{IntermediateLine, TrackLine};
use crate::scrapers::extract::{select_doc, split_artist_title, strip_decorations, text_of};

pub struct YouTube;

fn title_line(title: &str) -> Option<IntermediateLine> {
    if let Some((artist, title)) = split_artist_title(title) {
        return Some(IntermediateLine::track(artist, title));
    }
    let title = strip_decorations(title);
    if title.is_empty() {
        None
    } else {
        Some(IntermediateLine::Track(TrackLine::untitled_artist(title)))
    }
}

impl ExtractionStrategy for YouTube {
    fn name(&self) -> &'static str {
        "youtube"
    }

    fn hosts(&self) -> &'static [&'static str] {
        &["youtube.com"]
    }

    fn extract_page(&self, document: &Html, _page_url: &Url) -> PageExtract {
        let mut titles: Vec<String> = select_doc(document, "#video-title")
            .into_iter()
            .map(|el| {
                el.value()
                    .attr("title")
                    .map(str::to_string)
                    .unwrap_or_else(|| text_of(el))
            })
            .collect();

        // A single video page only carries its own title in the metadata.
        if titles.is_empty() {
            titles = select_doc(document, r#"meta[property="og:title"]"#)
                .into_iter()
                .filter_map(|m| m.value().attr("content").map(str::to_string))
                .collect();
        }

        PageExtract {
            lines: titles.iter().filter_map(|t| title_line(t)).collect(),
            ..Default::default()
        }
    }
}
