//! Generic fallback: every link on the page is a candidate track.

use scraper::Html;
use url::Url;

use super::{ExtractionStrategy, PageExtract};
use crate::protocol::{IntermediateLine, TrackLine};
use crate::scrapers::extract::{select_doc, split_artist_title, text_of};

pub struct Webpage;

impl ExtractionStrategy for Webpage {
    fn name(&self) -> &'static str {
        "webpage"
    }

    fn hosts(&self) -> &'static [&'static str] {
        &[]
    }

    fn matches_host(&self, _host: &str) -> bool {
        true
    }

    fn extract_page(&self, document: &Html, _page_url: &Url) -> PageExtract {
        let lines = select_doc(document, "a")
            .into_iter()
            .map(text_of)
            .filter(|text| !text.is_empty())
            .map(|text| match split_artist_title(&text) {
                Some((artist, title)) => IntermediateLine::track(artist, title),
                None => IntermediateLine::Track(TrackLine::untitled_artist(text)),
            })
            .collect();

        // single page only
        PageExtract {
            lines,
            ..Default::default()
        }
    }
}
