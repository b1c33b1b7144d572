//! Pitchfork review and best-new-music listings.

use scraper::{CaseSensitivity, ElementRef, Html};
use url::Url;

use super::{ExtractionStrategy, PageExtract};
use crate::protocol::IntermediateLine;
use crate::scrapers::extract::{
    first_text, query_count, select_doc, select_in, strip_quotes, text_of, with_query,
};

pub struct Pitchfork;

#[derive(Clone, Copy)]
enum CardKind {
    Album,
    Track,
}

/// Card layouts: (card class, kind, artist, title).
const LAYOUTS: &[(&str, CardKind, &str, &str)] = &[
    (
        "review",
        CardKind::Album,
        ".review__title-artist li",
        ".review__title-album",
    ),
    (
        "summary-item--review",
        CardKind::Album,
        ".summary-item__sub-hed",
        ".summary-item__hed",
    ),
    (
        "track-collection-item",
        CardKind::Track,
        ".artist-list li",
        ".track-collection-item__title",
    ),
    (
        "summary-item--track",
        CardKind::Track,
        ".summary-item__sub-hed",
        ".summary-item__hed",
    ),
];

const ANY_CARD: &str =
    ".review, .summary-item--review, .track-collection-item, .summary-item--track";

/// Multiple credited artists are listed one per element.
fn artists(card: ElementRef<'_>, css: &str) -> Option<String> {
    let names: Vec<String> = select_in(card, css)
        .into_iter()
        .map(text_of)
        .filter(|n| !n.is_empty())
        .collect();
    if names.is_empty() {
        None
    } else {
        Some(names.join(", "))
    }
}

impl ExtractionStrategy for Pitchfork {
    fn name(&self) -> &'static str {
        "pitchfork"
    }

    fn hosts(&self) -> &'static [&'static str] {
        &["pitchfork.com"]
    }

    fn extract_page(&self, document: &Html, page_url: &Url) -> PageExtract {
        let mut page = PageExtract::default();

        // One pass keeps album and track cards in page order.
        for card in select_doc(document, ANY_CARD) {
            let Some((_, kind, artist_css, title_css)) = LAYOUTS.iter().find(|(class, ..)| {
                card.value()
                    .has_class(class, CaseSensitivity::CaseSensitive)
            }) else {
                continue;
            };
            let (Some(artist), Some(title)) =
                (artists(card, artist_css), first_text(card, title_css))
            else {
                continue;
            };
            let title = strip_quotes(&title);
            page.lines.push(match kind {
                CardKind::Album => IntermediateLine::album(artist, title),
                CardKind::Track => IntermediateLine::track(artist, title),
            });
        }

        // Listings paginate through `?page=N` without a next link.
        if !page.lines.is_empty() {
            let current = query_count(page_url, "page").unwrap_or(1);
            page.next = Some(with_query(page_url, &[("page", Some(current + 1))]).to_string());
        }

        page
    }
}
