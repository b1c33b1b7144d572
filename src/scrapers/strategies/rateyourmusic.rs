//! Rate Your Music charts and user lists.

use scraper::Html;
use url::Url;

use super::{ExtractionStrategy, PageExtract};
use crate::protocol::IntermediateLine;
use crate::scrapers::extract::{first_text, select_doc};

pub struct RateYourMusic;

impl ExtractionStrategy for RateYourMusic {
    fn name(&self) -> &'static str {
        "rateyourmusic"
    }

    fn hosts(&self) -> &'static [&'static str] {
        &["rateyourmusic.com"]
    }

    fn extract_page(&self, document: &Html, _page_url: &Url) -> PageExtract {
        let mut page = PageExtract::default();

        for item in select_doc(document, ".page_charts_section_charts_item") {
            let artist = first_text(
                item,
                ".page_charts_section_charts_item_credited_links_primary a.artist",
            )
            .or_else(|| first_text(item, "a.artist"));
            let album = first_text(item, ".page_charts_section_charts_item_title .release")
                .or_else(|| first_text(item, "a.release"));
            if let (Some(artist), Some(album)) = (artist, album) {
                page.lines.push(IntermediateLine::album(artist, album));
            }
        }

        for row in select_doc(document, "#user_list tr") {
            let artist = first_text(row, ".list_artist");
            let album = first_text(row, ".list_album");
            if let (Some(artist), Some(album)) = (artist, album) {
                page.lines.push(IntermediateLine::album(artist, album));
            }
        }

        page.next = select_doc(document, "a.ui_pagination_next, a.navlinknext")
            .into_iter()
            .find_map(|a| a.value().attr("href").map(str::to_string));

        page
    }
}
