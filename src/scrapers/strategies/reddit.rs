//! Reddit music subreddits, where posts are titled `Artist - Title [genre] (year)`.

use scraper::Html;
use url::Url;

use super::{ExtractionStrategy, PageExtract};
use crate::protocol::IntermediateLine;
use crate::scrapers::extract::{first_text, select_doc, split_artist_title};

pub struct Reddit;

impl ExtractionStrategy for Reddit {
    fn name(&self) -> &'static str {
        "reddit"
    }

    fn hosts(&self) -> &'static [&'static str] {
        &["reddit.com"]
    }

    fn extract_page(&self, document: &Html, _page_url: &Url) -> PageExtract {
        let mut page = PageExtract::default();

        // Old and new layouts in one pass so mixed pages keep their order.
        page.lines = select_doc(
            document,
            "div.thing.link:not(.promoted):not(.stickied), shreddit-post",
        )
        .into_iter()
        .filter_map(|post| match post.value().name() {
            "shreddit-post" => post.value().attr("post-title").map(str::to_string),
            _ => first_text(post, "a.title"),
        })
        // Self posts and discussion threads have no separator and are dropped.
        .filter_map(|title| split_artist_title(&title))
        .map(|(artist, title)| IntermediateLine::track(artist, title))
        .collect();

        page.next = select_doc(document, "span.next-button a")
            .into_iter()
            .find_map(|a| a.value().attr("href").map(str::to_string));

        page
    }
}
