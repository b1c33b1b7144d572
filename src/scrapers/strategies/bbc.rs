//! BBC radio programme tracklists.

use scraper::Html;
use url::Url;

use super::{ExtractionStrategy, PageExtract};
use crate::protocol::IntermediateLine;
use crate::scrapers::extract::{first_text, select_doc};

pub struct Bbc;

impl ExtractionStrategy for Bbc {
    fn name(&self) -> &'static str {
        "bbc"
    }

    fn hosts(&self) -> &'static [&'static str] {
        &["bbc.co.uk", "bbc.com"]
    }

    fn extract_page(&self, document: &Html, _page_url: &Url) -> PageExtract {
        let lines = select_doc(document, ".segment__track")
            .into_iter()
            .filter_map(|segment| {
                let artist = first_text(segment, ".artist")?;
                let title = first_text(segment, "p.no-margin span")
                    .or_else(|| first_text(segment, "p span"))?;
                Some(IntermediateLine::track(artist, title))
            })
            .collect();

        PageExtract {
            lines,
            ..Default::default()
        }
    }
}
