//! Last.fm charts, libraries, tag pages and similar-artist graphs.
//!
//! Query parameters on the source URI steer the branching crawl:
//! - `ntracks`: how many track rows to examine on a page (absent = all)
//! - `nsimilar`: how many similar items to branch into (absent = no branching)

use scraper::Html;
use url::Url;

use super::{ExtractionStrategy, PageExtract};
use crate::protocol::IntermediateLine;
use crate::scrapers::extract::{
    append_path, first_attr, first_doc_text, first_text, query_count, select_doc, with_query,
};

const TRACK_CAP: &str = "ntracks";
const SIMILAR: &str = "nsimilar";

pub struct Lastfm;

impl Lastfm {
    /// Artist the page is about, used when rows omit the artist column.
    fn page_artist(document: &Html) -> Option<String> {
        first_doc_text(document, ".header-new-crumb span")
            .or_else(|| first_doc_text(document, "h1.header-new-title"))
    }

    fn extract_tracks(
        document: &Html,
        page_url: &Url,
        page_artist: Option<&str>,
        page: &mut PageExtract,
    ) {
        let cap = query_count(page_url, TRACK_CAP).unwrap_or(usize::MAX);
        let similar = query_count(page_url, SIMILAR).filter(|n| *n > 0);

        for row in select_doc(document, "tr.chartlist-row").into_iter().take(cap) {
            let Some(title) = first_text(row, "td.chartlist-name a") else {
                continue;
            };
            let artist = first_text(row, "td.chartlist-artist a")
                .or_else(|| page_artist.map(str::to_string));
            let Some(artist) = artist else {
                continue;
            };
            page.lines.push(IntermediateLine::track(artist, title));

            let Some(n) = similar else {
                continue;
            };
            let track_url = first_attr(row, "td.chartlist-name a", "href")
                .and_then(|href| page_url.join(&href).ok());
            if let Some(track_url) = track_url {
                let similar_url = append_path(&track_url, "+similar");
                page.follow_ups
                    .push(with_query(&similar_url, &[(TRACK_CAP, Some(n))]).to_string());
            }
        }
    }

    fn extract_albums(document: &Html, page_artist: Option<&str>, page: &mut PageExtract) {
        for item in select_doc(document, ".resource-list--release-list-item") {
            let Some(album) = first_text(item, ".resource-list--release-list-item-name a") else {
                continue;
            };
            let artist = first_text(item, ".resource-list--release-list-item-artist a")
                .or_else(|| page_artist.map(str::to_string));
            if let Some(artist) = artist {
                page.lines.push(IntermediateLine::album(artist, album));
            }
        }
    }

    fn extract_similar_artists(document: &Html, page_url: &Url, page: &mut PageExtract) {
        let cap = query_count(page_url, SIMILAR).unwrap_or(usize::MAX);
        let track_cap = query_count(page_url, TRACK_CAP);

        for item in select_doc(document, "li.similar-artists-item")
            .into_iter()
            .take(cap)
        {
            let Some(name) = first_text(item, ".similar-artists-item-name a") else {
                continue;
            };
            let artist_url = first_attr(item, ".similar-artists-item-name a", "href")
                .and_then(|href| page_url.join(&href).ok());

            match (track_cap, artist_url) {
                (Some(n), Some(artist_url)) => {
                    let tracks_url = append_path(&artist_url, "+tracks");
                    page.follow_ups
                        .push(with_query(&tracks_url, &[(TRACK_CAP, Some(n))]).to_string());
                }
                _ => page.lines.push(IntermediateLine::top_artist(name)),
            }
        }
    }

    fn next_page(document: &Html, page_url: &Url) -> Option<String> {
        let link = select_doc(document, "li.pagination-next a")
            .into_iter()
            .find_map(|a| a.value().attr("href").map(str::to_string))?;
        let next = page_url.join(&link).ok()?;
        // carry the branching budget onto the next page
        let next = with_query(
            &next,
            &[
                (TRACK_CAP, query_count(page_url, TRACK_CAP)),
                (SIMILAR, query_count(page_url, SIMILAR)),
            ],
        );
        Some(next.to_string())
    }
}

impl ExtractionStrategy for Lastfm {
    fn name(&self) -> &'static str {
        "lastfm"
    }

    fn hosts(&self) -> &'static [&'static str] {
        &["last.fm", "lastfm.com"]
    }

    fn extract_page(&self, document: &Html, page_url: &Url) -> PageExtract {
        let mut page = PageExtract::default();
        let page_artist = Self::page_artist(document);

        Self::extract_tracks(document, page_url, page_artist.as_deref(), &mut page);
        Self::extract_albums(document, page_artist.as_deref(), &mut page);
        Self::extract_similar_artists(document, page_url, &mut page);
        page.next = Self::next_page(document, page_url);

        page
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHART: &str = r#"
        <html><body>
        <table class="chartlist">
          <tr class="chartlist-row">
            <td class="chartlist-name"><a href="/music/Low/_/Lullaby">Lullaby</a></td>
            <td class="chartlist-artist"><a href="/music/Low">Low</a></td>
          </tr>
          <tr class="chartlist-row">
            <td class="chartlist-name"><a href="/music/Codeine/_/D">D</a></td>
            <td class="chartlist-artist"><a href="/music/Codeine">Codeine</a></td>
          </tr>
          <tr class="chartlist-row">
            <td class="chartlist-name"><a href="/music/Duster/_/Inside+Out">Inside Out</a></td>
            <td class="chartlist-artist"><a href="/music/Duster">Duster</a></td>
          </tr>
        </table>
        <ul><li class="pagination-next"><a href="?page=2">Next</a></li></ul>
        </body></html>
    "#;

    fn extract(html: &str, url: &str) -> PageExtract {
        Lastfm.extract_page(&Html::parse_document(html), &Url::parse(url).unwrap())
    }

    #[test]
    fn test_chart_rows_become_track_lines() {
        let page = extract(CHART, "https://www.last.fm/tag/slowcore/tracks");
        assert_eq!(
            page.lines,
            vec![
                IntermediateLine::track("Low", "Lullaby"),
                IntermediateLine::track("Codeine", "D"),
                IntermediateLine::track("Duster", "Inside Out"),
            ]
        );
        assert!(page.follow_ups.is_empty());
        assert_eq!(
            page.next.as_deref(),
            Some("https://www.last.fm/tag/slowcore/tracks?page=2")
        );
    }

    #[test]
    fn test_track_cap_stops_scanning() {
        let page = extract(
            CHART,
            "https://www.last.fm/tag/slowcore/tracks?ntracks=2&nsimilar=4",
        );
        assert_eq!(page.lines.len(), 2);
        assert_eq!(
            page.follow_ups,
            vec![
                "https://www.last.fm/music/Low/_/Lullaby/+similar?ntracks=4".to_string(),
                "https://www.last.fm/music/Codeine/_/D/+similar?ntracks=4".to_string(),
            ]
        );
        let next = page.next.unwrap();
        assert!(next.contains("page=2"));
        assert!(next.contains("ntracks=2"));
        assert!(next.contains("nsimilar=4"));
    }

    #[test]
    fn test_similar_artists_drill_into_tracks() {
        let html = r#"
            <ol>
              <li class="similar-artists-item"><p class="similar-artists-item-name"><a href="/music/Codeine">Codeine</a></p></li>
              <li class="similar-artists-item"><p class="similar-artists-item-name"><a href="/music/Red+House+Painters">Red House Painters</a></p></li>
              <li class="similar-artists-item"><p class="similar-artists-item-name"><a href="/music/Bedhead">Bedhead</a></p></li>
            </ol>
        "#;

        let page = extract(html, "https://www.last.fm/music/Low/+similar?nsimilar=2&ntracks=3");
        assert!(page.lines.is_empty());
        assert_eq!(
            page.follow_ups,
            vec![
                "https://www.last.fm/music/Codeine/+tracks?ntracks=3".to_string(),
                "https://www.last.fm/music/Red+House+Painters/+tracks?ntracks=3".to_string(),
            ]
        );

        let page = extract(html, "https://www.last.fm/music/Low/+similar");
        assert_eq!(page.lines.len(), 3);
        assert_eq!(page.lines[0], IntermediateLine::top_artist("Codeine"));
    }

    #[test]
    fn test_artist_tracks_page_uses_header_artist() {
        let html = r#"
            <h1 class="header-new-title">Low</h1>
            <table>
              <tr class="chartlist-row"><td class="chartlist-name"><a href="/music/Low/_/Words">Words</a></td></tr>
            </table>
        "#;
        let page = extract(html, "https://www.last.fm/music/Low/+tracks");
        assert_eq!(page.lines, vec![IntermediateLine::track("Low", "Words")]);
        assert_eq!(page.next, None);
    }

    #[test]
    fn test_album_listing() {
        let html = r#"
            <h1 class="header-new-title">Low</h1>
            <ol>
              <li class="resource-list--release-list-item"><h3 class="resource-list--release-list-item-name"><a href="/music/Low/Secret+Name">Secret Name</a></h3></li>
            </ol>
        "#;
        let page = extract(html, "https://www.last.fm/music/Low/+albums");
        assert_eq!(page.lines, vec![IntermediateLine::album("Low", "Secret Name")]);
    }
}
