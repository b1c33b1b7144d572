//! Crawler behavior against canned pages.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use url::Url;

use tracklist::pipeline::NoopObserver;
use tracklist::scrapers::{
    select_strategy, CrawlError, Crawler, DocumentFetcher, FetchError, SourceReference,
};

/// Serves fixed pages and records every fetch.
#[derive(Default)]
struct FakeFetcher {
    pages: HashMap<String, String>,
    log: Mutex<Vec<String>>,
}

impl FakeFetcher {
    fn with_page(mut self, uri: &str, body: &str) -> Self {
        self.pages.insert(uri.to_string(), body.to_string());
        self
    }

    fn fetched(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }
}

#[async_trait]
impl DocumentFetcher for FakeFetcher {
    async fn fetch(&self, uri: &str) -> Result<String, FetchError> {
        self.log.lock().unwrap().push(uri.to_string());
        self.pages.get(uri).cloned().ok_or_else(|| FetchError::Status {
            status: 404,
            url: uri.to_string(),
        })
    }
}

async fn crawl(fetcher: &FakeFetcher, uri: &str, pages: u32) -> Result<String, CrawlError> {
    let source = SourceReference::new(uri, pages).unwrap();
    let strategy = select_strategy(source.uri());
    Crawler::new(fetcher, &NoopObserver)
        .crawl(strategy, &source)
        .await
}

fn reddit_page(posts: &[&str], next: Option<&str>) -> String {
    let mut html = String::from("<html><body>");
    for post in posts {
        html.push_str(&format!(
            r#"<div class="thing link"><a class="title">{}</a></div>"#,
            post
        ));
    }
    if let Some(next) = next {
        html.push_str(&format!(
            r#"<span class="next-button"><a href="{}">next</a></span>"#,
            next.replace('&', "&amp;")
        ));
    }
    html.push_str("</body></html>");
    html
}

const R1: &str = "https://old.reddit.com/r/slowcore/";
const R2: &str = "https://old.reddit.com/r/slowcore/?count=25&after=t3_a";
const R3: &str = "https://old.reddit.com/r/slowcore/?count=50&after=t3_b";

fn three_reddit_pages() -> FakeFetcher {
    FakeFetcher::default()
        .with_page(R1, &reddit_page(&["Low - Lullaby [slowcore]"], Some(R2)))
        .with_page(R2, &reddit_page(&["Codeine - D (1992)"], Some(R3)))
        .with_page(R3, &reddit_page(&["Duster - Inside Out"], None))
}

#[tokio::test]
async fn test_linear_pagination_stops_at_budget() {
    let fetcher = three_reddit_pages();

    let buffer = crawl(&fetcher, R1, 2).await.unwrap();

    assert_eq!(fetcher.fetched(), vec![R1.to_string(), R2.to_string()]);
    assert_eq!(buffer, "Low\t-\tLullaby\nCodeine\t-\tD\n");
}

#[tokio::test]
async fn test_budget_one_fetches_only_the_start_page() {
    let fetcher = three_reddit_pages();
    crawl(&fetcher, R1, 1).await.unwrap();
    assert_eq!(fetcher.fetched(), vec![R1.to_string()]);

    let fetcher = three_reddit_pages();
    crawl(&fetcher, R1, 0).await.unwrap();
    assert_eq!(fetcher.fetched(), vec![R1.to_string()]);
}

#[tokio::test]
async fn test_empty_page_ends_crawl_with_prior_lines() {
    let fetcher = FakeFetcher::default()
        .with_page(R1, &reddit_page(&["Low - Lullaby"], Some(R2)))
        .with_page(R2, "<html><body><p>nothing to see</p></body></html>");

    let buffer = crawl(&fetcher, R1, 5).await.unwrap();

    assert_eq!(fetcher.fetched().len(), 2);
    assert_eq!(buffer, "Low\t-\tLullaby\n");
}

const CHART: &str = "https://www.last.fm/tag/slowcore/tracks?ntracks=2&nsimilar=1";
const SIMILAR_LULLABY: &str = "https://www.last.fm/music/Low/_/Lullaby/+similar?ntracks=1";
const SIMILAR_D: &str = "https://www.last.fm/music/Codeine/_/D/+similar?ntracks=1";

fn chart_row(artist: &str, title: &str) -> String {
    format!(
        r#"<tr class="chartlist-row">
             <td class="chartlist-name"><a href="/music/{a}/_/{t}">{title}</a></td>
             <td class="chartlist-artist"><a href="/music/{a}">{artist}</a></td>
           </tr>"#,
        a = artist.replace(' ', "+"),
        t = title.replace(' ', "+"),
        artist = artist,
        title = title,
    )
}

fn chart(rows: &[(&str, &str)], next: Option<&str>) -> String {
    let rows: String = rows.iter().map(|(a, t)| chart_row(a, t)).collect();
    let next = next
        .map(|href| format!(r#"<ul><li class="pagination-next"><a href="{}">Next</a></li></ul>"#, href))
        .unwrap_or_default();
    format!("<html><body><table>{}</table>{}</body></html>", rows, next)
}

fn branching_site() -> FakeFetcher {
    FakeFetcher::default()
        .with_page(
            CHART,
            &chart(
                &[("Low", "Lullaby"), ("Codeine", "D"), ("Bedhead", "Haywire")],
                Some("?page=2"),
            ),
        )
        .with_page(
            SIMILAR_LULLABY,
            &chart(&[("Duster", "Inside Out"), ("Seam", "Kernel")], None),
        )
        .with_page(SIMILAR_D, &chart(&[("Bedhead", "Bedside Table")], None))
}

#[tokio::test]
async fn test_branching_crawl_drains_work_queue_with_budget_one() {
    let fetcher = branching_site();

    let buffer = crawl(&fetcher, CHART, 1).await.unwrap();

    // the chart's next link is not followed, both follow-ups are
    assert_eq!(
        fetcher.fetched(),
        vec![
            CHART.to_string(),
            SIMILAR_LULLABY.to_string(),
            SIMILAR_D.to_string()
        ]
    );
    assert_eq!(
        buffer,
        "Low\t-\tLullaby\nCodeine\t-\tD\nDuster\t-\tInside Out\nBedhead\t-\tBedside Table\n"
    );
}

#[tokio::test]
async fn test_follow_ups_are_fetched_once() {
    let fetcher = FakeFetcher::default()
        .with_page(
            CHART,
            &chart(&[("Low", "Lullaby"), ("Low", "Lullaby")], None),
        )
        .with_page(SIMILAR_LULLABY, &chart(&[("Duster", "Inside Out")], None));

    let buffer = crawl(&fetcher, CHART, 1).await.unwrap();

    assert_eq!(fetcher.fetched().len(), 2);
    assert_eq!(buffer.lines().count(), 3);
}

#[tokio::test]
async fn test_crawl_is_deterministic() {
    let fetcher = branching_site();
    let first = crawl(&fetcher, CHART, 1).await.unwrap();
    let second = crawl(&fetcher, CHART, 1).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_fetch_failure_aborts_crawl() {
    let fetcher = FakeFetcher::default()
        .with_page(R1, &reddit_page(&["Low - Lullaby"], Some(R2)));

    let err = crawl(&fetcher, R1, 3).await.unwrap_err();

    match err {
        CrawlError::Fetch { uri, source } => {
            assert_eq!(uri, R2);
            assert!(matches!(source, FetchError::Status { status: 404, .. }));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_unknown_host_uses_link_text() {
    let uri = "https://blog.example.org/best-of-1994";
    let fetcher = FakeFetcher::default().with_page(
        uri,
        r#"<ul><li><a href="/a">Slint - Good Morning, Captain</a></li>
           <li><a href="/b"></a></li>
           <li><a href="/c">Spiderland</a></li></ul>"#,
    );

    let buffer = crawl(&fetcher, uri, 3).await.unwrap();

    assert_eq!(select_strategy(&Url::parse(uri).unwrap()).name(), "webpage");
    assert_eq!(buffer, "Slint\t-\tGood Morning, Captain\nSpiderland\n");
    assert_eq!(fetcher.fetched().len(), 1);
}
