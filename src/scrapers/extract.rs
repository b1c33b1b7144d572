//! Shared helpers for per-page extraction: selection, text cleanup, URL
//! parameters.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Parse a CSS selector. An invalid selector matches nothing.
pub fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}

/// Select elements in document order.
pub fn select_doc<'a>(document: &'a Html, css: &str) -> Vec<ElementRef<'a>> {
    match selector(css) {
        Some(sel) => document.select(&sel).collect(),
        None => Vec::new(),
    }
}

/// Select descendants of an element in document order.
pub fn select_in<'a>(element: ElementRef<'a>, css: &str) -> Vec<ElementRef<'a>> {
    match selector(css) {
        Some(sel) => element.select(&sel).collect(),
        None => Vec::new(),
    }
}

/// Visible text of an element with whitespace collapsed.
pub fn text_of(element: ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<String>())
}

/// Text of the first matching descendant, if non-empty.
pub fn first_text(element: ElementRef<'_>, css: &str) -> Option<String> {
    select_in(element, css)
        .into_iter()
        .map(text_of)
        .find(|t| !t.is_empty())
}

/// Text of the first matching element in the document, if non-empty.
pub fn first_doc_text(document: &Html, css: &str) -> Option<String> {
    select_doc(document, css)
        .into_iter()
        .map(text_of)
        .find(|t| !t.is_empty())
}

/// Attribute of the first matching descendant.
pub fn first_attr(element: ElementRef<'_>, css: &str, attr: &str) -> Option<String> {
    select_in(element, css)
        .into_iter()
        .find_map(|el| el.value().attr(attr).map(str::to_string))
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Compile a regex. An invalid pattern matches nothing, like an invalid selector.
pub fn pattern(re: &str) -> Option<Regex> {
    Regex::new(re).ok()
}

static ARTIST_TITLE_SEPARATOR: LazyLock<Option<Regex>> =
    LazyLock::new(|| pattern(r"\s+(?:-{1,2}|–|—)\s+"));

static BRACKETED: LazyLock<Option<Regex>> = LazyLock::new(|| pattern(r"\[[^\]]*\]"));

static NOISE_PARENTHETICAL: LazyLock<Option<Regex>> = LazyLock::new(|| {
    pattern(
        r"(?i)\((?:[^)]*\b(?:official|video|audio|lyrics?|visuali[sz]er|hd|hq|4k|full album)\b[^)]*|\s*\d{4}\s*)\)",
    )
});

fn remove_all(re: &Option<Regex>, text: &str) -> String {
    match re {
        Some(re) => re.replace_all(text, " ").into_owned(),
        None => text.to_string(),
    }
}

/// Remove quote marks a site wraps titles in.
pub fn strip_quotes(text: &str) -> String {
    text.trim()
        .trim_matches(|c| matches!(c, '"' | '“' | '”' | '‘' | '’' | '\''))
        .trim()
        .to_string()
}

/// Drop `[genre]` tags and `(Official Video)` / `(1994)` style suffixes.
pub fn strip_decorations(text: &str) -> String {
    let without_brackets = remove_all(&BRACKETED, text);
    let without_noise = remove_all(&NOISE_PARENTHETICAL, &without_brackets);
    collapse_whitespace(&without_noise)
}

/// Split `Artist - Title` free text into its two halves.
pub fn split_artist_title(text: &str) -> Option<(String, String)> {
    let cleaned = strip_decorations(text);
    let mut parts = ARTIST_TITLE_SEPARATOR.as_ref()?.splitn(&cleaned, 2);
    let artist = parts.next()?.trim();
    let title = strip_quotes(parts.next()?);
    if artist.is_empty() || title.is_empty() {
        None
    } else {
        Some((artist.to_string(), title))
    }
}

/// Read a numeric query parameter. Missing or malformed values yield None.
pub fn query_count(url: &Url, name: &str) -> Option<usize> {
    url.query_pairs()
        .find(|(key, _)| key == name)
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
}

/// Return `url` with the named query parameters replaced (or removed when None).
pub fn with_query(url: &Url, params: &[(&str, Option<usize>)]) -> Url {
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !params.iter().any(|(name, _)| key == name))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    let mut out = url.clone();
    out.set_query(None);
    let additions: Vec<(String, String)> = params
        .iter()
        .filter_map(|(name, value)| value.map(|v| (name.to_string(), v.to_string())))
        .collect();
    if kept.is_empty() && additions.is_empty() {
        return out;
    }
    out.query_pairs_mut()
        .extend_pairs(kept.iter().chain(additions.iter()));
    out
}

/// Append a path segment to a page URL (`/music/Low` + `+tracks`).
pub fn append_path(url: &Url, segment: &str) -> Url {
    let mut out = url.clone();
    out.set_query(None);
    out.set_fragment(None);
    let path = format!("{}/{}", out.path().trim_end_matches('/'), segment);
    out.set_path(&path);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_artist_title() {
        assert_eq!(
            split_artist_title("Slowdive - When the Sun Hits [Shoegaze] (1993)"),
            Some(("Slowdive".to_string(), "When the Sun Hits".to_string()))
        );
        assert_eq!(
            split_artist_title("Low – “Lullaby” (Official Video)"),
            Some(("Low".to_string(), "Lullaby".to_string()))
        );
        assert_eq!(split_artist_title("Just a discussion thread"), None);
    }

    #[test]
    fn test_keeps_meaningful_parentheticals() {
        assert_eq!(
            split_artist_title("Bowery Electric - Fear of Flying (Remix)"),
            Some((
                "Bowery Electric".to_string(),
                "Fear of Flying (Remix)".to_string()
            ))
        );
    }

    #[test]
    fn test_invalid_pattern_matches_nothing() {
        assert!(pattern(r"(unclosed").is_none());
        assert_eq!(remove_all(&None, "Low [slowcore]"), "Low [slowcore]");
        assert!(pattern(r"\d+").is_some_and(|re| re.is_match("1994")));
    }

    #[test]
    fn test_query_helpers() {
        let url = Url::parse("https://www.last.fm/music/Low/+similar?ntracks=3&nsimilar=x&page=2")
            .unwrap();
        assert_eq!(query_count(&url, "ntracks"), Some(3));
        assert_eq!(query_count(&url, "nsimilar"), None);
        assert_eq!(query_count(&url, "missing"), None);

        let rewritten = with_query(&url, &[("ntracks", Some(5)), ("nsimilar", None)]);
        assert_eq!(query_count(&rewritten, "ntracks"), Some(5));
        assert_eq!(query_count(&rewritten, "page"), Some(2));
        assert!(!rewritten.as_str().contains("nsimilar"));
    }

    #[test]
    fn test_append_path() {
        let url = Url::parse("https://www.last.fm/music/Low?foo=1").unwrap();
        assert_eq!(
            append_path(&url, "+tracks").as_str(),
            "https://www.last.fm/music/Low/+tracks"
        );
    }
}
