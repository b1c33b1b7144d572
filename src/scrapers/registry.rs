//! Maps a source URI to its extraction strategy.

use url::Url;

use super::strategies::{
    Bbc, ExtractionStrategy, Lastfm, Pitchfork, RateYourMusic, Reddit, Webpage, YouTube,
};

static LASTFM: Lastfm = Lastfm;
static PITCHFORK: Pitchfork = Pitchfork;
static RATEYOURMUSIC: RateYourMusic = RateYourMusic;
static REDDIT: Reddit = Reddit;
static YOUTUBE: YouTube = YouTube;
static BBC: Bbc = Bbc;
static WEBPAGE: Webpage = Webpage;

static REGISTERED: [&(dyn ExtractionStrategy); 6] =
    [&LASTFM, &PITCHFORK, &RATEYOURMUSIC, &REDDIT, &YOUTUBE, &BBC];

/// Specialized strategies in lookup order (the fallback is not included).
pub fn strategies() -> &'static [&'static dyn ExtractionStrategy] {
    &REGISTERED
}

/// The strategy used when no host matches.
pub fn fallback() -> &'static dyn ExtractionStrategy {
    &WEBPAGE
}

/// Pick the strategy registered for the URI's host, or the generic fallback.
pub fn select_strategy(uri: &Url) -> &'static dyn ExtractionStrategy {
    let Some(host) = uri.host_str() else {
        return fallback();
    };
    REGISTERED
        .iter()
        .copied()
        .find(|strategy| strategy.matches_host(host))
        .unwrap_or_else(fallback)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pick(uri: &str) -> &'static str {
        select_strategy(&Url::parse(uri).unwrap()).name()
    }

    #[test]
    fn test_known_hosts() {
        assert_eq!(pick("https://www.last.fm/music/Low/+similar"), "lastfm");
        assert_eq!(pick("https://pitchfork.com/reviews/best/albums/"), "pitchfork");
        assert_eq!(pick("https://rateyourmusic.com/charts/"), "rateyourmusic");
        assert_eq!(pick("https://old.reddit.com/r/slowcore/"), "reddit");
        assert_eq!(pick("https://www.youtube.com/playlist?list=x"), "youtube");
        assert_eq!(pick("https://www.bbc.co.uk/programmes/b006"), "bbc");
    }

    #[test]
    fn test_unknown_host_falls_back() {
        assert_eq!(pick("https://example.com/best-of-2024"), "webpage");
        assert_eq!(pick("file:///tmp/list.html"), "webpage");
    }
}
