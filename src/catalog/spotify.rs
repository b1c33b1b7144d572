//! Spotify Web API catalog client (client-credentials flow).

use std::time::{Duration, Instant};

use async_trait::async_trait;
use base64::Engine;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::config::CatalogConfig;
use super::models::{
    AlbumType, ArtistCredit, CatalogAlbum, CatalogArtist, CatalogEntity, CatalogTrack, EntityKind,
};
use super::{Catalog, CatalogError};
use crate::scrapers::rate_limiter::{parse_retry_after, RateLimiter};

/// Refresh the token this long before the catalog says it expires.
const TOKEN_SLACK: Duration = Duration::from_secs(30);
/// Page size for album and track listings.
const PAGE_LIMIT: u32 = 50;

struct AccessToken {
    value: String,
    expires_at: Instant,
}

/// Catalog client backed by the Spotify Web API.
pub struct SpotifyClient {
    client: Client,
    config: CatalogConfig,
    token: Mutex<Option<AccessToken>>,
    rate_limiter: RateLimiter,
}

// Wire formats

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

#[derive(Debug, Deserialize)]
struct Paging<T> {
    #[serde(default = "Vec::new")]
    items: Vec<Option<T>>,
    #[serde(default)]
    next: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    artists: Option<Paging<ArtistObject>>,
    #[serde(default)]
    albums: Option<Paging<AlbumObject>>,
    #[serde(default)]
    tracks: Option<Paging<TrackObject>>,
}

#[derive(Debug, Deserialize)]
struct ArtistObject {
    id: String,
    name: String,
    #[serde(default)]
    popularity: Option<u32>,
    #[serde(default)]
    genres: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct CreditObject {
    #[serde(default)]
    id: Option<String>,
    name: String,
}

#[derive(Debug, Deserialize)]
struct AlbumRef {
    name: String,
}

#[derive(Debug, Deserialize)]
struct AlbumObject {
    id: String,
    name: String,
    #[serde(default)]
    album_type: Option<String>,
    #[serde(default)]
    artists: Vec<CreditObject>,
    #[serde(default)]
    popularity: Option<u32>,
    #[serde(default)]
    release_date: Option<String>,
    #[serde(default)]
    tracks: Option<Paging<TrackObject>>,
}

#[derive(Debug, Deserialize)]
struct TrackObject {
    // local files carry no id
    #[serde(default)]
    id: Option<String>,
    name: String,
    #[serde(default)]
    uri: Option<String>,
    #[serde(default)]
    artists: Vec<CreditObject>,
    #[serde(default)]
    album: Option<AlbumRef>,
    #[serde(default)]
    popularity: Option<u32>,
    #[serde(default)]
    disc_number: u32,
    #[serde(default)]
    track_number: u32,
    #[serde(default)]
    duration_ms: u64,
}

fn credits(objects: Vec<CreditObject>) -> Vec<ArtistCredit> {
    objects
        .into_iter()
        .map(|c| ArtistCredit::new(c.id.unwrap_or_default(), c.name))
        .collect()
}

impl From<ArtistObject> for CatalogArtist {
    fn from(a: ArtistObject) -> Self {
        Self {
            id: a.id,
            name: a.name,
            popularity: a.popularity,
            genres: a.genres,
        }
    }
}

impl TrackObject {
    fn into_track(self, album_name: Option<&str>) -> Option<CatalogTrack> {
        let id = self.id?;
        let uri = self
            .uri
            .unwrap_or_else(|| format!("spotify:track:{}", id));
        Some(CatalogTrack {
            uri,
            id,
            name: self.name,
            artists: credits(self.artists),
            album: self
                .album
                .map(|a| a.name)
                .or_else(|| album_name.map(str::to_string)),
            popularity: self.popularity,
            disc_number: self.disc_number,
            track_number: self.track_number,
            duration_ms: self.duration_ms,
        })
    }
}

impl AlbumObject {
    fn into_album(self, tracks: Vec<CatalogTrack>) -> CatalogAlbum {
        CatalogAlbum {
            id: self.id,
            name: self.name,
            album_type: self
                .album_type
                .as_deref()
                .map(AlbumType::parse)
                .unwrap_or(AlbumType::Other),
            artists: credits(self.artists),
            popularity: self.popularity,
            release_date: self.release_date,
            tracks,
        }
    }
}

impl SpotifyClient {
    /// Create a new client. Credentials are checked on first use.
    pub fn new(config: CatalogConfig, timeout: Duration) -> Result<Self, CatalogError> {
        let client = Client::builder().timeout(timeout).gzip(true).build()?;
        Ok(Self {
            client,
            config,
            token: Mutex::new(None),
            rate_limiter: RateLimiter::new(),
        })
    }

    /// Share a rate limiter with the page fetcher.
    pub fn with_rate_limiter(mut self, rate_limiter: RateLimiter) -> Self {
        self.rate_limiter = rate_limiter;
        self
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    /// Return a valid bearer token, requesting a new one when needed.
    async fn access_token(&self) -> Result<String, CatalogError> {
        let mut token = self.token.lock().await;
        if let Some(current) = token.as_ref() {
            if current.expires_at > Instant::now() + TOKEN_SLACK {
                return Ok(current.value.clone());
            }
        }

        let (Some(id), Some(secret)) = (&self.config.client_id, &self.config.client_secret) else {
            return Err(CatalogError::Auth(
                "client id and secret are not configured".to_string(),
            ));
        };
        let basic = base64::engine::general_purpose::STANDARD.encode(format!("{}:{}", id, secret));

        let response = self
            .client
            .post(&self.config.auth_url)
            .header(AUTHORIZATION, format!("Basic {}", basic))
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body("grant_type=client_credentials")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Auth(format!(
                "token endpoint returned HTTP {}",
                status.as_u16()
            )));
        }

        let body: TokenResponse = serde_json::from_str(&response.text().await?)?;
        info!("Obtained catalog access token");
        let value = body.access_token.clone();
        *token = Some(AccessToken {
            value: body.access_token,
            expires_at: Instant::now() + Duration::from_secs(body.expires_in),
        });
        Ok(value)
    }

    /// GET an API URL (absolute, or a path relative to the API base).
    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, CatalogError> {
        let url = if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else {
            format!("{}{}", self.config.api_url.trim_end_matches('/'), url)
        };
        let token = self.access_token().await?;
        let host = self.rate_limiter.acquire(&url).await;

        let response = self
            .client
            .get(&url)
            .bearer_auth(&token)
            .send()
            .await?;
        let status = response.status();

        if let Some(ref host) = host {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(parse_retry_after);
            self.rate_limiter
                .report_status(host, status.as_u16(), retry_after)
                .await;
        }

        debug!("GET {} -> {}", url, status.as_u16());

        if status == reqwest::StatusCode::UNAUTHORIZED {
            // force a fresh token on the next call
            *self.token.lock().await = None;
            return Err(CatalogError::Auth(format!("catalog rejected token for {}", url)));
        }
        if !status.is_success() {
            return Err(CatalogError::Status {
                status: status.as_u16(),
                url,
            });
        }

        Ok(serde_json::from_str(&response.text().await?)?)
    }

    /// Append the configured market to an API path.
    fn with_market(&self, path: String) -> String {
        match self.config.market.as_deref() {
            Some(market) => {
                let sep = if path.contains('?') { '&' } else { '?' };
                format!("{}{}market={}", path, sep, urlencoding::encode(market))
            }
            None => path,
        }
    }

    /// Collect every item of a paged listing by following `next` links.
    async fn collect_pages<T: DeserializeOwned>(
        &self,
        first: Paging<T>,
    ) -> Result<Vec<T>, CatalogError> {
        let mut items: Vec<T> = first.items.into_iter().flatten().collect();
        let mut next = first.next;
        while let Some(url) = next.take() {
            let page: Paging<T> = self.get_json(&url).await?;
            items.extend(page.items.into_iter().flatten());
            next = page.next;
        }
        Ok(items)
    }
}

#[async_trait]
impl Catalog for SpotifyClient {
    async fn search(
        &self,
        kind: EntityKind,
        query: &str,
    ) -> Result<Vec<CatalogEntity>, CatalogError> {
        // "artist - title" reads better to the search engine without the dash
        let terms = query.replace(" - ", " ");
        let path = self.with_market(format!(
            "/search?q={}&type={}&limit={}",
            urlencoding::encode(&terms),
            kind,
            self.config.search_limit
        ));
        let response: SearchResponse = self.get_json(&path).await?;

        let hits: Vec<CatalogEntity> = match kind {
            EntityKind::Artist => response
                .artists
                .map(|p| p.items)
                .unwrap_or_default()
                .into_iter()
                .flatten()
                .map(|a| CatalogEntity::Artist(a.into()))
                .collect(),
            EntityKind::Album => response
                .albums
                .map(|p| p.items)
                .unwrap_or_default()
                .into_iter()
                .flatten()
                .map(|a| CatalogEntity::Album(a.into_album(Vec::new())))
                .collect(),
            EntityKind::Track => response
                .tracks
                .map(|p| p.items)
                .unwrap_or_default()
                .into_iter()
                .flatten()
                .filter_map(|t| t.into_track(None))
                .map(CatalogEntity::Track)
                .collect(),
        };

        debug!("Search {} {:?}: {} hits", kind, query, hits.len());
        if hits.is_empty() {
            return Err(CatalogError::NoMatch {
                kind,
                query: query.to_string(),
            });
        }
        Ok(hits)
    }

    async fn fetch(&self, kind: EntityKind, id: &str) -> Result<CatalogEntity, CatalogError> {
        let id = urlencoding::encode(id);
        match kind {
            EntityKind::Artist => {
                let artist: ArtistObject = self.get_json(&format!("/artists/{}", id)).await?;
                Ok(CatalogEntity::Artist(artist.into()))
            }
            EntityKind::Album => {
                let mut album: AlbumObject = self
                    .get_json(&self.with_market(format!("/albums/{}", id)))
                    .await?;
                let tracks = match album.tracks.take() {
                    Some(first) => self.collect_pages(first).await?,
                    None => Vec::new(),
                };
                let tracks = tracks
                    .into_iter()
                    .filter_map(|t| t.into_track(Some(&album.name)))
                    .collect();
                Ok(CatalogEntity::Album(album.into_album(tracks)))
            }
            EntityKind::Track => {
                let track: TrackObject = self
                    .get_json(&self.with_market(format!("/tracks/{}", id)))
                    .await?;
                let track = track.into_track(None).ok_or_else(|| CatalogError::NoMatch {
                    kind,
                    query: id.to_string(),
                })?;
                Ok(CatalogEntity::Track(track))
            }
        }
    }

    async fn artist_albums(&self, artist_id: &str) -> Result<Vec<CatalogAlbum>, CatalogError> {
        let path = self.with_market(format!(
            "/artists/{}/albums?include_groups=album,single,compilation&limit={}",
            urlencoding::encode(artist_id),
            PAGE_LIMIT
        ));
        let first: Paging<AlbumObject> = self.get_json(&path).await?;
        let albums = self.collect_pages(first).await?;
        debug!("Artist {} has {} albums", artist_id, albums.len());
        Ok(albums
            .into_iter()
            .map(|a| a.into_album(Vec::new()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrapers::RateLimitConfig;
    use mockito::Matcher;

    async fn client(server: &mockito::ServerGuard) -> SpotifyClient {
        let config = CatalogConfig::default()
            .with_api_url(&server.url())
            .with_auth_url(&format!("{}/api/token", server.url()))
            .with_credentials("id", "secret");
        let limiter = RateLimiter::with_config(RateLimitConfig {
            base_delay: Duration::ZERO,
            min_delay: Duration::ZERO,
            ..RateLimitConfig::default()
        });
        SpotifyClient::new(config, Duration::from_secs(5))
            .unwrap()
            .with_rate_limiter(limiter)
    }

    async fn mock_token(server: &mut mockito::ServerGuard) -> mockito::Mock {
        server
            .mock("POST", "/api/token")
            .match_header("authorization", "Basic aWQ6c2VjcmV0")
            .with_status(200)
            .with_body(r#"{"access_token":"tok","token_type":"Bearer","expires_in":3600}"#)
            .expect(1)
            .create_async()
            .await
    }

    #[tokio::test]
    async fn test_search_tracks_decodes_hits() {
        let mut server = mockito::Server::new_async().await;
        let token = mock_token(&mut server).await;
        let search = server
            .mock("GET", "/search")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("q".into(), "Low Lullaby".into()),
                Matcher::UrlEncoded("type".into(), "track".into()),
            ]))
            .match_header("authorization", "Bearer tok")
            .with_status(200)
            .with_body(
                r#"{"tracks":{"items":[{"id":"4uLU6hMCjMI75M1A2tKUQC","name":"Lullaby",
                "uri":"spotify:track:4uLU6hMCjMI75M1A2tKUQC",
                "artists":[{"id":"0fk9KP1KZ0zOG1LcPsZnZX","name":"Low"}],
                "album":{"name":"I Could Live in Hope"},"popularity":40,
                "disc_number":1,"track_number":3,"duration_ms":598000}],"next":null}}"#,
            )
            .expect(2)
            .create_async()
            .await;

        let client = client(&server).await;
        let hits = client.search(EntityKind::Track, "Low - Lullaby").await.unwrap();
        // second call reuses the cached token
        client.search(EntityKind::Track, "Low - Lullaby").await.unwrap();

        let track = hits.into_iter().next().unwrap().into_track().unwrap();
        assert_eq!(track.name, "Lullaby");
        assert_eq!(track.album.as_deref(), Some("I Could Live in Hope"));
        assert_eq!(track.artists[0].name, "Low");
        token.assert_async().await;
        search.assert_async().await;
    }

    #[tokio::test]
    async fn test_empty_search_is_no_match() {
        let mut server = mockito::Server::new_async().await;
        mock_token(&mut server).await;
        server
            .mock("GET", "/search")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"albums":{"items":[],"next":null}}"#)
            .create_async()
            .await;

        let err = client(&server)
            .await
            .search(EntityKind::Album, "nothing here")
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::NoMatch { kind: EntityKind::Album, .. }));
    }

    #[tokio::test]
    async fn test_fetch_album_follows_track_pages() {
        let mut server = mockito::Server::new_async().await;
        mock_token(&mut server).await;
        let next = format!("{}/albums/alb/tracks?offset=1", server.url());
        server
            .mock("GET", "/albums/alb")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(format!(
                r#"{{"id":"alb","name":"Secret Name","album_type":"album","popularity":33,
                "artists":[{{"id":"low","name":"Low"}}],
                "tracks":{{"items":[{{"id":"t1","name":"I Remember","artists":[{{"id":"low","name":"Low"}}],"track_number":1}}],
                "next":"{}"}}}}"#,
                next
            ))
            .create_async()
            .await;
        server
            .mock("GET", "/albums/alb/tracks")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(
                r#"{"items":[{"id":"t2","name":"Starfire","artists":[{"id":"low","name":"Low"}],"track_number":2}],"next":null}"#,
            )
            .create_async()
            .await;

        let album = client(&server)
            .await
            .fetch(EntityKind::Album, "alb")
            .await
            .unwrap()
            .into_album()
            .unwrap();

        assert_eq!(album.album_type, AlbumType::Album);
        assert_eq!(album.popularity, Some(33));
        let names: Vec<_> = album.tracks.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["I Remember", "Starfire"]);
        assert_eq!(album.tracks[1].album.as_deref(), Some("Secret Name"));
        assert_eq!(album.tracks[1].uri, "spotify:track:t2");
    }

    #[tokio::test]
    async fn test_status_and_auth_errors() {
        let mut server = mockito::Server::new_async().await;
        mock_token(&mut server).await;
        server
            .mock("GET", "/artists/missing")
            .with_status(404)
            .create_async()
            .await;

        let err = client(&server)
            .await
            .fetch(EntityKind::Artist, "missing")
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Status { status: 404, .. }));

        let anonymous = SpotifyClient::new(
            CatalogConfig::default().with_api_url(&server.url()),
            Duration::from_secs(5),
        )
        .unwrap();
        let err = anonymous.artist_albums("low").await.unwrap_err();
        assert!(matches!(err, CatalogError::Auth(_)));
    }
}
