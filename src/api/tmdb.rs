//! TMDB (The Movie Database) API client
//!
//! Every request carries the shared credential and, unless disabled, goes
//! through the response cache under the endpoint's TTL tier.
//! API docs: https://developer.themoviedb.org/docs

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use super::cache::{ResponseCache, TtlTier};
use super::images::ImageBase;
use super::normalize::{
    RawEpisode, RawGenreList, RawMovieDetail, RawMovieItem, RawMultiItem, RawPage,
    RawSeasonDetail, RawTvDetail, RawTvItem, LIST_LIMIT, PREVIEW_LIMIT, TRENDING_LIMIT,
};
use crate::config::Config;
use crate::models::{EpisodeSummary, Genre, MediaSummary, MediaType, SearchPreview, SeasonDetails};

pub const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3";

/// Credentials this long are v4 read-access tokens and go in a Bearer header
const BEARER_MIN_LEN: usize = 64;

/// Retries after a 429 before failing with [`TmdbError::RateLimited`]
pub const DEFAULT_MAX_RETRIES: u32 = 3;
/// Upper bound on a single rate-limit wait, whatever `Retry-After` says
const MAX_RETRY_WAIT_SECS: u64 = 60;

/// Wait before retry `retries` (1-based): `Retry-After` seconds when given,
/// else 2^n seconds, never longer than a minute
fn backoff(retry_after: Option<u64>, retries: u32) -> Duration {
    let secs = retry_after.unwrap_or_else(|| 2u64.saturating_pow(retries));
    Duration::from_secs(secs.min(MAX_RETRY_WAIT_SECS))
}

/// TMDB API error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TmdbError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Resource not found (404)")]
    NotFound,

    #[error("Rate limited (429), retries exhausted")]
    RateLimited,

    #[error("Request failed with HTTP {status}")]
    Request { status: u16 },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Request failed: {0}")]
    Transport(String),
}

impl TmdbError {
    /// Configuration errors mean the catalog is unusable; do not retry
    pub fn is_fatal(&self) -> bool {
        matches!(self, TmdbError::Configuration(_))
    }

    /// HTTP status carried by the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            TmdbError::NotFound => Some(404),
            TmdbError::RateLimited => Some(429),
            TmdbError::Request { status } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for TmdbError {
    fn from(e: reqwest::Error) -> Self {
        match e.status() {
            Some(status) => TmdbError::Request {
                status: status.as_u16(),
            },
            None => TmdbError::Transport(e.to_string()),
        }
    }
}

pub type TmdbResult<T> = std::result::Result<T, TmdbError>;

/// TMDB API client
pub struct TmdbClient {
    api_key: String,
    base_url: String,
    language: Option<String>,
    images: ImageBase,
    client: reqwest::Client,
    cache: Option<ResponseCache>,
    max_retries: u32,
}

impl TmdbClient {
    /// Create a new TMDB client with the given API key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Create a client with a custom base URL (for testing)
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            language: None,
            images: ImageBase::default(),
            client: build_http_client(Duration::from_secs(30)),
            cache: Some(ResponseCache::default()),
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    /// Create a client from loaded configuration. A missing key is not an
    /// error here; it surfaces on the first fetch.
    pub fn from_config(config: &Config) -> Self {
        Self::with_base_url(
            config.tmdb_api_key.clone().unwrap_or_default(),
            &config.tmdb_base_url,
        )
        .with_language(config.language.clone())
        .with_image_base(ImageBase::new(&config.image_base_url))
        .with_timeout(Duration::from_secs(config.request_timeout_secs))
    }

    pub fn with_language(mut self, language: Option<String>) -> Self {
        self.language = language.filter(|l| !l.is_empty());
        self
    }

    pub fn with_image_base(mut self, images: ImageBase) -> Self {
        self.images = images;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = build_http_client(timeout);
        self
    }

    /// Number of retries after the first 429 before giving up
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Send every fetch upstream. Request-scoped memoization still applies.
    pub fn without_response_cache(mut self) -> Self {
        self.cache = None;
        self
    }

    /// Artwork host used when projecting responses
    pub fn images(&self) -> &ImageBase {
        &self.images
    }

    fn credential(&self) -> TmdbResult<&str> {
        let key = self.api_key.trim();
        if key.is_empty() {
            return Err(TmdbError::Configuration(
                "TMDB API key is not set (TMDB_API_KEY)".into(),
            ));
        }
        Ok(key)
    }

    /// Build the full request URL. Absent parameter values are omitted.
    fn build_url(&self, path: &str, params: &[(&str, Option<String>)], key: &str) -> String {
        let mut pairs: Vec<(&str, &str)> = Vec::with_capacity(params.len() + 2);
        if key.len() < BEARER_MIN_LEN {
            pairs.push(("api_key", key));
        }
        if let Some(lang) = self.language.as_deref() {
            pairs.push(("language", lang));
        }
        pairs.extend(
            params
                .iter()
                .filter_map(|(k, v)| v.as_deref().map(|v| (*k, v))),
        );

        let query = pairs
            .iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");

        if query.is_empty() {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}{}?{}", self.base_url, path, query)
        }
    }

    /// Fetch `path` and deserialize the body as `T`.
    ///
    /// Fails with [`TmdbError::Configuration`] before any network activity
    /// when no credential is set.
    pub async fn fetch<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, Option<String>)],
        tier: TtlTier,
    ) -> TmdbResult<T> {
        let key = self.credential()?;
        let url = self.build_url(path, params, key);
        let bearer = (key.len() >= BEARER_MIN_LEN).then_some(key);

        debug!(path, %tier, "catalog fetch");
        let body = match &self.cache {
            Some(cache) => cache
                .get_or_fetch(tier, &url, async {
                    debug!(path, %tier, "cache miss");
                    self.send(&url, bearer).await
                })
                .await
                .map_err(|e| (*e).clone())?,
            None => Arc::new(self.send(&url, bearer).await?),
        };

        T::deserialize(body.as_ref())
            .map_err(|e| TmdbError::InvalidResponse(format!("{}: {}", path, e)))
    }

    /// Issue the GET with retry logic for rate limits
    async fn send(&self, url: &str, bearer: Option<&str>) -> TmdbResult<Value> {
        let mut retries = 0;

        loop {
            let mut request = self.client.get(url).header("Accept", "application/json");
            if let Some(token) = bearer {
                request = request.header("Authorization", format!("Bearer {}", token));
            }
            let response = request.send().await?;

            match response.status() {
                status if status.is_success() => {
                    let body = response.text().await?;
                    return serde_json::from_str(&body).map_err(|e| {
                        TmdbError::InvalidResponse(format!("JSON parse error: {}", e))
                    });
                }
                StatusCode::NOT_FOUND => {
                    return Err(TmdbError::NotFound);
                }
                StatusCode::UNAUTHORIZED => {
                    return Err(TmdbError::Configuration(
                        "TMDB rejected the API key (401)".into(),
                    ));
                }
                StatusCode::TOO_MANY_REQUESTS => {
                    if retries >= self.max_retries {
                        return Err(TmdbError::RateLimited);
                    }
                    retries += 1;

                    // Get Retry-After header or default to exponential backoff
                    let retry_after = response
                        .headers()
                        .get("Retry-After")
                        .and_then(|v| v.to_str().ok())
                        .and_then(|s| s.trim().parse::<u64>().ok());
                    let wait = backoff(retry_after, retries);

                    debug!(wait_secs = wait.as_secs(), retries, "rate limited, backing off");
                    tokio::time::sleep(wait).await;
                    continue;
                }
                status => {
                    return Err(TmdbError::Request {
                        status: status.as_u16(),
                    });
                }
            }
        }
    }

    // =========================================================================
    // Lists
    // =========================================================================

    /// Weekly trending movies and shows, people dropped, capped at 15
    pub async fn trending(&self) -> TmdbResult<Vec<MediaSummary>> {
        let page: RawPage<RawMultiItem> =
            self.fetch("/trending/all/week", &[], TtlTier::Medium).await?;
        Ok(page
            .results
            .into_iter()
            .filter_map(|r| r.into_summary(&self.images))
            .take(TRENDING_LIMIT)
            .collect())
    }

    /// Movies currently in theatres
    pub async fn now_playing_movies(&self) -> TmdbResult<Vec<MediaSummary>> {
        self.movie_list("/movie/now_playing", TtlTier::Medium).await
    }

    /// Shows with an episode airing soon
    pub async fn on_the_air_shows(&self) -> TmdbResult<Vec<MediaSummary>> {
        let page: RawPage<RawTvItem> = self
            .fetch("/tv/on_the_air", &[page_one()], TtlTier::Medium)
            .await?;
        Ok(page
            .results
            .into_iter()
            .take(LIST_LIMIT)
            .map(|r| r.into_summary(&self.images))
            .collect())
    }

    pub async fn top_rated_movies(&self) -> TmdbResult<Vec<MediaSummary>> {
        self.movie_list("/movie/top_rated", TtlTier::Day).await
    }

    async fn movie_list(&self, path: &str, tier: TtlTier) -> TmdbResult<Vec<MediaSummary>> {
        let page: RawPage<RawMovieItem> = self.fetch(path, &[page_one()], tier).await?;
        Ok(page
            .results
            .into_iter()
            .take(LIST_LIMIT)
            .map(|r| r.into_summary(&self.images))
            .collect())
    }

    pub async fn genres(&self, kind: MediaType) -> TmdbResult<Vec<Genre>> {
        let path = format!("/genre/{}/list", kind.as_str());
        let list: RawGenreList = self.fetch(&path, &[], TtlTier::Day).await?;
        Ok(list.into_genres())
    }

    // =========================================================================
    // Search
    // =========================================================================

    async fn search_multi(&self, query: &str) -> TmdbResult<Vec<RawMultiItem>> {
        let params = [
            ("query", Some(query.to_string())),
            ("include_adult", Some("false".to_string())),
            page_one(),
        ];
        let page: RawPage<RawMultiItem> =
            self.fetch("/search/multi", &params, TtlTier::Short).await?;
        Ok(page.results)
    }

    /// Movies and shows matching `query` that have a display name
    pub async fn search(&self, query: &str) -> TmdbResult<Vec<MediaSummary>> {
        Ok(self
            .search_multi(query)
            .await?
            .into_iter()
            .filter_map(|r| r.into_summary(&self.images))
            .filter(|s| !s.title.trim().is_empty())
            .take(LIST_LIMIT)
            .collect())
    }

    /// Lightweight projection of the same search, capped at 8
    pub async fn search_previews(&self, query: &str) -> TmdbResult<Vec<SearchPreview>> {
        Ok(self
            .search_multi(query)
            .await?
            .into_iter()
            .filter_map(|r| r.into_preview(&self.images))
            .filter(|p| !p.title.trim().is_empty())
            .take(PREVIEW_LIMIT)
            .collect())
    }

    // =========================================================================
    // Details
    // =========================================================================

    /// Raw movie detail. Shared by details pages and list enrichment.
    pub async fn movie(&self, id: u64) -> TmdbResult<RawMovieDetail> {
        let path = format!("/movie/{}", id);
        self.fetch(&path, &[external_ids()], TtlTier::Long).await
    }

    /// Raw show detail. Shared by details pages and list enrichment.
    pub async fn tv(&self, id: u64) -> TmdbResult<RawTvDetail> {
        let path = format!("/tv/{}", id);
        self.fetch(&path, &[external_ids()], TtlTier::Long).await
    }

    pub async fn season(&self, id: u64, season: u16) -> TmdbResult<SeasonDetails> {
        let path = format!("/tv/{}/season/{}", id, season);
        let raw: RawSeasonDetail = self.fetch(&path, &[], TtlTier::Long).await?;
        Ok(raw.into_season(id, &self.images))
    }

    pub async fn episode(&self, id: u64, season: u16, episode: u16) -> TmdbResult<EpisodeSummary> {
        let path = format!("/tv/{}/season/{}/episode/{}", id, season, episode);
        let raw: RawEpisode = self.fetch(&path, &[], TtlTier::Long).await?;
        Ok(raw.into_episode(id, season, &self.images))
    }
}

fn page_one() -> (&'static str, Option<String>) {
    ("page", Some("1".to_string()))
}

fn external_ids() -> (&'static str, Option<String>) {
    ("append_to_response", Some("external_ids".to_string()))
}

fn build_http_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_url_omits_absent_params() {
        let client = TmdbClient::with_base_url("k", "http://host/3/");
        let url = client.build_url(
            "/search/multi",
            &[("query", Some("the batman".into())), ("year", None)],
            "k",
        );
        assert_eq!(url, "http://host/3/search/multi?api_key=k&query=the%20batman");
    }

    #[test]
    fn test_long_token_not_in_query() {
        let token = "x".repeat(BEARER_MIN_LEN);
        let client = TmdbClient::with_base_url(token.clone(), "http://host")
            .with_language(Some("en-US".into()));
        let url = client.build_url("/genre/movie/list", &[], &token);
        assert_eq!(url, "http://host/genre/movie/list?language=en-US");
    }

    #[tokio::test]
    async fn test_missing_key_is_configuration_error() {
        let client = TmdbClient::with_base_url("  ", "http://127.0.0.1:9");
        let err = client.trending().await.unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(err.status(), None);
    }

    #[test]
    fn test_backoff_is_bounded() {
        assert_eq!(backoff(Some(0), 1), Duration::ZERO);
        assert_eq!(backoff(Some(5), 3), Duration::from_secs(5));
        assert_eq!(backoff(None, 1), Duration::from_secs(2));
        assert_eq!(backoff(None, 3), Duration::from_secs(8));
        assert_eq!(backoff(Some(7200), 1), Duration::from_secs(MAX_RETRY_WAIT_SECS));
        assert_eq!(backoff(None, 40), Duration::from_secs(MAX_RETRY_WAIT_SECS));
    }

    #[test]
    fn test_error_status() {
        assert_eq!(TmdbError::NotFound.status(), Some(404));
        assert_eq!(TmdbError::Request { status: 503 }.status(), Some(503));
        assert!(!TmdbError::RateLimited.is_fatal());
    }
}
