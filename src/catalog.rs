//! Public query surface
//!
//! Each operation composes fetch, normalize and (for lists) enrich.
//! [`Catalog::request`] opens a request scope: inside one scope, repeated
//! genre, show, season and episode lookups with the same arguments share
//! one in-flight or completed result.

use anyhow::Result;
use futures::future::try_join_all;
use moka::future::Cache;
use std::sync::Arc;

use crate::api::images::ImageSize;
use crate::api::normalize::RawTvDetail;
use crate::api::tmdb::{TmdbClient, TmdbError};
use crate::config::Config;
use crate::enrich::Enricher;
use crate::models::{
    EpisodeSummary, Genre, MediaSummary, MediaType, MovieDetails, SearchPreview, SeasonDetails,
    TvEpisodeDetails, TvShowDetails,
};
use crate::xref::XrefResolver;

/// Entry point for collaborators. Cheap to share behind an `Arc`.
pub struct Catalog {
    tmdb: TmdbClient,
    xref: XrefResolver,
}

impl Catalog {
    pub fn new(tmdb: TmdbClient, xref: XrefResolver) -> Self {
        Self { tmdb, xref }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            TmdbClient::from_config(config),
            XrefResolver::from_config(config),
        )
    }

    pub fn tmdb(&self) -> &TmdbClient {
        &self.tmdb
    }

    pub fn xref(&self) -> &XrefResolver {
        &self.xref
    }

    /// Open a request scope for one logical request (e.g. one page render)
    pub fn request(&self) -> CatalogRequest<'_> {
        CatalogRequest::new(self)
    }

    fn enricher(&self) -> Enricher<'_> {
        Enricher::new(&self.tmdb, &self.xref)
    }

    // Single-call conveniences, each in its own request scope

    pub async fn get_trending(&self) -> Result<Vec<MediaSummary>> {
        self.request().get_trending().await
    }

    pub async fn get_latest_movies(&self) -> Result<Vec<MediaSummary>> {
        self.request().get_latest_movies().await
    }

    pub async fn get_latest_tv_shows(&self) -> Result<Vec<MediaSummary>> {
        self.request().get_latest_tv_shows().await
    }

    pub async fn get_top_rated_movies(&self) -> Result<Vec<MediaSummary>> {
        self.request().get_top_rated_movies().await
    }

    pub async fn search_titles(&self, query: &str) -> Result<Vec<MediaSummary>> {
        self.request().search_titles(query).await
    }

    pub async fn search_previews(&self, query: &str) -> Result<Vec<SearchPreview>> {
        self.request().search_previews(query).await
    }

    pub async fn get_genres(&self, kind: MediaType) -> Result<Vec<Genre>> {
        self.request().get_genres(kind).await
    }

    pub async fn get_movie_details(&self, id: u64) -> Result<MovieDetails> {
        self.request().get_movie_details(id).await
    }

    pub async fn get_tv_show_with_seasons(&self, id: u64) -> Result<TvShowDetails> {
        self.request().get_tv_show_with_seasons(id).await
    }

    pub async fn get_tv_episode_details(
        &self,
        id: u64,
        season: u16,
        episode: u16,
    ) -> Result<TvEpisodeDetails> {
        self.request()
            .get_tv_episode_details(id, season, episode)
            .await
    }
}

/// Per-request memo size; a single page never needs more
const MEMO_CAPACITY: u64 = 256;

/// Request-scoped view of a [`Catalog`]
pub struct CatalogRequest<'a> {
    catalog: &'a Catalog,
    genres: Cache<MediaType, Arc<Vec<Genre>>>,
    shows: Cache<u64, Arc<RawTvDetail>>,
    seasons: Cache<(u64, u16), Arc<SeasonDetails>>,
    episodes: Cache<(u64, u16, u16), Arc<EpisodeSummary>>,
}

fn unshare(e: Arc<TmdbError>) -> anyhow::Error {
    (*e).clone().into()
}

impl<'a> CatalogRequest<'a> {
    fn new(catalog: &'a Catalog) -> Self {
        Self {
            catalog,
            genres: Cache::new(MEMO_CAPACITY),
            shows: Cache::new(MEMO_CAPACITY),
            seasons: Cache::new(MEMO_CAPACITY),
            episodes: Cache::new(MEMO_CAPACITY),
        }
    }

    fn tmdb(&self) -> &'a TmdbClient {
        &self.catalog.tmdb
    }

    // =========================================================================
    // Lists
    // =========================================================================

    /// Weekly trending movies and shows (at most 15), enriched
    pub async fn get_trending(&self) -> Result<Vec<MediaSummary>> {
        let items = self.tmdb().trending().await?;
        Ok(self.catalog.enricher().enrich(items).await)
    }

    /// Movies now playing (at most 20), enriched
    pub async fn get_latest_movies(&self) -> Result<Vec<MediaSummary>> {
        let items = self.tmdb().now_playing_movies().await?;
        Ok(self.catalog.enricher().enrich(items).await)
    }

    /// Shows currently on the air (at most 20), enriched
    pub async fn get_latest_tv_shows(&self) -> Result<Vec<MediaSummary>> {
        let items = self.tmdb().on_the_air_shows().await?;
        Ok(self.catalog.enricher().enrich(items).await)
    }

    /// Top rated movies (at most 20), enriched
    pub async fn get_top_rated_movies(&self) -> Result<Vec<MediaSummary>> {
        let items = self.tmdb().top_rated_movies().await?;
        Ok(self.catalog.enricher().enrich(items).await)
    }

    /// Movies and shows matching `query`, enriched. A blank query returns
    /// nothing without a network call.
    pub async fn search_titles(&self, query: &str) -> Result<Vec<MediaSummary>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let items = self.tmdb().search(query).await?;
        Ok(self.catalog.enricher().enrich(items).await)
    }

    /// Up to 8 unenriched hits for type-ahead lookups
    pub async fn search_previews(&self, query: &str) -> Result<Vec<SearchPreview>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.tmdb().search_previews(query).await?)
    }

    pub async fn get_genres(&self, kind: MediaType) -> Result<Vec<Genre>> {
        let genres = self
            .genres
            .try_get_with(kind, async move { self.tmdb().genres(kind).await.map(Arc::new) })
            .await
            .map_err(unshare)?;
        Ok(genres.as_ref().clone())
    }

    // =========================================================================
    // Details
    // =========================================================================

    pub async fn get_movie_details(&self, id: u64) -> Result<MovieDetails> {
        let raw = self.tmdb().movie(id).await?;
        let candidate = raw.xref_candidate();
        let mut details = raw.into_details(self.tmdb().images());

        details.xref_id = self
            .catalog
            .xref
            .ensure_xref_id(
                candidate.as_deref(),
                &details.title,
                details.year,
                MediaType::Movie,
            )
            .await;
        Ok(details)
    }

    /// Show detail with every regular season fetched in parallel
    pub async fn get_tv_show_with_seasons(&self, id: u64) -> Result<TvShowDetails> {
        let raw = self.show(id).await?;
        let seasons = try_join_all(raw.season_numbers().into_iter().map(|n| self.season(id, n)))
            .await?
            .into_iter()
            .map(|s| s.as_ref().clone())
            .collect();

        let candidate = raw.xref_candidate();
        let mut details = raw.as_ref().clone().into_details(self.tmdb().images(), seasons);
        details.xref_id = self
            .catalog
            .xref
            .ensure_xref_id(candidate.as_deref(), &details.name, details.year, MediaType::Tv)
            .await;
        Ok(details)
    }

    /// One episode with its show and season context. Show, season and
    /// episode are fetched in parallel.
    pub async fn get_tv_episode_details(
        &self,
        id: u64,
        season: u16,
        episode: u16,
    ) -> Result<TvEpisodeDetails> {
        let (show, season_details, episode_details) = tokio::try_join!(
            self.show(id),
            self.season(id, season),
            self.episode(id, season, episode),
        )?;

        let name = show.display_name();
        let year = show.year();
        let show_xref_id = self
            .catalog
            .xref
            .ensure_xref_id(show.xref_candidate().as_deref(), &name, year, MediaType::Tv)
            .await;

        let numbers: Vec<u16> = season_details
            .episodes
            .iter()
            .map(|e| e.episode_number)
            .collect();
        let position = numbers.iter().position(|n| *n == episode);
        let previous_episode = position
            .and_then(|i| i.checked_sub(1))
            .and_then(|i| numbers.get(i).copied());
        let next_episode = position.and_then(|i| numbers.get(i + 1).copied());

        let images = self.tmdb().images();
        Ok(TvEpisodeDetails {
            show_id: id,
            show_name: name,
            show_year: year,
            show_poster_url: images.url(show.poster_path.as_deref(), ImageSize::W500),
            show_backdrop_url: images.url(show.backdrop_path.as_deref(), ImageSize::W1280),
            show_href: MediaType::Tv.href(id),
            show_xref_id,
            season_number: season_details.season_number,
            season_name: season_details.name.clone(),
            season_episode_count: numbers.len(),
            episode: episode_details.as_ref().clone(),
            previous_episode,
            next_episode,
        })
    }

    // =========================================================================
    // Memoized fetches
    // =========================================================================

    async fn show(&self, id: u64) -> Result<Arc<RawTvDetail>> {
        self.shows
            .try_get_with(id, async move { self.tmdb().tv(id).await.map(Arc::new) })
            .await
            .map_err(unshare)
    }

    async fn season(&self, id: u64, season: u16) -> Result<Arc<SeasonDetails>> {
        self.seasons
            .try_get_with((id, season), async move {
                self.tmdb().season(id, season).await.map(Arc::new)
            })
            .await
            .map_err(unshare)
    }

    async fn episode(&self, id: u64, season: u16, episode: u16) -> Result<Arc<EpisodeSummary>> {
        self.episodes
            .try_get_with((id, season, episode), async move {
                self.tmdb().episode(id, season, episode).await.map(Arc::new)
            })
            .await
            .map_err(unshare)
    }
}
