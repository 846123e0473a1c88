//! Raw catalog API shapes and their projections into the internal model
//!
//! Upstream payloads are lenient: unknown fields are ignored and missing
//! strings/arrays fall back to empty values. Projections never fail.

use serde::Deserialize;

use super::images::{ImageBase, ImageSize};
use crate::models::{
    episode_href, EpisodeSummary, Genre, MediaSummary, MediaType, MovieDetails, SearchPreview,
    SeasonDetails, TvShowDetails,
};

/// Shelf size for trending results
pub const TRENDING_LIMIT: usize = 15;
/// Shelf size for every other list endpoint
pub const LIST_LIMIT: usize = 20;
/// Result count for interactive search previews
pub const PREVIEW_LIMIT: usize = 8;

const POSTER_SIZE: ImageSize = ImageSize::W500;
const PREVIEW_POSTER_SIZE: ImageSize = ImageSize::W92;
const BACKDROP_SIZE: ImageSize = ImageSize::W1280;
const STILL_SIZE: ImageSize = ImageSize::W300;

/// Extract the year from a date string like "2010-07-15"
pub fn extract_year(date: &str) -> Option<u16> {
    let head = date.trim().get(..4)?;
    if !head.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    head.parse().ok()
}

fn year_of(date: &Option<String>) -> Option<u16> {
    date.as_deref().and_then(extract_year)
}

/// Blank strings are reported as absent
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

// =============================================================================
// List Items
// =============================================================================

/// Paged list envelope
#[derive(Debug, Clone, Deserialize)]
pub struct RawPage<T> {
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
}

/// Item from a multi-type list (trending, search). People and any other
/// upstream kind land in `Other` and are dropped on projection.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "media_type", rename_all = "lowercase")]
pub enum RawMultiItem {
    Movie(RawMovieItem),
    Tv(RawTvItem),
    #[serde(other)]
    Other,
}

impl RawMultiItem {
    pub fn into_summary(self, images: &ImageBase) -> Option<MediaSummary> {
        match self {
            RawMultiItem::Movie(movie) => Some(movie.into_summary(images)),
            RawMultiItem::Tv(tv) => Some(tv.into_summary(images)),
            RawMultiItem::Other => None,
        }
    }

    pub fn into_preview(self, images: &ImageBase) -> Option<SearchPreview> {
        let (id, kind, title, year, poster_path) = match self {
            RawMultiItem::Movie(m) => (
                m.id,
                MediaType::Movie,
                m.title.or(m.original_title),
                year_of(&m.release_date),
                m.poster_path,
            ),
            RawMultiItem::Tv(t) => (
                t.id,
                MediaType::Tv,
                t.name.or(t.original_name),
                year_of(&t.first_air_date),
                t.poster_path,
            ),
            RawMultiItem::Other => return None,
        };

        Some(SearchPreview {
            id,
            kind,
            title: title.unwrap_or_default(),
            year,
            poster_url: images.url(poster_path.as_deref(), PREVIEW_POSTER_SIZE),
            href: kind.href(id),
        })
    }
}

/// Movie entry in a list response
#[derive(Debug, Clone, Deserialize)]
pub struct RawMovieItem {
    pub id: u64,
    pub title: Option<String>,
    pub original_title: Option<String>,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub release_date: Option<String>,
    pub vote_average: Option<f32>,
    pub vote_count: Option<u32>,
}

impl RawMovieItem {
    pub fn into_summary(self, images: &ImageBase) -> MediaSummary {
        MediaSummary {
            id: self.id,
            kind: MediaType::Movie,
            title: self.title.or(self.original_title).unwrap_or_default(),
            overview: self.overview.unwrap_or_default(),
            poster_url: images.url(self.poster_path.as_deref(), POSTER_SIZE),
            backdrop_url: images.url(self.backdrop_path.as_deref(), BACKDROP_SIZE),
            year: year_of(&self.release_date),
            href: MediaType::Movie.href(self.id),
            xref_id: None,
            runtime: None,
            season_count: None,
            episode_count: None,
            rating: self.vote_average,
            vote_count: self.vote_count,
        }
    }
}

/// Show entry in a list response
#[derive(Debug, Clone, Deserialize)]
pub struct RawTvItem {
    pub id: u64,
    pub name: Option<String>,
    pub original_name: Option<String>,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub first_air_date: Option<String>,
    pub vote_average: Option<f32>,
    pub vote_count: Option<u32>,
    pub number_of_seasons: Option<u32>,
    pub number_of_episodes: Option<u32>,
}

impl RawTvItem {
    pub fn into_summary(self, images: &ImageBase) -> MediaSummary {
        MediaSummary {
            id: self.id,
            kind: MediaType::Tv,
            title: self.name.or(self.original_name).unwrap_or_default(),
            overview: self.overview.unwrap_or_default(),
            poster_url: images.url(self.poster_path.as_deref(), POSTER_SIZE),
            backdrop_url: images.url(self.backdrop_path.as_deref(), BACKDROP_SIZE),
            year: year_of(&self.first_air_date),
            href: MediaType::Tv.href(self.id),
            xref_id: None,
            runtime: None,
            season_count: self.number_of_seasons,
            episode_count: self.number_of_episodes,
            rating: self.vote_average,
            vote_count: self.vote_count,
        }
    }
}

// =============================================================================
// Genres
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct RawGenre {
    #[serde(default)]
    pub id: u32,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawGenreList {
    #[serde(default)]
    pub genres: Vec<RawGenre>,
}

impl RawGenreList {
    pub fn into_genres(self) -> Vec<Genre> {
        self.genres
            .into_iter()
            .map(|g| Genre {
                id: g.id,
                name: g.name.unwrap_or_default(),
            })
            .collect()
    }
}

fn genre_names(genres: Vec<RawGenre>) -> Vec<String> {
    genres
        .into_iter()
        .filter_map(|g| g.name)
        .filter(|n| !n.is_empty())
        .collect()
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawExternalIds {
    pub imdb_id: Option<String>,
}

// =============================================================================
// Movie Detail
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct RawMovieDetail {
    pub id: u64,
    pub imdb_id: Option<String>,
    pub title: Option<String>,
    pub original_title: Option<String>,
    pub tagline: Option<String>,
    pub overview: Option<String>,
    pub release_date: Option<String>,
    pub runtime: Option<u32>,
    #[serde(default)]
    pub genres: Vec<RawGenre>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub vote_average: Option<f32>,
    pub vote_count: Option<u32>,
    pub external_ids: Option<RawExternalIds>,
}

impl RawMovieDetail {
    /// Cross-reference ID as reported by the catalog itself
    pub fn xref_candidate(&self) -> Option<String> {
        non_empty(self.imdb_id.clone()).or_else(|| {
            non_empty(self.external_ids.as_ref().and_then(|e| e.imdb_id.clone()))
        })
    }

    pub fn year(&self) -> Option<u16> {
        year_of(&self.release_date)
    }

    /// Runtime in minutes; zero means the catalog does not know
    pub fn runtime(&self) -> Option<u32> {
        self.runtime.filter(|r| *r > 0)
    }

    pub fn into_details(self, images: &ImageBase) -> MovieDetails {
        let year = self.year();
        let runtime = self.runtime();
        MovieDetails {
            id: self.id,
            title: self.title.or(self.original_title).unwrap_or_default(),
            tagline: non_empty(self.tagline),
            overview: self.overview.unwrap_or_default(),
            year,
            release_date: non_empty(self.release_date),
            runtime,
            genres: genre_names(self.genres),
            poster_url: images.url(self.poster_path.as_deref(), POSTER_SIZE),
            backdrop_url: images.url(self.backdrop_path.as_deref(), BACKDROP_SIZE),
            rating: self.vote_average,
            vote_count: self.vote_count,
            href: MediaType::Movie.href(self.id),
            xref_id: None,
        }
    }
}

// =============================================================================
// TV Detail
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct RawSeasonStub {
    #[serde(default)]
    pub season_number: u16,
    pub name: Option<String>,
    pub episode_count: Option<u32>,
    pub air_date: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawTvDetail {
    pub id: u64,
    pub name: Option<String>,
    pub original_name: Option<String>,
    pub tagline: Option<String>,
    pub overview: Option<String>,
    pub first_air_date: Option<String>,
    #[serde(default)]
    pub genres: Vec<RawGenre>,
    #[serde(default)]
    pub seasons: Vec<RawSeasonStub>,
    pub number_of_seasons: Option<u32>,
    pub number_of_episodes: Option<u32>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub vote_average: Option<f32>,
    pub vote_count: Option<u32>,
    pub external_ids: Option<RawExternalIds>,
}

impl RawTvDetail {
    pub fn xref_candidate(&self) -> Option<String> {
        non_empty(self.external_ids.as_ref().and_then(|e| e.imdb_id.clone()))
    }

    pub fn year(&self) -> Option<u16> {
        year_of(&self.first_air_date)
    }

    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .or_else(|| self.original_name.clone())
            .unwrap_or_default()
    }

    /// Regular season numbers in upstream order; specials (season 0) excluded
    pub fn season_numbers(&self) -> Vec<u16> {
        self.seasons
            .iter()
            .map(|s| s.season_number)
            .filter(|n| *n > 0)
            .collect()
    }

    /// Season count, falling back to the season list when the field is absent
    pub fn season_count(&self) -> Option<u32> {
        self.number_of_seasons.or_else(|| {
            let n = self.season_numbers().len() as u32;
            (n > 0).then_some(n)
        })
    }

    /// Episode count, falling back to summing regular seasons
    pub fn episode_count(&self) -> Option<u32> {
        self.number_of_episodes.or_else(|| {
            let total: u32 = self
                .seasons
                .iter()
                .filter(|s| s.season_number > 0)
                .filter_map(|s| s.episode_count)
                .sum();
            (total > 0).then_some(total)
        })
    }

    pub fn into_details(self, images: &ImageBase, mut seasons: Vec<SeasonDetails>) -> TvShowDetails {
        seasons.retain(|s| s.season_number > 0);
        let year = self.year();
        let season_count = self.season_count();
        let episode_count = self.episode_count();
        TvShowDetails {
            id: self.id,
            name: self.name.or(self.original_name).unwrap_or_default(),
            tagline: non_empty(self.tagline),
            overview: self.overview.unwrap_or_default(),
            year,
            first_air_date: non_empty(self.first_air_date),
            genres: genre_names(self.genres),
            poster_url: images.url(self.poster_path.as_deref(), POSTER_SIZE),
            backdrop_url: images.url(self.backdrop_path.as_deref(), BACKDROP_SIZE),
            rating: self.vote_average,
            vote_count: self.vote_count,
            season_count,
            episode_count,
            href: MediaType::Tv.href(self.id),
            xref_id: None,
            seasons,
        }
    }
}

// =============================================================================
// Season / Episode Detail
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct RawSeasonDetail {
    #[serde(default)]
    pub season_number: u16,
    pub name: Option<String>,
    pub overview: Option<String>,
    pub air_date: Option<String>,
    pub poster_path: Option<String>,
    #[serde(default)]
    pub episodes: Vec<RawEpisode>,
}

impl RawSeasonDetail {
    /// Episodes keep upstream order
    pub fn into_season(self, show_id: u64, images: &ImageBase) -> SeasonDetails {
        let season = self.season_number;
        SeasonDetails {
            season_number: season,
            name: non_empty(self.name).unwrap_or_else(|| format!("Season {}", season)),
            overview: self.overview.unwrap_or_default(),
            air_date: non_empty(self.air_date),
            poster_url: images.url(self.poster_path.as_deref(), POSTER_SIZE),
            episodes: self
                .episodes
                .into_iter()
                .map(|e| e.into_episode(show_id, season, images))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawEpisode {
    #[serde(default)]
    pub episode_number: u16,
    pub season_number: Option<u16>,
    pub name: Option<String>,
    pub overview: Option<String>,
    pub air_date: Option<String>,
    pub runtime: Option<u32>,
    pub still_path: Option<String>,
    pub vote_average: Option<f32>,
}

impl RawEpisode {
    pub fn into_episode(self, show_id: u64, season: u16, images: &ImageBase) -> EpisodeSummary {
        let season = self.season_number.unwrap_or(season);
        let number = self.episode_number;
        EpisodeSummary {
            season_number: season,
            episode_number: number,
            name: non_empty(self.name).unwrap_or_else(|| format!("Episode {}", number)),
            overview: self.overview.unwrap_or_default(),
            air_date: non_empty(self.air_date),
            runtime: self.runtime.filter(|r| *r > 0),
            still_url: images.url(self.still_path.as_deref(), STILL_SIZE),
            rating: self.vote_average,
            href: episode_href(show_id, season, number),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn images() -> ImageBase {
        ImageBase::default()
    }

    #[test]
    fn test_extract_year() {
        assert_eq!(extract_year("2010-07-15"), Some(2010));
        assert_eq!(extract_year("1999"), Some(1999));
        assert_eq!(extract_year(""), None);
        assert_eq!(extract_year("abc"), None);
        assert_eq!(extract_year("20x0-01-01"), None);
        assert_eq!(extract_year("éé"), None);
    }

    #[test]
    fn test_multi_item_drops_people() {
        let json = r#"{"results": [
            {"id": 1, "media_type": "movie", "title": "A", "release_date": "2020-01-01"},
            {"id": 2, "media_type": "person", "name": "Someone", "known_for_department": "Acting"},
            {"id": 3, "media_type": "tv", "name": "B", "first_air_date": "2019-05-05"}
        ]}"#;
        let page: RawPage<RawMultiItem> = serde_json::from_str(json).unwrap();
        let items: Vec<_> = page
            .results
            .into_iter()
            .filter_map(|r| r.into_summary(&images()))
            .collect();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].kind, MediaType::Movie);
        assert_eq!(items[0].year, Some(2020));
        assert_eq!(items[1].kind, MediaType::Tv);
        assert_eq!(items[1].href, "/tv/3");
    }

    #[test]
    fn test_nulls_become_defaults() {
        let json = r#"{"id": 7, "title": null, "overview": null, "poster_path": null, "genres": []}"#;
        let raw: RawMovieDetail = serde_json::from_str(json).unwrap();
        let details = raw.into_details(&images());
        assert_eq!(details.title, "");
        assert_eq!(details.overview, "");
        assert_eq!(details.poster_url, None);
        assert_eq!(details.year, None);
    }

    #[test]
    fn test_tv_counts_fall_back_to_season_list() {
        let json = r#"{
            "id": 1,
            "name": "Show",
            "seasons": [
                {"season_number": 0, "episode_count": 3},
                {"season_number": 1, "episode_count": 10},
                {"season_number": 2, "episode_count": 8}
            ]
        }"#;
        let raw: RawTvDetail = serde_json::from_str(json).unwrap();
        assert_eq!(raw.season_numbers(), vec![1, 2]);
        assert_eq!(raw.season_count(), Some(2));
        assert_eq!(raw.episode_count(), Some(18));
    }

    #[test]
    fn test_movie_candidate_falls_back_to_external_ids() {
        let json = r#"{"id": 1, "imdb_id": "tt0000002", "external_ids": {"imdb_id": "tt0000001"}}"#;
        let raw: RawMovieDetail = serde_json::from_str(json).unwrap();
        assert_eq!(raw.xref_candidate().as_deref(), Some("tt0000002"));

        let json = r#"{"id": 1, "imdb_id": "", "external_ids": {"imdb_id": "tt0000001"}}"#;
        let raw: RawMovieDetail = serde_json::from_str(json).unwrap();
        assert_eq!(raw.xref_candidate().as_deref(), Some("tt0000001"));

        let json = r#"{"id": 1, "imdb_id": null}"#;
        let raw: RawMovieDetail = serde_json::from_str(json).unwrap();
        assert_eq!(raw.xref_candidate(), None);
    }

    #[test]
    fn test_season_keeps_episode_order() {
        let json = r#"{
            "season_number": 2,
            "episodes": [
                {"episode_number": 1, "name": "One"},
                {"episode_number": 2, "name": ""},
                {"episode_number": 3, "name": "Three", "still_path": "/s.jpg"}
            ]
        }"#;
        let raw: RawSeasonDetail = serde_json::from_str(json).unwrap();
        let season = raw.into_season(99, &images());
        let numbers: Vec<u16> = season.episodes.iter().map(|e| e.episode_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert_eq!(season.name, "Season 2");
        assert_eq!(season.episodes[1].name, "Episode 2");
        assert_eq!(season.episodes[2].href, "/tv/99/season/2/episode/3");
        assert!(season.episodes[2].still_url.as_deref().unwrap().ends_with("/w300/s.jpg"));
    }
}
