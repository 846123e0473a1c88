//! Data structures for the catalog query surface
//!
//! Everything here is constructed fresh per query and never mutated in
//! place once handed to a caller:
//! - **Summaries**: list-card projections (`MediaSummary`, `SearchPreview`)
//! - **Details**: full movie / show / episode projections
//! - **Genres**: genre list entries

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Media Kind
// =============================================================================

/// Kind discriminator. A movie and a show may share a numeric catalog ID,
/// so `(id, kind)` is the identity of a title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Movie,
    Tv,
}

impl MediaType {
    /// Path segment used by the catalog API and by navigable hrefs
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Movie => "movie",
            MediaType::Tv => "tv",
        }
    }

    /// Type flag understood by the cross-reference API
    pub fn xref_type(&self) -> &'static str {
        match self {
            MediaType::Movie => "movie",
            MediaType::Tv => "series",
        }
    }

    /// Navigable path for a title of this kind
    pub fn href(&self, id: u64) -> String {
        format!("/{}/{}", self.as_str(), id)
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaType::Movie => write!(f, "Movie"),
            MediaType::Tv => write!(f, "TV Show"),
        }
    }
}

// =============================================================================
// Summaries
// =============================================================================

/// List-card projection of a movie or show
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaSummary {
    pub id: u64,
    pub kind: MediaType,
    pub title: String,
    pub overview: String,
    pub poster_url: Option<String>,
    pub backdrop_url: Option<String>,
    pub year: Option<u16>,
    pub href: String,
    /// Identifier used by the playback provider (e.g. "tt1375666")
    pub xref_id: Option<String>,
    /// Minutes; movies only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runtime: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub season_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub episode_count: Option<u32>,
    pub rating: Option<f32>,
    pub vote_count: Option<u32>,
}

impl MediaSummary {
    /// Whether playback can be offered for this title
    pub fn is_playable(&self) -> bool {
        self.xref_id.is_some()
    }
}

impl fmt::Display for MediaSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let year_str = self.year.map(|y| format!(" ({})", y)).unwrap_or_default();
        write!(f, "{}{} [{}]", self.title, year_str, self.kind)
    }
}

/// Lightweight search hit for interactive lookups. Never enriched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchPreview {
    pub id: u64,
    pub kind: MediaType,
    pub title: String,
    pub year: Option<u16>,
    pub poster_url: Option<String>,
    pub href: String,
}

impl fmt::Display for SearchPreview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let year_str = self.year.map(|y| format!(" ({})", y)).unwrap_or_default();
        write!(f, "{}{}", self.title, year_str)
    }
}

/// Genre list entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: u32,
    pub name: String,
}

// =============================================================================
// Details
// =============================================================================

/// Full movie projection for a details page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieDetails {
    pub id: u64,
    pub title: String,
    pub tagline: Option<String>,
    pub overview: String,
    pub year: Option<u16>,
    pub release_date: Option<String>,
    pub runtime: Option<u32>,
    pub genres: Vec<String>,
    pub poster_url: Option<String>,
    pub backdrop_url: Option<String>,
    pub rating: Option<f32>,
    pub vote_count: Option<u32>,
    pub href: String,
    pub xref_id: Option<String>,
}

impl fmt::Display for MovieDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let year = self.year.map(|y| y.to_string()).unwrap_or_else(|| "?".into());
        let runtime = self.runtime.unwrap_or(0);
        write!(
            f,
            "{} ({}) - {}h {}m - ⭐ {:.1}",
            self.title,
            year,
            runtime / 60,
            runtime % 60,
            self.rating.unwrap_or(0.0)
        )
    }
}

/// Episode entry inside a season, in upstream order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeSummary {
    pub season_number: u16,
    pub episode_number: u16,
    pub name: String,
    pub overview: String,
    pub air_date: Option<String>,
    pub runtime: Option<u32>,
    pub still_url: Option<String>,
    pub rating: Option<f32>,
    pub href: String,
}

impl fmt::Display for EpisodeSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "S{:02}E{:02} - {}",
            self.season_number, self.episode_number, self.name
        )
    }
}

/// One season of a show. `season_number` is always positive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonDetails {
    pub season_number: u16,
    pub name: String,
    pub overview: String,
    pub air_date: Option<String>,
    pub poster_url: Option<String>,
    pub episodes: Vec<EpisodeSummary>,
}

impl fmt::Display for SeasonDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} episodes)", self.name, self.episodes.len())
    }
}

/// Full show projection for a details page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TvShowDetails {
    pub id: u64,
    pub name: String,
    pub tagline: Option<String>,
    pub overview: String,
    pub year: Option<u16>,
    pub first_air_date: Option<String>,
    pub genres: Vec<String>,
    pub poster_url: Option<String>,
    pub backdrop_url: Option<String>,
    pub rating: Option<f32>,
    pub vote_count: Option<u32>,
    pub season_count: Option<u32>,
    pub episode_count: Option<u32>,
    pub href: String,
    pub xref_id: Option<String>,
    pub seasons: Vec<SeasonDetails>,
}

impl fmt::Display for TvShowDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let year = self.year.map(|y| y.to_string()).unwrap_or_else(|| "?".into());
        write!(
            f,
            "{} ({}) - {} seasons - ⭐ {:.1}",
            self.name,
            year,
            self.seasons.len(),
            self.rating.unwrap_or(0.0)
        )
    }
}

/// A single episode together with its containing show and season
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TvEpisodeDetails {
    pub show_id: u64,
    pub show_name: String,
    pub show_year: Option<u16>,
    pub show_poster_url: Option<String>,
    pub show_backdrop_url: Option<String>,
    pub show_href: String,
    pub show_xref_id: Option<String>,
    pub season_number: u16,
    pub season_name: String,
    pub season_episode_count: usize,
    pub episode: EpisodeSummary,
    pub previous_episode: Option<u16>,
    pub next_episode: Option<u16>,
}

impl fmt::Display for TvEpisodeDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.show_name, self.episode)
    }
}

/// Navigable path for an episode
pub fn episode_href(show_id: u64, season: u16, episode: u16) -> String {
    format!("/tv/{}/season/{}/episode/{}", show_id, season, episode)
}

// =============================================================================
// Tests
// =============================================================================
