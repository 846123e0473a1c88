//! Marquee - movie and TV catalog aggregation
//!
//! Fetches catalog data from TMDB, normalizes it into UI-ready models and
//! resolves the IMDb-style cross-reference IDs that playback needs.
//!
//! # Modules
//!
//! - `models` - Normalized records handed to presentation code
//! - `api` - Upstream clients (TMDB, OMDb), response cache, image URLs
//! - `xref` - Cross-reference ID validation, lookup and caching
//! - `enrich` - Bounded per-list enrichment
//! - `catalog` - Public query surface
//! - `config` - Config file and environment handling
//! - `cli` / `commands` - Scriptable command line driver

pub mod api;
pub mod catalog;
pub mod cli;
pub mod commands;
pub mod config;
pub mod enrich;
pub mod models;
pub mod xref;

// Re-export commonly used types
pub use models::{
    EpisodeSummary, Genre, MediaSummary, MediaType, MovieDetails, SearchPreview, SeasonDetails,
    TvEpisodeDetails, TvShowDetails,
};

pub use api::{OmdbClient, TmdbClient, TmdbError, TtlTier};
pub use catalog::{Catalog, CatalogRequest};
pub use config::Config;
pub use enrich::ENRICH_LIMIT;
pub use xref::{MokaXrefStore, XrefResolver, XrefStore};
