//! API clients for external services
//!
//! - TMDB: catalog metadata, lists and search
//! - OMDb: IMDb cross-reference lookups

pub mod cache;
pub mod images;
pub mod normalize;
pub mod omdb;
pub mod tmdb;

pub use cache::{ResponseCache, TtlTier};
pub use images::{image_url, ImageBase, ImageSize};
pub use omdb::{OmdbClient, OmdbLookup, OmdbQuery};
pub use tmdb::{TmdbClient, TmdbError};
