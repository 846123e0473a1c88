//! List enrichment
//!
//! The first [`ENRICH_LIMIT`] items of a list get a full detail fetch
//! (runtime, season/episode counts, catalog-supplied cross-reference ID).
//! The rest only get the cheap title/year cross-reference lookup. Items are
//! processed concurrently and one item's failure never touches another.

use futures::future::join_all;
use tracing::warn;

use crate::api::tmdb::{TmdbClient, TmdbResult};
use crate::models::{MediaSummary, MediaType};
use crate::xref::XrefResolver;

/// Items per list that take the full-detail path
pub const ENRICH_LIMIT: usize = 4;

pub struct Enricher<'a> {
    tmdb: &'a TmdbClient,
    xref: &'a XrefResolver,
    limit: usize,
}

impl<'a> Enricher<'a> {
    pub fn new(tmdb: &'a TmdbClient, xref: &'a XrefResolver) -> Self {
        Self {
            tmdb,
            xref,
            limit: ENRICH_LIMIT,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Enrich every summary. Output has the same length and order as input.
    pub async fn enrich(&self, summaries: Vec<MediaSummary>) -> Vec<MediaSummary> {
        let tasks = summaries
            .into_iter()
            .enumerate()
            .map(|(idx, summary)| self.enrich_one(summary, idx < self.limit));
        join_all(tasks).await
    }

    async fn enrich_one(&self, summary: MediaSummary, full: bool) -> MediaSummary {
        if full {
            match self.with_details(&summary).await {
                Ok(enriched) => return enriched,
                Err(e) => warn!(
                    id = summary.id,
                    kind = summary.kind.as_str(),
                    error = %e,
                    "detail enrichment failed, falling back to title lookup"
                ),
            }
        }
        self.resolve_only(summary).await
    }

    async fn resolve_only(&self, summary: MediaSummary) -> MediaSummary {
        let xref_id = self
            .xref
            .ensure_xref_id(
                summary.xref_id.as_deref(),
                &summary.title,
                summary.year,
                summary.kind,
            )
            .await;
        MediaSummary { xref_id, ..summary }
    }

    async fn with_details(&self, summary: &MediaSummary) -> TmdbResult<MediaSummary> {
        match summary.kind {
            MediaType::Movie => {
                let detail = self.tmdb.movie(summary.id).await?;
                let year = detail.year().or(summary.year);
                let runtime = detail.runtime().or(summary.runtime);
                let candidate = detail.xref_candidate().or_else(|| summary.xref_id.clone());
                let xref_id = self
                    .xref
                    .ensure_xref_id(candidate.as_deref(), &summary.title, year, MediaType::Movie)
                    .await;

                Ok(MediaSummary {
                    year,
                    runtime,
                    xref_id,
                    ..summary.clone()
                })
            }
            MediaType::Tv => {
                if summary.season_count.is_some() && summary.episode_count.is_some() {
                    return Ok(self.resolve_only(summary.clone()).await);
                }

                let detail = self.tmdb.tv(summary.id).await?;
                let season_count = summary.season_count.or_else(|| detail.season_count());
                let episode_count = summary.episode_count.or_else(|| detail.episode_count());
                let year = summary.year.or_else(|| detail.year());
                let candidate = summary.xref_id.clone().or_else(|| detail.xref_candidate());
                let xref_id = self
                    .xref
                    .ensure_xref_id(candidate.as_deref(), &summary.title, year, MediaType::Tv)
                    .await;

                Ok(MediaSummary {
                    year,
                    season_count,
                    episode_count,
                    xref_id,
                    ..summary.clone()
                })
            }
        }
    }
}
