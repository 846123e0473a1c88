//! Time-boxed response cache for catalog fetches
//!
//! Bodies are cached per fully-built request URL inside one of four TTL
//! tiers. The tier belongs to the endpoint, not the caller.

use moka::future::Cache;
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Cache lifetime bucket, chosen by how volatile an endpoint's data is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TtlTier {
    /// 5 minutes: search-driven lookups
    Short,
    /// 1 hour: rotating lists (trending, now playing, on the air)
    Medium,
    /// 6 hours: full detail for movies, shows, seasons and episodes
    Long,
    /// 24 hours: near-static data (genres, top rated)
    Day,
}

impl TtlTier {
    pub const ALL: [TtlTier; 4] = [TtlTier::Short, TtlTier::Medium, TtlTier::Long, TtlTier::Day];

    pub fn ttl(&self) -> Duration {
        match self {
            TtlTier::Short => Duration::from_secs(5 * 60),
            TtlTier::Medium => Duration::from_secs(60 * 60),
            TtlTier::Long => Duration::from_secs(6 * 60 * 60),
            TtlTier::Day => Duration::from_secs(24 * 60 * 60),
        }
    }

    fn index(&self) -> usize {
        match self {
            TtlTier::Short => 0,
            TtlTier::Medium => 1,
            TtlTier::Long => 2,
            TtlTier::Day => 3,
        }
    }
}

impl fmt::Display for TtlTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TtlTier::Short => write!(f, "short"),
            TtlTier::Medium => write!(f, "medium"),
            TtlTier::Long => write!(f, "long"),
            TtlTier::Day => write!(f, "day"),
        }
    }
}

/// Parsed response bodies keyed by URL, one TTL-bounded cache per tier
pub struct ResponseCache {
    tiers: [Cache<String, Arc<Value>>; 4],
}

impl ResponseCache {
    /// Default per-tier capacity
    pub const DEFAULT_CAPACITY: u64 = 2_000;

    pub fn new(capacity_per_tier: u64) -> Self {
        let build = |tier: TtlTier| {
            Cache::builder()
                .max_capacity(capacity_per_tier)
                .time_to_live(tier.ttl())
                .build()
        };
        Self {
            tiers: TtlTier::ALL.map(build),
        }
    }

    /// Return the cached body for `url`, or run `fetch` to produce it.
    ///
    /// Concurrent callers for the same uncached URL share a single `fetch`.
    /// Errors are not cached and are handed to every waiter.
    pub async fn get_or_fetch<F, E>(
        &self,
        tier: TtlTier,
        url: &str,
        fetch: F,
    ) -> Result<Arc<Value>, Arc<E>>
    where
        F: Future<Output = Result<Value, E>>,
        E: Send + Sync + 'static,
    {
        self.tiers[tier.index()]
            .try_get_with(url.to_string(), async move { fetch.await.map(Arc::new) })
            .await
    }

    /// Whether `url` currently has a live entry in `tier`
    pub async fn contains(&self, tier: TtlTier, url: &str) -> bool {
        self.tiers[tier.index()].get(url).await.is_some()
    }

    /// Drop every cached body
    pub fn clear(&self) {
        for cache in &self.tiers {
            cache.invalidate_all();
        }
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}
