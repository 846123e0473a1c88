//! Cross-reference ID resolution
//!
//! Playback needs an IMDb-style ID ("tt1375666"). The catalog usually
//! supplies one; when it does not, the ID is looked up by title and year
//! through OMDb. Every lookup result, including "not found", is cached so
//! an unresolvable title costs one upstream call per cache lifetime.

use async_trait::async_trait;
use moka::future::Cache;
use regex::Regex;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use crate::api::omdb::{OmdbClient, OmdbLookup, OmdbQuery};
use crate::config::Config;
use crate::models::MediaType;

/// Default number of cached lookups
pub const DEFAULT_CAPACITY: u64 = 10_000;
/// Default ceiling on simultaneous OMDb calls
pub const DEFAULT_MAX_CONCURRENCY: usize = 4;

/// Two-letter prefix followed by at least five digits ("tt1375666", "nm0000138")
pub fn is_valid_xref_id(id: &str) -> bool {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^[A-Za-z]{2}[0-9]{5,}$").ok())
        .as_ref()
        .is_some_and(|re| re.is_match(id.trim()))
}

pub fn normalize_xref_id(id: &str) -> String {
    id.trim().to_lowercase()
}

// =============================================================================
// Cache Keys
// =============================================================================

/// Cache key for a lookup
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum XrefKey {
    /// `i:<normalized-id>`
    Id(String),
    /// `t:<kind>:<lowercased-title>:<year-or-empty>`
    Title {
        kind: MediaType,
        title: String,
        year: Option<u16>,
    },
}

impl XrefKey {
    pub fn for_id(id: &str) -> Self {
        XrefKey::Id(normalize_xref_id(id))
    }

    /// Years outside 1000..=9999 are dropped from the key
    pub fn for_title(title: &str, year: Option<u16>, kind: MediaType) -> Self {
        XrefKey::Title {
            kind,
            title: title.trim().to_lowercase(),
            year: year.filter(|y| (1000..=9999).contains(y)),
        }
    }
}

impl fmt::Display for XrefKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            XrefKey::Id(id) => write!(f, "i:{}", id),
            XrefKey::Title { kind, title, year } => {
                let year = year.map(|y| y.to_string()).unwrap_or_default();
                write!(f, "t:{}:{}:{}", kind.as_str(), title, year)
            }
        }
    }
}

// =============================================================================
// Store
// =============================================================================

/// Storage for resolved IDs. `Some(None)` is a cached "not found".
#[async_trait]
pub trait XrefStore: Send + Sync {
    async fn get(&self, key: &XrefKey) -> Option<Option<String>>;

    async fn set(&self, key: &XrefKey, value: Option<String>);

    async fn has(&self, key: &XrefKey) -> bool {
        self.get(key).await.is_some()
    }

    /// Number of live entries
    async fn len(&self) -> u64;
}

/// In-memory store, bounded by entry count with optional expiry.
///
/// With `recheck_after` unset an entry lives until evicted for space.
pub struct MokaXrefStore {
    cache: Cache<String, Option<String>>,
}

impl MokaXrefStore {
    pub fn new(capacity: u64, recheck_after: Option<Duration>) -> Self {
        let mut builder = Cache::builder().max_capacity(capacity);
        if let Some(ttl) = recheck_after {
            builder = builder.time_to_live(ttl);
        }
        Self {
            cache: builder.build(),
        }
    }
}

impl Default for MokaXrefStore {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, None)
    }
}

#[async_trait]
impl XrefStore for MokaXrefStore {
    async fn get(&self, key: &XrefKey) -> Option<Option<String>> {
        self.cache.get(&key.to_string()).await
    }

    async fn set(&self, key: &XrefKey, value: Option<String>) {
        self.cache.insert(key.to_string(), value).await;
    }

    async fn len(&self) -> u64 {
        self.cache.run_pending_tasks().await;
        self.cache.entry_count()
    }
}

// =============================================================================
// Resolver
// =============================================================================

/// Resolves cross-reference IDs, degrading to `None` instead of failing
pub struct XrefResolver {
    client: Option<OmdbClient>,
    store: Arc<dyn XrefStore>,
    permits: Semaphore,
    warned: AtomicBool,
}

impl XrefResolver {
    pub fn new(client: OmdbClient) -> Self {
        Self {
            client: Some(client),
            store: Arc::new(MokaXrefStore::default()),
            permits: Semaphore::new(DEFAULT_MAX_CONCURRENCY),
            warned: AtomicBool::new(false),
        }
    }

    /// Resolver with no OMDb credential: only already-valid IDs pass through
    pub fn disabled() -> Self {
        Self {
            client: None,
            store: Arc::new(MokaXrefStore::default()),
            permits: Semaphore::new(DEFAULT_MAX_CONCURRENCY),
            warned: AtomicBool::new(false),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let resolver = match config.omdb_api_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => Self::new(
                OmdbClient::with_base_url(key, &config.omdb_base_url)
                    .with_timeout(Duration::from_secs(config.request_timeout_secs)),
            ),
            _ => Self::disabled(),
        };

        resolver
            .with_store(Arc::new(MokaXrefStore::new(
                config.xref_cache_capacity,
                config.xref_recheck_after(),
            )))
            .with_max_concurrency(config.xref_max_concurrency)
    }

    pub fn with_store(mut self, store: Arc<dyn XrefStore>) -> Self {
        self.store = store;
        self
    }

    pub fn with_max_concurrency(mut self, max: usize) -> Self {
        self.permits = Semaphore::new(max.max(1));
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.client.is_some()
    }

    /// Number of cached lookups, positive and negative
    pub async fn cached_entries(&self) -> u64 {
        self.store.len().await
    }

    fn client(&self) -> Option<&OmdbClient> {
        if self.client.is_none() && !self.warned.swap(true, Ordering::Relaxed) {
            warn!("OMDB_API_KEY not set; cross-reference lookups are disabled");
        }
        self.client.as_ref()
    }

    /// Return a usable cross-reference ID for a title, or `None`.
    ///
    /// A syntactically valid `candidate` is normalized and returned without
    /// touching the cache or the network. Otherwise the title/year lookup
    /// result is served from cache or fetched once and cached.
    pub async fn ensure_xref_id(
        &self,
        candidate: Option<&str>,
        title: &str,
        year: Option<u16>,
        kind: MediaType,
    ) -> Option<String> {
        if let Some(id) = candidate.filter(|c| is_valid_xref_id(c)) {
            return Some(normalize_xref_id(id));
        }

        if title.trim().is_empty() {
            return candidate.map(str::to_string);
        }

        let client = self.client()?;
        let key = XrefKey::for_title(title, year, kind);
        if let Some(cached) = self.store.get(&key).await {
            debug!(%key, hit = cached.is_some(), "cross-reference cache hit");
            return cached;
        }

        let query = OmdbQuery::ByTitle {
            title: title.trim().to_string(),
            year: year.filter(|y| (1000..=9999).contains(y)),
            kind,
        };
        let resolved = self.lookup(client, &query).await;
        self.store.set(&key, resolved.clone()).await;
        resolved
    }

    /// Confirm an ID exists upstream. Results are cached under `i:<id>`.
    pub async fn verify(&self, id: &str) -> Option<String> {
        if !is_valid_xref_id(id) {
            return None;
        }

        let client = self.client()?;
        let key = XrefKey::for_id(id);
        if let Some(cached) = self.store.get(&key).await {
            return cached;
        }

        let query = OmdbQuery::ById(normalize_xref_id(id));
        let resolved = self.lookup(client, &query).await;
        self.store.set(&key, resolved.clone()).await;
        resolved
    }

    /// One upstream call under a concurrency permit. Errors become `None`.
    async fn lookup(&self, client: &OmdbClient, query: &OmdbQuery) -> Option<String> {
        let _permit = self.permits.acquire().await.ok()?;

        match client.lookup(query).await {
            Ok(OmdbLookup::Found { imdb_id, .. }) => {
                Some(normalize_xref_id(&imdb_id)).filter(|id| is_valid_xref_id(id))
            }
            Ok(OmdbLookup::NotFound(reason)) => {
                debug!(?query, %reason, "no cross-reference");
                None
            }
            Err(e) => {
                warn!(?query, error = %e, "cross-reference lookup failed");
                None
            }
        }
    }
}
