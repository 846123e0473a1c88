//! OMDb client
//!
//! Resolves IMDb IDs for titles the catalog API does not map itself.
//! Both "found" and "not found" are ordinary answers; only transport and
//! decoding problems are errors.

use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::models::MediaType;

pub const DEFAULT_BASE_URL: &str = "https://www.omdbapi.com";

#[derive(Error, Debug)]
pub enum OmdbError {
    #[error("OMDb returned HTTP {0}")]
    Status(u16),

    #[error("Invalid OMDb response: {0}")]
    InvalidResponse(String),

    #[error("OMDb request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
}

/// Query mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OmdbQuery {
    /// `i=<id>`
    ById(String),
    /// `t=<title>`, optional `y=<year>`, `type=<movie|series>`
    ByTitle {
        title: String,
        year: Option<u16>,
        kind: MediaType,
    },
}

impl OmdbQuery {
    fn params(&self) -> Vec<(&'static str, String)> {
        match self {
            OmdbQuery::ById(id) => vec![("i", id.clone())],
            OmdbQuery::ByTitle { title, year, kind } => {
                let mut params = vec![("t", title.clone())];
                if let Some(y) = year {
                    params.push(("y", y.to_string()));
                }
                params.push(("type", kind.xref_type().to_string()));
                params
            }
        }
    }
}

/// Outcome of a lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OmdbLookup {
    Found {
        imdb_id: String,
        title: Option<String>,
        year: Option<String>,
    },
    NotFound(String),
}

#[derive(Debug, Deserialize)]
struct OmdbResponse {
    #[serde(rename = "Response")]
    response: String,
    #[serde(rename = "imdbID")]
    imdb_id: Option<String>,
    #[serde(rename = "Title")]
    title: Option<String>,
    #[serde(rename = "Year")]
    year: Option<String>,
    #[serde(rename = "Error")]
    error: Option<String>,
}

impl OmdbResponse {
    fn into_lookup(self) -> OmdbLookup {
        if !self.response.eq_ignore_ascii_case("true") {
            return OmdbLookup::NotFound(self.error.unwrap_or_else(|| "Not found".into()));
        }
        match self.imdb_id.filter(|id| !id.trim().is_empty()) {
            Some(imdb_id) => OmdbLookup::Found {
                imdb_id,
                title: self.title,
                year: self.year,
            },
            None => OmdbLookup::NotFound("Response carried no imdbID".into()),
        }
    }
}

/// OMDb API client
pub struct OmdbClient {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl OmdbClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Create a client with a custom base URL (for testing)
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .unwrap_or_default(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        self
    }

    pub async fn lookup(&self, query: &OmdbQuery) -> Result<OmdbLookup, OmdbError> {
        let mut params = vec![("apikey", self.api_key.clone())];
        params.extend(query.params());

        debug!(?query, "cross-reference lookup");
        let response = self
            .client
            .get(format!("{}/", self.base_url))
            .query(&params)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        // OMDb answers bad keys with 401 plus a regular "False" body
        let parsed: Result<OmdbResponse, _> = serde_json::from_str(&text);
        match parsed {
            Ok(body) if status.is_success() => Ok(body.into_lookup()),
            Ok(body) => {
                debug!(error = ?body.error, "OMDb error body");
                Err(OmdbError::Status(status.as_u16()))
            }
            Err(_) if !status.is_success() => Err(OmdbError::Status(status.as_u16())),
            Err(e) => Err(OmdbError::InvalidResponse(e.to_string())),
        }
    }
}
