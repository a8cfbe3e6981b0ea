//! Remote catalog client
//!
//! Resolves one query in two sequential calls: a search that yields the first
//! hit's identifier, then a detail fetch for that identifier. Every failure in
//! either call collapses to [`ResolutionOutcome::Unresolved`]; nothing is
//! raised to the caller.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tbx_common::{Error, Result};

use crate::models::{
    DetailRecord, LookupError, LookupStage, Query, ResolutionOutcome, SearchHit, UnresolvedReason,
};

const USER_AGENT: &str = concat!("tbx-export/", env!("CARGO_PKG_VERSION"));

/// Two-stage catalog lookup
///
/// Implementors provide the two stages; [`CatalogClient::resolve`] sequences
/// them so that the detail call only happens after a search hit.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// First hit for `query`, or `None` when the search has no results
    async fn search(&self, query: &Query) -> std::result::Result<Option<SearchHit>, LookupError>;

    /// First detail record for `hit`, or `None` when the catalog returns none
    async fn fetch_detail(
        &self,
        hit: &SearchHit,
    ) -> std::result::Result<Option<DetailRecord>, LookupError>;

    /// Search, then fetch detail for the first hit
    async fn resolve(&self, query: &Query) -> ResolutionOutcome {
        let hit = match self.search(query).await {
            Ok(Some(hit)) => hit,
            Ok(None) => return ResolutionOutcome::unresolved(UnresolvedReason::NoSearchHits),
            Err(e) => return ResolutionOutcome::unresolved(e),
        };

        match self.fetch_detail(&hit).await {
            Ok(Some(record)) => ResolutionOutcome::Resolved(record),
            Ok(None) => ResolutionOutcome::unresolved(UnresolvedReason::NoDetailRecord),
            Err(e) => ResolutionOutcome::unresolved(e),
        }
    }
}

/// `GET /api/search?query=..` body; only the first result's id is read
#[derive(Debug, Default, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Option<SearchData>,
}

#[derive(Debug, Default, Deserialize)]
struct SearchData {
    #[serde(default)]
    songs: Option<SongResults>,
}

#[derive(Debug, Default, Deserialize)]
struct SongResults {
    #[serde(default)]
    results: Option<Vec<SongSummary>>,
}

#[derive(Debug, Default, Deserialize)]
struct SongSummary {
    /// String or numeric, depending on the catalog deployment
    #[serde(default)]
    id: Option<serde_json::Value>,
}

impl SongSummary {
    fn id_text(&self) -> Option<String> {
        match self.id.as_ref()? {
            serde_json::Value::String(id) if !id.is_empty() => Some(id.clone()),
            serde_json::Value::Number(id) => Some(id.to_string()),
            _ => None,
        }
    }
}

/// `GET /api/songs/{id}` body; only the first element is read
#[derive(Debug, Default, Deserialize)]
struct DetailResponse {
    #[serde(default)]
    data: Option<Vec<serde_json::Value>>,
}

/// HTTP implementation against a JioSaavn-compatible catalog API
pub struct HttpCatalogClient {
    http_client: reqwest::Client,
    base_url: reqwest::Url,
    request_timeout: Duration,
}

impl HttpCatalogClient {
    /// Build a client for `base_url`; every request uses `request_timeout`
    pub fn new(base_url: &str, request_timeout: Duration) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| Error::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Self::with_http_client(http_client, base_url, request_timeout)
    }

    /// Build on top of a shared `reqwest::Client` (connection pool reuse)
    pub fn with_http_client(
        http_client: reqwest::Client,
        base_url: &str,
        request_timeout: Duration,
    ) -> Result<Self> {
        let base_url = reqwest::Url::parse(base_url)
            .map_err(|e| Error::Config(format!("Invalid catalog base URL {:?}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(Error::Config(format!(
                "Catalog base URL cannot carry a path: {}",
                base_url
            )));
        }
        if request_timeout.is_zero() {
            return Err(Error::Config("Catalog request timeout must be greater than zero".to_string()));
        }

        Ok(Self {
            http_client,
            base_url,
            request_timeout,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> reqwest::Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        stage: LookupStage,
        request: reqwest::RequestBuilder,
    ) -> std::result::Result<T, LookupError> {
        let response = request
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(|e| request_error(stage, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Status {
                stage,
                status: status.as_u16(),
            });
        }

        response.json::<T>().await.map_err(|e| request_error(stage, e))
    }
}

#[async_trait]
impl CatalogClient for HttpCatalogClient {
    async fn search(&self, query: &Query) -> std::result::Result<Option<SearchHit>, LookupError> {
        let url = self.endpoint(&["api", "search"]);
        tracing::debug!(query = %query, url = %url, "Querying catalog search");

        let request = self.http_client.get(url).query(&[("query", query.as_str())]);
        let body: SearchResponse = self.get_json(LookupStage::Search, request).await?;

        let first = body
            .data
            .and_then(|d| d.songs)
            .and_then(|s| s.results)
            .and_then(|results| results.into_iter().next());

        let Some(first) = first else {
            return Ok(None);
        };

        match first.id_text() {
            Some(id) => Ok(Some(SearchHit { id })),
            None => Err(LookupError::Malformed {
                stage: LookupStage::Search,
                message: "first result has no id".to_string(),
            }),
        }
    }

    async fn fetch_detail(
        &self,
        hit: &SearchHit,
    ) -> std::result::Result<Option<DetailRecord>, LookupError> {
        let url = self.endpoint(&["api", "songs", &hit.id]);
        tracing::debug!(id = %hit.id, url = %url, "Fetching catalog detail");

        let request = self.http_client.get(url);
        let body: DetailResponse = self.get_json(LookupStage::Detail, request).await?;

        let record = body
            .data
            .and_then(|records| records.into_iter().next())
            .filter(is_present);

        Ok(record.map(DetailRecord::new))
    }
}

/// Only a non-empty object is a record; `null`, `{}` and scalars count as missing
fn is_present(value: &serde_json::Value) -> bool {
    matches!(value, serde_json::Value::Object(map) if !map.is_empty())
}

fn request_error(stage: LookupStage, err: reqwest::Error) -> LookupError {
    if err.is_timeout() {
        LookupError::Timeout { stage }
    } else if err.is_decode() {
        LookupError::Malformed {
            stage,
            message: err.to_string(),
        }
    } else {
        LookupError::Network {
            stage,
            message: err.to_string(),
        }
    }
}
