// Deezer public search client
//
// Unauthenticated `GET /search?q=…&limit=…`. Every transport-level failure is
// logged and reported as an empty result, never as an error. A well-formed
// payload carrying a track without id or title is a catalog fault.

use super::{CatalogSearch, CatalogTrack, SearchResponse};
use crate::config::CatalogSettings;
use crate::error::{AppError, CatalogError, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use thiserror::Error;
use tracing::{debug, warn};

/// Why a search request produced no usable payload
#[derive(Debug, Error)]
enum TransportError {
    #[error("request timed out: {0}")]
    Timeout(#[source] reqwest::Error),

    #[error("request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("HTTP {0}")]
    Status(StatusCode),

    #[error("malformed payload: {0}")]
    Decode(#[source] reqwest::Error),
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TransportError::Timeout(e)
        } else {
            TransportError::Request(e)
        }
    }
}

/// First track a playlist cannot be built from, if any
fn find_invalid(tracks: &[CatalogTrack]) -> Option<&CatalogTrack> {
    tracks.iter().find(|t| t.id <= 0 || t.title.trim().is_empty())
}

pub struct DeezerClient {
    http: Client,
    base_url: String,
    app_id: Option<String>,
}

impl DeezerClient {
    /// Create a client from catalog settings. The configured timeout bounds
    /// each search call.
    pub fn new(settings: &CatalogSettings) -> Result<Self> {
        let http = Client::builder()
            .timeout(settings.timeout())
            .user_agent(format!("textplaylist/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            app_id: settings.app_id.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Application id for front ends that load the catalog's browser SDK
    pub fn app_id(&self) -> Option<&str> {
        self.app_id.as_deref()
    }

    async fn fetch(
        &self,
        query: &str,
        limit: usize,
    ) -> std::result::Result<Vec<CatalogTrack>, TransportError> {
        let url = format!("{}/search", self.base_url);
        let limit = limit.to_string();

        let response = self
            .http
            .get(&url)
            .query(&[("q", query), ("limit", limit.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status(status));
        }

        let body: SearchResponse = response.json().await.map_err(TransportError::Decode)?;

        Ok(body.data)
    }
}

#[async_trait]
impl CatalogSearch for DeezerClient {
    async fn search(&self, query: &str, limit: usize) -> std::result::Result<Vec<CatalogTrack>, CatalogError> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        match self.fetch(query, limit).await {
            Ok(tracks) => {
                if let Some(bad) = find_invalid(&tracks) {
                    return Err(CatalogError::InvalidTrack(format!(
                        "id {} with title {:?} for query {:?}",
                        bad.id, bad.title, query
                    )));
                }
                debug!(query = %query, limit, found = tracks.len(), "Catalog search");
                Ok(tracks)
            }
            Err(e) => {
                warn!(query = %query, error = %e, "Catalog search failed, using empty result");
                Ok(Vec::new())
            }
        }
    }
}
