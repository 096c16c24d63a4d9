//! Remote vector search service reached over HTTP

use super::traits::{VectorBackend, VectorMode};
use crate::config::VectorSettings;
use crate::network::{HttpClient, HttpRequest, HttpResponse};
use crate::search::{Filters, SearchResult};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Accepted response bodies: a bare list or `{"results": [...]}`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum VectorResponse {
    List(Vec<SearchResult>),
    Wrapped { results: Vec<SearchResult> },
}

/// Vector backend that posts queries to a remote search service
pub struct HttpVectorBackend {
    client: HttpClient,
    endpoint: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl HttpVectorBackend {
    /// Create a backend from vector settings
    pub fn new(client: HttpClient, settings: &VectorSettings) -> Result<Self> {
        let path = settings.search_path.trim_start_matches('/');
        let endpoint = format!("{}/{}", settings.url.trim_end_matches('/'), path);
        let timeout = Duration::try_from_secs_f64(settings.timeout)
            .with_context(|| format!("Invalid vector timeout: {}", settings.timeout))?;

        Ok(Self {
            client,
            endpoint,
            api_key: settings.api_key.clone(),
            timeout,
        })
    }

    /// Full URL of the search endpoint
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Build the HTTP request for a search
    fn request(
        &self,
        query: &str,
        top_k: usize,
        filters: Option<&Filters>,
        mode: VectorMode,
    ) -> HttpRequest {
        let body = serde_json::json!({
            "query": query,
            "top_k": top_k,
            "filters": filters,
            "search_mode": mode,
        });

        let request = HttpRequest::post(&self.endpoint).json(body);
        match self.api_key.as_deref() {
            Some(key) => request.bearer(key),
            None => request,
        }
    }

    /// Parse the HTTP response into results
    fn response(response: HttpResponse) -> Result<Vec<SearchResult>> {
        if response.is_rate_limited() {
            return Err(match response.headers.get("retry-after") {
                Some(wait) => anyhow!("rate limited by {} (retry after {}s)", response.url, wait),
                None => anyhow!("rate limited by {}", response.url),
            });
        }
        if !response.is_success() {
            return Err(anyhow!(
                "HTTP error {} from {}",
                response.status,
                response.url
            ));
        }

        let results = match response.json::<VectorResponse>()? {
            VectorResponse::List(results) => results,
            VectorResponse::Wrapped { results } => results,
        };
        Ok(results)
    }
}

#[async_trait]
impl VectorBackend for HttpVectorBackend {
    fn name(&self) -> &str {
        "http"
    }

    async fn search(
        &self,
        query: &str,
        top_k: usize,
        filters: Option<&Filters>,
        mode: VectorMode,
    ) -> Result<Vec<SearchResult>> {
        let request = self.request(query, top_k, filters, mode);
        let response = self
            .client
            .execute(request, Some(self.timeout))
            .await?;

        let results = Self::response(response)?;
        debug!(
            "Vector backend returned {} results for mode {}",
            results.len(),
            mode
        );
        Ok(results)
    }
}
