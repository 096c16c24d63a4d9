//! HTTP request handlers

use super::state::AppState;
use crate::backends::{IndexedDocument, KeywordBackend};
use crate::metrics::StrategyStats;
use crate::search::{Filters, SearchRequest, SearchResult, SearchStrategy, StrategyAttempt};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};
use uuid::Uuid;

/// Error returned to API clients as `{"error": ...}`
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn unavailable(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::SERVICE_UNAVAILABLE,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(serde_json::json!({ "error": self.message })),
        )
            .into_response()
    }
}

/// Query parameters for `GET /search`
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    /// Search query
    pub q: Option<String>,
    /// Number of results
    pub top_k: Option<usize>,
    /// Preferred strategy
    pub strategy: Option<String>,
}

/// Body for `POST /search`
#[derive(Debug, Deserialize)]
pub struct SearchBody {
    pub query: String,
    pub top_k: Option<usize>,
    #[serde(default)]
    pub filters: Option<Filters>,
    pub strategy: Option<String>,
}

/// Search response
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub request_id: String,
    pub query: String,
    pub preferred_strategy: SearchStrategy,
    pub strategy_used: SearchStrategy,
    pub fallback: bool,
    pub cached: bool,
    pub number_of_results: usize,
    pub results: Vec<SearchResult>,
    pub attempts: Vec<StrategyAttempt>,
}

/// Statistics response
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub total_searches: u64,
    pub fallbacks: BTreeMap<SearchStrategy, u64>,
    pub fallbacks_since: DateTime<Utc>,
    pub strategies: BTreeMap<SearchStrategy, StrategyStats>,
    pub cache_entries: Option<u64>,
}

/// Body for `POST /documents`
#[derive(Debug, Deserialize)]
pub struct DocumentsBody {
    pub documents: Vec<IndexedDocument>,
}

/// Search via query string
pub async fn search_get(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, ApiError> {
    let request = build_request(
        &state,
        params.q.unwrap_or_default(),
        params.top_k,
        params.strategy.as_deref(),
        None,
    )?;
    Ok(Json(run_search(&state, request).await))
}

/// Search via JSON body
pub async fn search_post(
    State(state): State<AppState>,
    Json(body): Json<SearchBody>,
) -> Result<Json<SearchResponse>, ApiError> {
    let request = build_request(
        &state,
        body.query,
        body.top_k,
        body.strategy.as_deref(),
        body.filters,
    )?;
    Ok(Json(run_search(&state, request).await))
}

/// Validate inputs and fill in configured defaults
fn build_request(
    state: &AppState,
    query: String,
    top_k: Option<usize>,
    strategy: Option<&str>,
    filters: Option<Filters>,
) -> Result<SearchRequest, ApiError> {
    let search_settings = &state.settings.search;

    let query = query.trim();
    if query.is_empty() {
        return Err(ApiError::bad_request("query must not be empty"));
    }

    let top_k = top_k.unwrap_or(search_settings.default_top_k);
    if top_k == 0 || top_k > search_settings.max_top_k {
        return Err(ApiError::bad_request(format!(
            "top_k must be between 1 and {}",
            search_settings.max_top_k
        )));
    }

    let strategy = match strategy {
        Some(s) => s
            .parse::<SearchStrategy>()
            .map_err(|e| ApiError::bad_request(e.to_string()))?,
        None => search_settings.default_strategy,
    };

    let mut request = SearchRequest::new(query)
        .with_top_k(top_k)
        .with_strategy(strategy);
    request.filters = filters;
    Ok(request)
}

async fn run_search(state: &AppState, request: SearchRequest) -> SearchResponse {
    let request_id = Uuid::new_v4().to_string();

    let cached = match state.cache.as_ref() {
        Some(cache) => cache.get(&request).await,
        None => None,
    };
    let is_cached = cached.is_some();

    let outcome = match cached {
        Some(outcome) => {
            debug!("[{}] Cache hit for '{}'", request_id, request.query);
            outcome
        }
        None => {
            let outcome = state.search.execute(&request).await;
            if let Some(cache) = state.cache.as_ref() {
                cache.set(&request, &outcome).await;
            }
            outcome
        }
    };

    info!(
        "[{}] '{}' served by {} ({} results, preferred {})",
        request_id,
        request.query,
        outcome.strategy_used,
        outcome.results.len(),
        outcome.preferred_strategy
    );

    SearchResponse {
        request_id,
        query: request.query,
        preferred_strategy: outcome.preferred_strategy,
        strategy_used: outcome.strategy_used,
        fallback: outcome.used_fallback(),
        cached: is_cached,
        number_of_results: outcome.results.len(),
        results: outcome.results,
        attempts: outcome.attempts,
    }
}

/// Fallback and per-strategy statistics
pub async fn stats(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(collect_stats(&state).await)
}

/// Zero the fallback counters
pub async fn reset_stats(State(state): State<AppState>) -> Json<StatsResponse> {
    state.search.reset_stats();
    *state.stats_since.write().await = Utc::now();
    Json(collect_stats(&state).await)
}

async fn collect_stats(state: &AppState) -> StatsResponse {
    let metrics = state.search.metrics();
    StatsResponse {
        total_searches: metrics.get_total_searches(),
        fallbacks: state.search.get_fallback_stats(),
        fallbacks_since: *state.stats_since.read().await,
        strategies: metrics.get_strategy_stats(),
        cache_entries: state.cache.as_ref().map(|c| c.size()),
    }
}

/// Add documents to the local keyword index
pub async fn index_documents(
    State(state): State<AppState>,
    Json(body): Json<DocumentsBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let index = state
        .keyword
        .as_ref()
        .ok_or_else(|| ApiError::unavailable("keyword index is disabled"))?;

    if body.documents.iter().any(|d| d.id.trim().is_empty()) {
        return Err(ApiError::bad_request("document id must not be empty"));
    }

    let received = body.documents.len();
    let total = index.index_documents(body.documents).await;

    // Cached outcomes may no longer match the corpus
    if let Some(cache) = state.cache.as_ref() {
        cache.clear();
    }

    Ok(Json(serde_json::json!({
        "indexed": received,
        "total": total,
    })))
}

/// Health check handler
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let (keyword_indexed, documents) = match state.keyword.as_ref() {
        Some(index) => (index.indexed(), index.len().await),
        None => (false, 0),
    };

    Json(serde_json::json!({
        "status": "ok",
        "version": crate::VERSION,
        "instance_name": state.instance_name(),
        "keyword_indexed": keyword_indexed,
        "documents": documents,
    }))
}
