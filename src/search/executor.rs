//! Strategy execution against the configured backends

use super::error::SearchError;
use super::models::{Filters, SearchRequest, SearchResult};
use super::strategy::SearchStrategy;
use crate::backends::{DocumentStore, KeywordBackend, VectorBackend, VectorMode};
use std::sync::Arc;
use tracing::{debug, warn};

/// Provenance tag for results coming from the keyword index
pub const KEYWORD_SOURCE: &str = "bm25";

/// Work to perform for one strategy, carrying only what its backend needs
#[derive(Debug, Clone, Copy)]
pub enum StrategyPlan<'a> {
    Vector {
        mode: VectorMode,
        query: &'a str,
        top_k: usize,
        filters: Option<&'a Filters>,
    },
    Keyword {
        query: &'a str,
        top_k: usize,
    },
    Simple,
}

impl<'a> StrategyPlan<'a> {
    /// Build the plan for `strategy` from a request
    pub fn new(strategy: SearchStrategy, request: &'a SearchRequest) -> Self {
        match strategy {
            SearchStrategy::Hybrid => Self::Vector {
                mode: VectorMode::Hybrid,
                query: &request.query,
                top_k: request.top_k,
                filters: request.filters.as_ref(),
            },
            SearchStrategy::VectorOnly => Self::Vector {
                mode: VectorMode::VectorOnly,
                query: &request.query,
                top_k: request.top_k,
                filters: request.filters.as_ref(),
            },
            SearchStrategy::KeywordOnly => Self::Keyword {
                query: &request.query,
                top_k: request.top_k,
            },
            SearchStrategy::Simple => Self::Simple,
        }
    }
}

/// Runs a single strategy against its backend
pub struct StrategyExecutor {
    vector: Arc<dyn VectorBackend>,
    keyword: Option<Arc<dyn KeywordBackend>>,
    documents: Option<Arc<dyn DocumentStore>>,
}

impl StrategyExecutor {
    /// Create an executor with only a vector backend
    pub fn new(vector: Arc<dyn VectorBackend>) -> Self {
        Self {
            vector,
            keyword: None,
            documents: None,
        }
    }

    /// Attach a keyword index
    pub fn with_keyword(mut self, keyword: Arc<dyn KeywordBackend>) -> Self {
        self.keyword = Some(keyword);
        self
    }

    /// Attach a store used to fill in text for keyword results
    pub fn with_document_store(mut self, documents: Arc<dyn DocumentStore>) -> Self {
        self.documents = Some(documents);
        self
    }

    /// The keyword index, if any
    pub fn keyword(&self) -> Option<&Arc<dyn KeywordBackend>> {
        self.keyword.as_ref()
    }

    /// Execute a plan
    pub async fn execute(&self, plan: StrategyPlan<'_>) -> Result<Vec<SearchResult>, SearchError> {
        match plan {
            StrategyPlan::Vector {
                mode,
                query,
                top_k,
                filters,
            } => self
                .vector
                .search(query, top_k, filters, mode)
                .await
                .map_err(SearchError::Vector),
            StrategyPlan::Keyword { query, top_k } => self.keyword_search(query, top_k).await,
            StrategyPlan::Simple => Ok(Vec::new()),
        }
    }

    async fn keyword_search(&self, query: &str, top_k: usize) -> Result<Vec<SearchResult>, SearchError> {
        let keyword = match self.keyword.as_ref() {
            Some(keyword) if keyword.indexed() => keyword,
            _ => return Err(SearchError::BackendUnavailable("keyword")),
        };

        let hits = keyword
            .search(query, top_k)
            .await
            .map_err(SearchError::Keyword)?;

        let mut results: Vec<SearchResult> = hits
            .into_iter()
            .map(|(id, score)| {
                SearchResult::new(id.clone(), score)
                    .with_chunk_id(id)
                    .with_source(KEYWORD_SOURCE)
            })
            .collect();

        if let Some(documents) = self.documents.as_ref() {
            if !results.is_empty() {
                self.hydrate(documents.as_ref(), &mut results).await;
            }
        }

        Ok(results)
    }

    /// Fill in result text from the document store
    async fn hydrate(&self, documents: &dyn DocumentStore, results: &mut [SearchResult]) {
        let ids: Vec<String> = results.iter().map(|r| r.id.clone()).collect();

        match documents.fetch_texts(&ids).await {
            Ok(mut texts) => {
                for result in results.iter_mut() {
                    if let Some(text) = texts.remove(&result.id) {
                        result.text = text;
                    }
                }
                debug!("Hydrated {} keyword results", ids.len());
            }
            Err(e) => {
                warn!("Failed to hydrate keyword results: {:#}", e);
            }
        }
    }
}
