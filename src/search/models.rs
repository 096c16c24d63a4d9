//! Search request, result and outcome models

use super::strategy::SearchStrategy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Backend-specific metadata filters
pub type Filters = HashMap<String, serde_json::Value>;

/// A single search request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    /// The search query string
    pub query: String,
    /// Number of results wanted
    pub top_k: usize,
    /// Optional metadata filters passed to the vector backend
    #[serde(default)]
    pub filters: Option<Filters>,
    /// Strategy to try first
    #[serde(default)]
    pub preferred_strategy: SearchStrategy,
}

impl SearchRequest {
    /// Create a request with the default strategy and top_k of 10
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            top_k: 10,
            filters: None,
            preferred_strategy: SearchStrategy::default(),
        }
    }

    /// Set the number of results, clamped to at least one
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k.max(1);
        self
    }

    /// Set metadata filters
    pub fn with_filters(mut self, filters: Filters) -> Self {
        self.filters = Some(filters);
        self
    }

    /// Set the preferred strategy
    pub fn with_strategy(mut self, strategy: SearchStrategy) -> Self {
        self.preferred_strategy = strategy;
        self
    }

    /// Check if query is empty
    pub fn is_empty(&self) -> bool {
        self.query.trim().is_empty()
    }
}

/// A retrieved chunk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Result identifier
    pub id: String,
    /// Identifier of the matched chunk
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub chunk_id: String,
    /// Similarity or relevance score
    #[serde(default)]
    pub score: f32,
    /// Matched text, empty when the backend does not return it
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub text: String,
    /// Provenance tag (backend or document source)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub source: String,
    /// Any other fields the backend returned
    #[serde(flatten)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl SearchResult {
    /// Create a result with only an id and a score
    pub fn new(id: impl Into<String>, score: f32) -> Self {
        Self {
            id: id.into(),
            chunk_id: String::new(),
            score,
            text: String::new(),
            source: String::new(),
            metadata: HashMap::new(),
        }
    }

    pub fn with_chunk_id(mut self, chunk_id: impl Into<String>) -> Self {
        self.chunk_id = chunk_id.into();
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }
}

/// What happened when a strategy was tried
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AttemptStatus {
    /// The strategy produced this many results and served the request
    Served { count: usize },
    /// The strategy ran but found nothing
    Empty,
    /// The strategy failed
    Failed { error: String },
}

/// A single step of the fallback chain
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyAttempt {
    pub strategy: SearchStrategy,
    #[serde(flatten)]
    pub status: AttemptStatus,
    /// Time spent in the strategy in milliseconds
    pub elapsed_ms: u64,
}

/// Result of running a request through the fallback chain
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchOutcome {
    /// Results from the serving strategy
    pub results: Vec<SearchResult>,
    /// Strategy that produced the results, `Simple` if none did
    pub strategy_used: SearchStrategy,
    /// Strategy the caller asked for
    pub preferred_strategy: SearchStrategy,
    /// Every strategy tried, in order
    pub attempts: Vec<StrategyAttempt>,
}

impl SearchOutcome {
    /// Whether a strategy other than the preferred one served the request
    pub fn used_fallback(&self) -> bool {
        self.strategy_used != self.preferred_strategy
    }

    /// Split into the results and the serving strategy
    pub fn into_parts(self) -> (Vec<SearchResult>, SearchStrategy) {
        (self.results, self.strategy_used)
    }
}
