//! Backend traits and types

use crate::search::{Filters, SearchResult};
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Retrieval mode requested from a vector backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VectorMode {
    Hybrid,
    VectorOnly,
}

impl VectorMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hybrid => "hybrid",
            Self::VectorOnly => "vector_only",
        }
    }
}

impl fmt::Display for VectorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Vector (and vector + keyword hybrid) search backend
#[async_trait]
pub trait VectorBackend: Send + Sync {
    /// Backend name
    fn name(&self) -> &str;

    /// Search for the `top_k` best chunks
    async fn search(
        &self,
        query: &str,
        top_k: usize,
        filters: Option<&Filters>,
        mode: VectorMode,
    ) -> Result<Vec<SearchResult>>;
}

/// Keyword (BM25) index
#[async_trait]
pub trait KeywordBackend: Send + Sync {
    /// Backend name
    fn name(&self) -> &str;

    /// Whether the index has been built and can answer queries
    fn indexed(&self) -> bool;

    /// Search the index, returning (identifier, score) pairs best first
    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<(String, f32)>>;
}

/// Storage that can return the text of indexed chunks
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch texts for the given ids. Unknown ids are left out of the map.
    async fn fetch_texts(&self, ids: &[String]) -> Result<HashMap<String, String>>;
}

/// A document ingested into a keyword index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedDocument {
    /// Chunk identifier
    pub id: String,
    /// Chunk text
    pub text: String,
    /// Where the chunk came from
    #[serde(default)]
    pub source: Option<String>,
}

impl IndexedDocument {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            source: None,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}
