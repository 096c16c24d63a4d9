//! In-process BM25 keyword index

use super::traits::{DocumentStore, IndexedDocument, KeywordBackend};
use anyhow::{Context, Result};
use async_trait::async_trait;
use bm25::{Document, Language, SearchEngine, SearchEngineBuilder};
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use tracing::{debug, info};

struct Inner {
    documents: HashMap<String, IndexedDocument>,
    engine: SearchEngine<String>,
}

/// Keyword index using the BM25 ranking function.
///
/// The index reports itself as not indexed until at least one document has
/// been ingested. Documents are upserted one at a time, so ingestion cost
/// grows with the batch rather than the whole corpus.
pub struct Bm25Index {
    inner: RwLock<Inner>,
    indexed: AtomicBool,
}

impl Bm25Index {
    pub fn new() -> Self {
        let empty: Vec<Document<String>> = Vec::new();
        Self {
            inner: RwLock::new(Inner {
                documents: HashMap::new(),
                engine: SearchEngineBuilder::<String>::with_documents(Language::English, empty)
                    .build(),
            }),
            indexed: AtomicBool::new(false),
        }
    }

    /// Add or replace documents. Returns the corpus size.
    pub async fn index_documents(&self, documents: Vec<IndexedDocument>) -> usize {
        let added = documents.len();
        let mut inner = self.inner.write().await;

        for document in documents {
            inner.engine.upsert(Document {
                id: document.id.clone(),
                contents: document.text.clone(),
            });
            inner.documents.insert(document.id.clone(), document);
        }

        let total = inner.documents.len();
        if total > 0 {
            self.indexed.store(true, Ordering::Release);
            info!("Indexed {} documents ({} total)", added, total);
        }
        total
    }

    /// Number of documents in the corpus
    pub async fn len(&self) -> usize {
        self.inner.read().await.documents.len()
    }

    /// Check if the corpus is empty
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for Bm25Index {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeywordBackend for Bm25Index {
    fn name(&self) -> &str {
        "bm25"
    }

    fn indexed(&self) -> bool {
        self.indexed.load(Ordering::Acquire)
    }

    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<(String, f32)>> {
        if !self.indexed() {
            anyhow::bail!("keyword index has no documents");
        }

        let inner = self.inner.read().await;
        let hits: Vec<(String, f32)> = inner
            .engine
            .search(query, top_k)
            .into_iter()
            .map(|hit| (hit.document.id, hit.score))
            .collect();

        debug!("BM25 matched {} documents for '{}'", hits.len(), query);
        Ok(hits)
    }
}

#[async_trait]
impl DocumentStore for Bm25Index {
    async fn fetch_texts(&self, ids: &[String]) -> Result<HashMap<String, String>> {
        let inner = self.inner.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| {
                inner
                    .documents
                    .get(id)
                    .map(|d| (id.clone(), d.text.clone()))
            })
            .collect())
    }
}

/// Read a JSON lines corpus file, one `{"id", "text", "source"}` object per line
pub fn read_corpus<P: AsRef<Path>>(path: P) -> Result<Vec<IndexedDocument>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read corpus {}", path.display()))?;

    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(n, line)| {
            serde_json::from_str(line)
                .with_context(|| format!("{}:{}: invalid document", path.display(), n + 1))
        })
        .collect()
}
