//! Backend loader for initializing backends from configuration

use super::keyword_index::{read_corpus, Bm25Index};
use super::traits::{KeywordBackend, VectorBackend};
use super::vector_http::HttpVectorBackend;
use crate::config::Settings;
use crate::network::HttpClient;
use crate::search::RobustSearch;
use anyhow::Result;
use std::sync::Arc;
use tracing::info;

/// Backends built from settings
pub struct Backends {
    /// Vector search backend
    pub vector: Arc<dyn VectorBackend>,
    /// Local keyword index, when enabled
    pub keyword: Option<Arc<Bm25Index>>,
}

impl Backends {
    /// Wire the backends into a fallback search service.
    ///
    /// The keyword index doubles as the document store that fills in text
    /// for keyword results.
    pub fn into_search(self) -> RobustSearch {
        let search = RobustSearch::new(self.vector);
        match self.keyword {
            Some(index) => search
                .with_keyword(index.clone())
                .with_document_store(index),
            None => search,
        }
    }
}

/// Loader for initializing backends from configuration
pub struct BackendLoader;

impl BackendLoader {
    /// Build all backends from settings, indexing the startup corpus if one is configured
    pub async fn load(settings: &Settings, client: HttpClient) -> Result<Backends> {
        let vector = HttpVectorBackend::new(client, &settings.vector)?;
        info!("Vector backend {}: {}", vector.name(), vector.endpoint());

        let keyword = if settings.keyword.enabled {
            let index = Arc::new(Bm25Index::new());
            info!("Keyword backend {} enabled", index.name());

            if let Some(ref path) = settings.keyword.corpus_path {
                let documents = read_corpus(path)?;
                info!(
                    "Loading {} documents from {}",
                    documents.len(),
                    path.display()
                );
                index.index_documents(documents).await;
            }

            Some(index)
        } else {
            info!("Keyword index disabled");
            None
        };

        Ok(Backends {
            vector: Arc::new(vector),
            keyword,
        })
    }
}
