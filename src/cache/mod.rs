//! Caching module for robust-search
//!
//! Caches search outcomes served over HTTP so repeated queries skip the backends.

use crate::search::{SearchOutcome, SearchRequest, SearchStrategy};
use moka::future::Cache;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::warn;

/// Cache for serialized search outcomes
pub struct ResultCache {
    cache: Cache<String, Vec<u8>>,
}

impl ResultCache {
    /// Create a new result cache with specified TTL
    pub fn new(ttl_seconds: u64, max_capacity: u64) -> Self {
        let cache = Cache::builder()
            .time_to_live(Duration::from_secs(ttl_seconds))
            .max_capacity(max_capacity)
            .build();

        Self { cache }
    }

    /// Get a cached outcome
    pub async fn get(&self, request: &SearchRequest) -> Option<SearchOutcome> {
        let bytes = self.cache.get(&request_cache_key(request)).await?;
        match serde_json::from_slice(&bytes) {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                warn!("Dropping unreadable cache entry: {}", e);
                None
            }
        }
    }

    /// Store an outcome. Outcomes without results are not cached.
    pub async fn set(&self, request: &SearchRequest, outcome: &SearchOutcome) {
        if outcome.results.is_empty() {
            return;
        }
        match serde_json::to_vec(outcome) {
            Ok(bytes) => self.cache.insert(request_cache_key(request), bytes).await,
            Err(e) => warn!("Failed to serialize outcome for cache: {}", e),
        }
    }

    /// Clear the entire cache
    pub fn clear(&self) {
        self.cache.invalidate_all();
    }

    /// Get cache size
    pub fn size(&self) -> u64 {
        self.cache.entry_count()
    }
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new(300, 10000) // 5 minutes TTL, 10k max entries
    }
}

/// Fields of a request that select its outcome
#[derive(Serialize)]
struct CacheKey<'a> {
    query: &'a str,
    top_k: usize,
    strategy: SearchStrategy,
    filters: Option<BTreeMap<&'a str, &'a serde_json::Value>>,
}

/// Generate a cache key for a search request.
///
/// The request is hashed through its JSON encoding so that field boundaries
/// stay unambiguous; filters are sorted so key order does not matter.
pub fn request_cache_key(request: &SearchRequest) -> String {
    let key = CacheKey {
        query: &request.query,
        top_k: request.top_k,
        strategy: request.preferred_strategy,
        filters: request
            .filters
            .as_ref()
            .map(|filters| filters.iter().map(|(k, v)| (k.as_str(), v)).collect()),
    };

    let mut hasher = Sha256::new();
    match serde_json::to_vec(&key) {
        Ok(bytes) => hasher.update(bytes),
        // String-keyed maps of JSON values always serialize
        Err(_) => hasher.update(format!("{:?}", request).as_bytes()),
    }

    format!("{:x}", hasher.finalize())
}
