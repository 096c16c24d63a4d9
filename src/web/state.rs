//! Application state shared across handlers

use crate::backends::{Backends, Bm25Index};
use crate::cache::ResultCache;
use crate::config::Settings;
use crate::search::RobustSearch;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Global settings
    pub settings: Arc<Settings>,
    /// Fallback search service
    pub search: Arc<RobustSearch>,
    /// Local keyword index, when enabled
    pub keyword: Option<Arc<Bm25Index>>,
    /// Response cache, when enabled
    pub cache: Option<Arc<ResultCache>>,
    /// When the fallback counters were last reset
    pub stats_since: Arc<RwLock<DateTime<Utc>>>,
}

impl AppState {
    /// Create new application state from loaded backends
    pub fn new(settings: Settings, backends: Backends) -> Self {
        let keyword = backends.keyword.clone();
        let search = backends.into_search();
        Self::from_parts(settings, search, keyword)
    }

    /// Create application state around an existing search service
    pub fn from_parts(
        settings: Settings,
        search: RobustSearch,
        keyword: Option<Arc<Bm25Index>>,
    ) -> Self {
        let cache = settings.cache.enabled.then(|| {
            Arc::new(ResultCache::new(
                settings.cache.ttl,
                settings.cache.max_capacity,
            ))
        });

        Self {
            settings: Arc::new(settings),
            search: Arc::new(search),
            keyword,
            cache,
            stats_since: Arc::new(RwLock::new(Utc::now())),
        }
    }

    /// Get instance name
    pub fn instance_name(&self) -> &str {
        &self.settings.general.instance_name
    }
}
