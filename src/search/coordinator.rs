//! Fallback search coordination

use super::executor::{StrategyExecutor, StrategyPlan};
use super::models::{
    AttemptStatus, Filters, SearchOutcome, SearchRequest, SearchResult, StrategyAttempt,
};
use super::stats::FallbackStats;
use super::strategy::SearchStrategy;
use crate::backends::{DocumentStore, KeywordBackend, VectorBackend};
use crate::metrics::Metrics;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Search service that walks a strategy's fallback chain until one produces results.
///
/// Strategies are tried one after another, never raced, so the first strategy
/// in the chain with any results always wins. A strategy that errors is
/// treated the same as one that returns nothing. When the whole chain comes up
/// empty the outcome is an empty list tagged [`SearchStrategy::Simple`].
pub struct RobustSearch {
    executor: StrategyExecutor,
    stats: FallbackStats,
    metrics: Arc<Metrics>,
}

impl RobustSearch {
    /// Create a new service around a vector backend
    pub fn new(vector: Arc<dyn VectorBackend>) -> Self {
        Self::with_executor(StrategyExecutor::new(vector))
    }

    /// Create a new service around a prepared executor
    pub fn with_executor(executor: StrategyExecutor) -> Self {
        Self {
            executor,
            stats: FallbackStats::new(),
            metrics: Arc::new(Metrics::new()),
        }
    }

    /// Attach a keyword index
    pub fn with_keyword(mut self, keyword: Arc<dyn KeywordBackend>) -> Self {
        self.executor = self.executor.with_keyword(keyword);
        self
    }

    /// Attach a store used to fill in text for keyword results
    pub fn with_document_store(mut self, documents: Arc<dyn DocumentStore>) -> Self {
        self.executor = self.executor.with_document_store(documents);
        self
    }

    /// Share a metrics collector
    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Metrics collected by this service
    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.metrics
    }

    /// The keyword index, if any
    pub fn keyword(&self) -> Option<&Arc<dyn KeywordBackend>> {
        self.executor.keyword()
    }

    /// Search with a preferred strategy, returning the results and the strategy that served them
    pub async fn search(
        &self,
        query: &str,
        top_k: usize,
        filters: Option<Filters>,
        preferred: SearchStrategy,
    ) -> (Vec<SearchResult>, SearchStrategy) {
        let mut request = SearchRequest::new(query)
            .with_top_k(top_k)
            .with_strategy(preferred);
        request.filters = filters;

        self.execute(&request).await.into_parts()
    }

    /// Run a request through its fallback chain
    pub async fn execute(&self, request: &SearchRequest) -> SearchOutcome {
        let preferred = request.preferred_strategy;
        let chain = preferred.fallback_chain();
        let mut attempts = Vec::with_capacity(chain.len());

        self.metrics.inc_search();
        debug!(
            "Searching '{}' (top_k={}) with chain {:?}",
            request.query, request.top_k, chain
        );

        for &strategy in chain {
            let start = Instant::now();
            let result = self
                .executor
                .execute(StrategyPlan::new(strategy, request))
                .await;
            let elapsed_ms = start.elapsed().as_millis() as u64;
            self.metrics.record_attempt(strategy, elapsed_ms);

            let status = match result {
                Ok(results) if !results.is_empty() => {
                    self.metrics.record_success(strategy);
                    attempts.push(StrategyAttempt {
                        strategy,
                        status: AttemptStatus::Served {
                            count: results.len(),
                        },
                        elapsed_ms,
                    });

                    if strategy != preferred {
                        self.stats.record(strategy);
                        info!(
                            "Fallback to {} served '{}' ({} results, preferred {})",
                            strategy,
                            request.query,
                            results.len(),
                            preferred
                        );
                    } else {
                        debug!("{} returned {} results in {}ms", strategy, results.len(), elapsed_ms);
                    }

                    return SearchOutcome {
                        results,
                        strategy_used: strategy,
                        preferred_strategy: preferred,
                        attempts,
                    };
                }
                Ok(_) => {
                    self.metrics.record_empty(strategy);
                    debug!("{} returned no results, trying next strategy", strategy);
                    AttemptStatus::Empty
                }
                Err(e) => {
                    self.metrics.record_error(strategy);
                    if e.is_unavailable() {
                        debug!("{} skipped: {}", strategy, e);
                    } else {
                        warn!("{} search failed: {}", strategy, e);
                    }
                    AttemptStatus::Failed {
                        error: e.to_string(),
                    }
                }
            };

            attempts.push(StrategyAttempt {
                strategy,
                status,
                elapsed_ms,
            });
        }

        warn!(
            "All strategies failed for '{}' (preferred {})",
            request.query, preferred
        );

        SearchOutcome {
            results: Vec::new(),
            strategy_used: SearchStrategy::Simple,
            preferred_strategy: preferred,
            attempts,
        }
    }

    /// How often each strategy served a request as a fallback
    pub fn get_fallback_stats(&self) -> BTreeMap<SearchStrategy, u64> {
        self.stats.snapshot()
    }

    /// Zero the fallback counters
    pub fn reset_stats(&self) {
        self.stats.reset();
        info!("Fallback statistics reset");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::{KeywordBackend, VectorBackend, VectorMode};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// What a scripted backend does for one mode
    #[derive(Clone)]
    enum Reply {
        Results(Vec<SearchResult>),
        Fail(&'static str),
    }

    /// Vector backend scripted per mode, recording the modes it was asked for
    struct ScriptedVector {
        hybrid: Reply,
        vector_only: Reply,
        calls: Mutex<Vec<VectorMode>>,
    }

    impl ScriptedVector {
        fn new(hybrid: Reply, vector_only: Reply) -> Self {
            Self {
                hybrid,
                vector_only,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<VectorMode> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl VectorBackend for ScriptedVector {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn search(
            &self,
            _query: &str,
            _top_k: usize,
            _filters: Option<&Filters>,
            mode: VectorMode,
        ) -> anyhow::Result<Vec<SearchResult>> {
            self.calls.lock().unwrap().push(mode);
            let reply = match mode {
                VectorMode::Hybrid => &self.hybrid,
                VectorMode::VectorOnly => &self.vector_only,
            };
            match reply {
                Reply::Results(results) => Ok(results.clone()),
                Reply::Fail(message) => Err(anyhow::anyhow!(*message)),
            }
        }
    }

    struct ScriptedKeyword {
        reply: Reply,
        calls: AtomicUsize,
    }

    impl ScriptedKeyword {
        fn new(reply: Reply) -> Self {
            Self {
                reply,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl KeywordBackend for ScriptedKeyword {
        fn name(&self) -> &str {
            "scripted"
        }

        fn indexed(&self) -> bool {
            true
        }

        async fn search(&self, _query: &str, _top_k: usize) -> anyhow::Result<Vec<(String, f32)>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.reply {
                Reply::Results(results) => Ok(results.iter().map(|r| (r.id.clone(), r.score)).collect()),
                Reply::Fail(message) => Err(anyhow::anyhow!(*message)),
            }
        }
    }

    fn hits(ids: &[&str]) -> Reply {
        Reply::Results(ids.iter().map(|id| SearchResult::new(*id, 0.5)).collect())
    }

    fn none() -> Reply {
        Reply::Results(vec![])
    }

    fn all_zero(stats: &BTreeMap<SearchStrategy, u64>) -> bool {
        stats.len() == 4 && stats.values().all(|&count| count == 0)
    }

    #[tokio::test]
    async fn test_preferred_strategy_serves() {
        let vector = Arc::new(ScriptedVector::new(hits(&["h1", "h2"]), hits(&["v1"])));
        let search = RobustSearch::new(vector.clone());

        let (results, strategy) = search.search("q", 5, None, SearchStrategy::Hybrid).await;

        assert_eq!(strategy, SearchStrategy::Hybrid);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id, "h1");
        assert_eq!(vector.calls(), vec![VectorMode::Hybrid]);
        assert!(all_zero(&search.get_fallback_stats()));
    }

    #[tokio::test]
    async fn test_hybrid_timeout_falls_back_to_vector_only() {
        let vector = Arc::new(ScriptedVector::new(
            Reply::Fail("TimeoutError: hybrid search timed out"),
            Reply::Results(vec![SearchResult::new("c1", 0.8)]),
        ));
        let search = RobustSearch::new(vector);

        let (results, strategy) = search.search("q", 5, None, SearchStrategy::Hybrid).await;

        assert_eq!(results, vec![SearchResult::new("c1", 0.8)]);
        assert_eq!(
            serde_json::to_value(&results).unwrap(),
            serde_json::json!([{"id": "c1", "score": 0.8f32}])
        );
        assert_eq!(strategy, SearchStrategy::VectorOnly);

        let stats = search.get_fallback_stats();
        assert_eq!(stats[&SearchStrategy::VectorOnly], 1);
        assert_eq!(stats[&SearchStrategy::Hybrid], 0);
        assert_eq!(stats[&SearchStrategy::KeywordOnly], 0);
        assert_eq!(stats[&SearchStrategy::Simple], 0);
    }

    #[tokio::test]
    async fn test_empty_results_trigger_fallback() {
        let vector = Arc::new(ScriptedVector::new(none(), none()));
        let keyword = Arc::new(ScriptedKeyword::new(hits(&["k1"])));
        let search = RobustSearch::new(vector.clone()).with_keyword(keyword.clone());

        let outcome = search
            .execute(&SearchRequest::new("q").with_strategy(SearchStrategy::Hybrid))
            .await;

        assert_eq!(outcome.strategy_used, SearchStrategy::KeywordOnly);
        assert!(outcome.used_fallback());
        assert_eq!(outcome.results[0].id, "k1");
        assert_eq!(vector.calls(), vec![VectorMode::Hybrid, VectorMode::VectorOnly]);
        assert_eq!(keyword.calls.load(Ordering::SeqCst), 1);

        let statuses: Vec<_> = outcome.attempts.iter().map(|a| (a.strategy, a.status.clone())).collect();
        assert_eq!(
            statuses,
            vec![
                (SearchStrategy::Hybrid, AttemptStatus::Empty),
                (SearchStrategy::VectorOnly, AttemptStatus::Empty),
                (SearchStrategy::KeywordOnly, AttemptStatus::Served { count: 1 }),
            ]
        );
        assert_eq!(search.get_fallback_stats()[&SearchStrategy::KeywordOnly], 1);
    }

    #[tokio::test]
    async fn test_all_failed_returns_simple() {
        let vector = Arc::new(ScriptedVector::new(Reply::Fail("down"), none()));
        let keyword = Arc::new(ScriptedKeyword::new(Reply::Fail("index corrupt")));
        let search = RobustSearch::new(vector).with_keyword(keyword);

        let outcome = search
            .execute(&SearchRequest::new("q").with_strategy(SearchStrategy::VectorOnly))
            .await;

        assert!(outcome.results.is_empty());
        assert_eq!(outcome.strategy_used, SearchStrategy::Simple);
        assert_eq!(outcome.attempts.len(), 4);
        assert_eq!(
            outcome.attempts.last().map(|a| (a.strategy, a.status.clone())),
            Some((SearchStrategy::Simple, AttemptStatus::Empty))
        );
        assert!(matches!(
            outcome.attempts[0].status,
            AttemptStatus::Empty
        ));
        assert!(matches!(
            outcome.attempts[1].status,
            AttemptStatus::Failed { .. }
        ));
        assert!(all_zero(&search.get_fallback_stats()));
    }

    #[tokio::test]
    async fn test_keyword_preferred_without_index_falls_to_hybrid() {
        let vector = Arc::new(ScriptedVector::new(hits(&["h1"]), hits(&["v1"])));
        let search = RobustSearch::new(vector);

        let (results, strategy) = search.search("q", 3, None, SearchStrategy::KeywordOnly).await;

        assert_eq!(strategy, SearchStrategy::Hybrid);
        assert_eq!(results[0].id, "h1");
        assert_eq!(search.get_fallback_stats()[&SearchStrategy::Hybrid], 1);
    }

    #[tokio::test]
    async fn test_simple_preferred_tries_nothing_else() {
        let vector = Arc::new(ScriptedVector::new(hits(&["h1"]), hits(&["v1"])));
        let search = RobustSearch::new(vector.clone());

        let (results, strategy) = search.search("q", 3, None, SearchStrategy::Simple).await;

        assert!(results.is_empty());
        assert_eq!(strategy, SearchStrategy::Simple);
        assert!(vector.calls().is_empty());
    }

    #[tokio::test]
    async fn test_reset_stats() {
        let vector = Arc::new(ScriptedVector::new(Reply::Fail("down"), hits(&["v1"])));
        let search = RobustSearch::new(vector);

        search.search("a", 5, None, SearchStrategy::Hybrid).await;
        search.search("b", 5, None, SearchStrategy::Hybrid).await;
        assert_eq!(search.get_fallback_stats()[&SearchStrategy::VectorOnly], 2);

        search.reset_stats();
        assert!(all_zero(&search.get_fallback_stats()));
    }

    #[tokio::test]
    async fn test_metrics_follow_attempts() {
        let vector = Arc::new(ScriptedVector::new(Reply::Fail("down"), hits(&["v1"])));
        let search = RobustSearch::new(vector);

        search.search("q", 5, None, SearchStrategy::Hybrid).await;

        let metrics = search.metrics();
        assert_eq!(metrics.get_total_searches(), 1);

        let stats = metrics.get_strategy_stats();
        assert_eq!(stats[&SearchStrategy::Hybrid].attempts, 1);
        assert_eq!(stats[&SearchStrategy::Hybrid].failures, 1);
        assert_eq!(stats[&SearchStrategy::VectorOnly].successes, 1);
        assert_eq!(stats[&SearchStrategy::KeywordOnly].attempts, 0);
    }

    #[tokio::test]
    async fn test_concurrent_searches_share_counters() {
        let vector = Arc::new(ScriptedVector::new(Reply::Fail("down"), hits(&["v1"])));
        let search = Arc::new(RobustSearch::new(vector));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let search = search.clone();
                tokio::spawn(async move {
                    search
                        .search(&format!("q{}", i), 5, None, SearchStrategy::Hybrid)
                        .await
                })
            })
            .collect();

        for handle in futures::future::join_all(handles).await {
            let (_, strategy) = handle.unwrap();
            assert_eq!(strategy, SearchStrategy::VectorOnly);
        }

        assert_eq!(search.get_fallback_stats()[&SearchStrategy::VectorOnly], 8);
    }
}
