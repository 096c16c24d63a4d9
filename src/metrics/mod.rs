//! Metrics collection module
//!
//! Tracks per-strategy attempts, outcomes and response times.

use crate::search::SearchStrategy;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for a single strategy
#[derive(Debug, Default)]
struct StrategyCounters {
    attempts: AtomicU64,
    successes: AtomicU64,
    empties: AtomicU64,
    failures: AtomicU64,
    total_time_ms: AtomicU64,
}

/// Metrics collector owned by a search service
#[derive(Debug, Default)]
pub struct Metrics {
    /// Total search count
    total_searches: AtomicU64,
    strategies: [StrategyCounters; 4],
}

impl Metrics {
    /// Create a new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment total search count
    pub fn inc_search(&self) {
        self.total_searches.fetch_add(1, Ordering::Relaxed);
    }

    fn counters(&self, strategy: SearchStrategy) -> &StrategyCounters {
        &self.strategies[strategy.index()]
    }

    /// Record that a strategy was tried and how long it took
    pub fn record_attempt(&self, strategy: SearchStrategy, time_ms: u64) {
        let counters = self.counters(strategy);
        counters.attempts.fetch_add(1, Ordering::Relaxed);
        counters.total_time_ms.fetch_add(time_ms, Ordering::Relaxed);
    }

    /// Record a strategy that returned results
    pub fn record_success(&self, strategy: SearchStrategy) {
        self.counters(strategy).successes.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a strategy that returned nothing
    pub fn record_empty(&self, strategy: SearchStrategy) {
        self.counters(strategy).empties.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a strategy that failed
    pub fn record_error(&self, strategy: SearchStrategy) {
        self.counters(strategy).failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Get total searches
    pub fn get_total_searches(&self) -> u64 {
        self.total_searches.load(Ordering::Relaxed)
    }

    /// Get average response time for a strategy
    pub fn get_avg_response_time(&self, strategy: SearchStrategy) -> Option<u64> {
        let counters = self.counters(strategy);
        let attempts = counters.attempts.load(Ordering::Relaxed);
        if attempts == 0 {
            None
        } else {
            Some(counters.total_time_ms.load(Ordering::Relaxed) / attempts)
        }
    }

    /// Get reliability percentage for a strategy (attempts that did not fail)
    pub fn get_reliability(&self, strategy: SearchStrategy) -> f64 {
        let counters = self.counters(strategy);
        let attempts = counters.attempts.load(Ordering::Relaxed);
        let failures = counters.failures.load(Ordering::Relaxed);

        if attempts == 0 {
            100.0
        } else {
            (attempts.saturating_sub(failures) as f64 / attempts as f64) * 100.0
        }
    }

    /// Get statistics for every strategy
    pub fn get_strategy_stats(&self) -> BTreeMap<SearchStrategy, StrategyStats> {
        SearchStrategy::ALL
            .iter()
            .map(|&strategy| {
                let counters = self.counters(strategy);
                (
                    strategy,
                    StrategyStats {
                        attempts: counters.attempts.load(Ordering::Relaxed),
                        successes: counters.successes.load(Ordering::Relaxed),
                        empties: counters.empties.load(Ordering::Relaxed),
                        failures: counters.failures.load(Ordering::Relaxed),
                        avg_response_time_ms: self.get_avg_response_time(strategy),
                        reliability: self.get_reliability(strategy),
                    },
                )
            })
            .collect()
    }
}

/// Statistics for a single strategy
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategyStats {
    pub attempts: u64,
    pub successes: u64,
    pub empties: u64,
    pub failures: u64,
    pub avg_response_time_ms: Option<u64>,
    pub reliability: f64,
}
