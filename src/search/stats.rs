//! Fallback statistics

use super::strategy::SearchStrategy;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counts how often each strategy served a request it was not preferred for.
///
/// Counters are owned by one service instance. Increments never get lost, but
/// a snapshot or reset taken while searches are in flight may miss them.
#[derive(Debug, Default)]
pub struct FallbackStats {
    counts: [AtomicU64; 4],
}

impl FallbackStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `strategy` served a request as a fallback
    pub fn record(&self, strategy: SearchStrategy) {
        self.counts[strategy.index()].fetch_add(1, Ordering::Relaxed);
    }

    /// Count for a single strategy
    pub fn get(&self, strategy: SearchStrategy) -> u64 {
        self.counts[strategy.index()].load(Ordering::Relaxed)
    }

    /// Counts for all four strategies
    pub fn snapshot(&self) -> BTreeMap<SearchStrategy, u64> {
        SearchStrategy::ALL
            .iter()
            .map(|&strategy| (strategy, self.get(strategy)))
            .collect()
    }

    /// Total number of fallbacks across strategies
    pub fn total(&self) -> u64 {
        self.counts.iter().map(|c| c.load(Ordering::Relaxed)).sum()
    }

    /// Zero every counter
    pub fn reset(&self) {
        for count in &self.counts {
            count.store(0, Ordering::Relaxed);
        }
    }
}
