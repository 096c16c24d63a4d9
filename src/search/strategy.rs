//! Search strategies and their fallback chains

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Method used to answer a search query
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum SearchStrategy {
    /// Vector similarity blended with keyword matching
    #[default]
    Hybrid,
    /// Vector similarity only
    VectorOnly,
    /// BM25 keyword matching only
    KeywordOnly,
    /// Last resort placeholder, never produces results
    Simple,
}

impl SearchStrategy {
    /// Every strategy, in declaration order
    pub const ALL: [SearchStrategy; 4] = [
        SearchStrategy::Hybrid,
        SearchStrategy::VectorOnly,
        SearchStrategy::KeywordOnly,
        SearchStrategy::Simple,
    ];

    /// Snake-case tag used on the wire and in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hybrid => "hybrid",
            Self::VectorOnly => "vector_only",
            Self::KeywordOnly => "keyword_only",
            Self::Simple => "simple",
        }
    }

    /// Position in [`SearchStrategy::ALL`], used to index per-strategy counters
    pub(crate) fn index(&self) -> usize {
        match self {
            Self::Hybrid => 0,
            Self::VectorOnly => 1,
            Self::KeywordOnly => 2,
            Self::Simple => 3,
        }
    }

    /// Ordered strategies to attempt when `self` is preferred.
    ///
    /// The preferred strategy always comes first and `Simple` always last.
    /// The order in between is a fixed precedence table.
    pub fn fallback_chain(self) -> &'static [SearchStrategy] {
        use SearchStrategy::*;

        match self {
            Hybrid => &[Hybrid, VectorOnly, KeywordOnly, Simple],
            VectorOnly => &[VectorOnly, Hybrid, KeywordOnly, Simple],
            KeywordOnly => &[KeywordOnly, Hybrid, VectorOnly, Simple],
            Simple => &[Simple],
        }
    }
}

impl fmt::Display for SearchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchStrategy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hybrid" => Ok(Self::Hybrid),
            "vector_only" | "vector" => Ok(Self::VectorOnly),
            "keyword_only" | "keyword" | "bm25" => Ok(Self::KeywordOnly),
            "simple" => Ok(Self::Simple),
            other => Err(anyhow::anyhow!("Unknown search strategy: {}", other)),
        }
    }
}
