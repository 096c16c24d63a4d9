//! robust-search: ordered fallback search for RAG retrieval
//!
//! Answers a query by walking a fixed chain of search strategies (hybrid,
//! vector-only, keyword-only, simple) over a vector backend and an optional
//! BM25 index, stopping at the first strategy that returns results.

pub mod backends;
pub mod cache;
pub mod config;
pub mod metrics;
pub mod network;
pub mod search;
pub mod web;

pub use config::Settings;
pub use search::{RobustSearch, SearchOutcome, SearchRequest, SearchResult, SearchStrategy};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
