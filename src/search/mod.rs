//! Search orchestration module
//!
//! Walks a fallback chain of strategies over the vector and keyword
//! backends, and keeps track of which strategy served each request.

mod coordinator;
mod error;
mod executor;
mod models;
mod stats;
mod strategy;

pub use coordinator::RobustSearch;
pub use error::SearchError;
pub use executor::{StrategyExecutor, StrategyPlan, KEYWORD_SOURCE};
pub use models::*;
pub use stats::FallbackStats;
pub use strategy::SearchStrategy;
