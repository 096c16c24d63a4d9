//! Errors raised while executing a single strategy

use thiserror::Error;

/// Failure of one strategy. The coordinator treats every variant as
/// "this strategy contributed nothing" and moves on.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The collaborator for the strategy is missing or not ready
    #[error("{0} backend not available")]
    BackendUnavailable(&'static str),

    /// The vector backend failed
    #[error("vector backend failed: {0:#}")]
    Vector(anyhow::Error),

    /// The keyword backend failed
    #[error("keyword backend failed: {0:#}")]
    Keyword(anyhow::Error),
}

impl SearchError {
    /// Whether the error comes from a missing backend rather than a failing one
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::BackendUnavailable(_))
    }
}
