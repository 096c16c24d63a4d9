//! Web server module
//!
//! Provides the HTTP API around the fallback search service.

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
