//! HTTP networking module
//!
//! Provides HTTP client functionality for talking to remote search backends.

mod client;
mod types;

pub use client::HttpClient;
pub use types::{HttpRequest, HttpResponse};
