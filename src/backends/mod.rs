//! Search backend module
//!
//! Defines the traits the fallback coordinator calls, plus the HTTP vector
//! backend and the in-process BM25 index that implement them.

mod keyword_index;
mod loader;
mod traits;
mod vector_http;

pub use keyword_index::{read_corpus, Bm25Index};
pub use loader::{BackendLoader, Backends};
pub use traits::*;
pub use vector_http::HttpVectorBackend;
