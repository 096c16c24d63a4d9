//! Route definitions

use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Search
        .route(
            "/search",
            get(handlers::search_get).post(handlers::search_post),
        )
        // Statistics
        .route("/stats", get(handlers::stats))
        .route("/stats/reset", post(handlers::reset_stats))
        // Keyword index ingestion
        .route("/documents", post(handlers::index_documents))
        .route("/health", get(handlers::health))
        // Add middleware
        .layer(CompressionLayer::new())
        .layer(cors)
        // Add state
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::{Bm25Index, VectorBackend, VectorMode};
    use crate::config::Settings;
    use crate::search::{Filters, RobustSearch, SearchResult};
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tower::ServiceExt;

    /// Hybrid mode times out, vector-only mode answers
    #[derive(Default)]
    struct FlakyHybrid {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl VectorBackend for FlakyHybrid {
        fn name(&self) -> &str {
            "flaky"
        }

        async fn search(
            &self,
            _query: &str,
            _top_k: usize,
            _filters: Option<&Filters>,
            mode: VectorMode,
        ) -> anyhow::Result<Vec<SearchResult>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match mode {
                VectorMode::Hybrid => Err(anyhow::anyhow!("TimeoutError")),
                VectorMode::VectorOnly => Ok(vec![SearchResult::new("c1", 0.8)]),
            }
        }
    }

    fn app(settings: Settings, vector: Arc<FlakyHybrid>, keyword: Option<Arc<Bm25Index>>) -> Router {
        let mut search = RobustSearch::new(vector);
        if let Some(ref index) = keyword {
            search = search
                .with_keyword(index.clone())
                .with_document_store(index.clone());
        }
        create_router(AppState::from_parts(settings, search, keyword))
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_search_reports_fallback() {
        let app = app(Settings::default(), Arc::new(FlakyHybrid::default()), None);

        let (status, body) = send(&app, get_request("/search?q=refunds&top_k=5")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["preferred_strategy"], "hybrid");
        assert_eq!(body["strategy_used"], "vector_only");
        assert_eq!(body["fallback"], true);
        assert_eq!(body["cached"], false);
        assert_eq!(body["number_of_results"], 1);
        assert_eq!(body["results"][0]["id"], "c1");
        assert_eq!(body["attempts"][0]["strategy"], "hybrid");
        assert_eq!(body["attempts"][0]["status"], "failed");
        assert_eq!(body["attempts"][1]["status"], "served");

        let (_, stats) = send(&app, get_request("/stats")).await;
        assert_eq!(stats["fallbacks"]["vector_only"], 1);
        assert_eq!(stats["fallbacks"]["hybrid"], 0);
        assert_eq!(stats["total_searches"], 1);
        assert_eq!(stats["strategies"]["hybrid"]["failures"], 1);
    }

    #[tokio::test]
    async fn test_repeated_search_is_cached() {
        let vector = Arc::new(FlakyHybrid::default());
        let app = app(Settings::default(), vector.clone(), None);

        send(&app, get_request("/search?q=refunds")).await;
        let (_, body) = send(&app, get_request("/search?q=refunds")).await;

        assert_eq!(body["cached"], true);
        assert_eq!(body["strategy_used"], "vector_only");
        assert_eq!(vector.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_invalid_input_is_rejected() {
        let mut settings = Settings::default();
        settings.cache.enabled = false;
        let app = app(settings, Arc::new(FlakyHybrid::default()), None);

        let (status, body) = send(&app, get_request("/search?q=%20")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("query"));

        let (status, _) = send(&app, get_request("/search?q=x&top_k=0")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&app, get_request("/search?q=x&top_k=101")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(&app, get_request("/search?q=x&strategy=psychic")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("psychic"));
    }

    #[tokio::test]
    async fn test_post_search_rejects_out_of_range_top_k() {
        let mut settings = Settings::default();
        settings.cache.enabled = false;
        let vector = Arc::new(FlakyHybrid::default());
        let app = app(settings, vector.clone(), None);

        let (status, body) = send(
            &app,
            post_json(
                "/search",
                json!({"query": "refunds", "top_k": 500, "filters": {"tenant": "acme"}}),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("top_k"));
        assert_eq!(vector.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_query_whitespace_is_trimmed() {
        let vector = Arc::new(FlakyHybrid::default());
        let app = app(Settings::default(), vector.clone(), None);

        let (_, first) = send(&app, get_request("/search?q=refunds")).await;
        let (_, second) = send(&app, get_request("/search?q=refunds%20%20")).await;

        assert_eq!(first["query"], "refunds");
        assert_eq!(second["query"], "refunds");
        assert_eq!(second["cached"], true);
        assert_eq!(vector.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_reset_stats() {
        let mut settings = Settings::default();
        settings.cache.enabled = false;
        let app = app(settings, Arc::new(FlakyHybrid::default()), None);

        send(&app, get_request("/search?q=a")).await;
        let (status, body) = send(&app, post_json("/stats/reset", json!({}))).await;

        assert_eq!(status, StatusCode::OK);
        for strategy in ["hybrid", "vector_only", "keyword_only", "simple"] {
            assert_eq!(body["fallbacks"][strategy], 0);
        }
    }

    #[tokio::test]
    async fn test_documents_feed_keyword_search() {
        let mut settings = Settings::default();
        settings.cache.enabled = false;
        let index = Arc::new(Bm25Index::new());
        let app = app(settings, Arc::new(FlakyHybrid::default()), Some(index));

        let (_, health) = send(&app, get_request("/health")).await;
        assert_eq!(health["keyword_indexed"], false);

        let (status, body) = send(
            &app,
            post_json(
                "/documents",
                json!({"documents": [
                    {"id": "kb-1", "text": "invoices are sent monthly", "source": "billing.md"},
                    {"id": "kb-2", "text": "passwords can be reset from settings"}
                ]}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["indexed"], 2);
        assert_eq!(body["total"], 2);

        let (_, body) = send(
            &app,
            post_json(
                "/search",
                json!({"query": "monthly invoices", "strategy": "keyword_only", "top_k": 3}),
            ),
        )
        .await;
        assert_eq!(body["strategy_used"], "keyword_only");
        assert_eq!(body["fallback"], false);
        assert_eq!(body["results"][0]["id"], "kb-1");
        assert_eq!(body["results"][0]["text"], "invoices are sent monthly");
        assert_eq!(body["results"][0]["source"], "bm25");

        let (_, health) = send(&app, get_request("/health")).await;
        assert_eq!(health["keyword_indexed"], true);
        assert_eq!(health["documents"], 2);
    }

    #[tokio::test]
    async fn test_documents_without_index_unavailable() {
        let app = app(Settings::default(), Arc::new(FlakyHybrid::default()), None);

        let (status, _) = send(
            &app,
            post_json("/documents", json!({"documents": [{"id": "a", "text": "b"}]})),
        )
        .await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }
}
