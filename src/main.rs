//! robust-search: ordered fallback search for RAG retrieval
//!
//! This is the main entry point for the HTTP service.

use anyhow::Result;
use robust_search::{
    backends::BackendLoader,
    config,
    network::HttpClient,
    web::{create_router, AppState},
};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let Some(config_path) = parse_args()? else {
        return Ok(());
    };

    // Load configuration
    let settings_path = config::locate(config_path.as_deref())?;
    let settings = config::load_from(settings_path.as_deref())?;

    // Initialize logging
    let default_level = if settings.general.debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    info!("Starting robust-search v{}", robust_search::VERSION);
    match settings_path {
        Some(ref path) => info!("Loaded settings from: {}", path.display()),
        None => info!("No settings file found, using defaults"),
    }
    info!(
        "Default strategy {}, top_k {} (max {})",
        settings.search.default_strategy, settings.search.default_top_k, settings.search.max_top_k
    );

    // Initialize HTTP client
    let client = HttpClient::with_settings(&settings.outgoing)?;
    info!("HTTP client initialized");

    // Load backends
    let backends = BackendLoader::load(&settings, client).await?;

    // Create application state
    let state = AppState::new(settings.clone(), backends);
    info!("Application state initialized");

    // Create router
    let app = create_router(state);

    // Bind address
    let addr = SocketAddr::new(
        settings.server.bind_address.parse()?,
        settings.server.port,
    );

    info!("Starting server on http://{}", addr);

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Parse command line arguments.
///
/// Returns `None` when the program should exit after printing help or version,
/// otherwise the optional settings path.
fn parse_args() -> Result<Option<Option<PathBuf>>> {
    let mut args = std::env::args().skip(1);
    let mut config_path = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-c" | "--config" => {
                let path = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("{} requires a file path", arg))?;
                config_path = Some(PathBuf::from(path));
            }
            "-h" | "--help" => {
                print_usage();
                return Ok(None);
            }
            "-V" | "--version" => {
                println!("robust-search {}", robust_search::VERSION);
                return Ok(None);
            }
            other => {
                print_usage();
                anyhow::bail!("Unknown argument: {}", other);
            }
        }
    }

    Ok(Some(config_path))
}

/// Print usage information
fn print_usage() {
    println!(
        r#"
robust-search v{}
Ordered fallback search over vector and BM25 backends

USAGE:
    robust-search [OPTIONS]

OPTIONS:
    -c, --config <FILE>    Path to configuration file
    -h, --help             Print help information
    -V, --version          Print version information

ENVIRONMENT VARIABLES:
    RAG_SEARCH_SETTINGS_PATH     Path to settings.yml
    RAG_SEARCH_DEBUG             Enable debug logging (true/false)
    RAG_SEARCH_PORT              Server port
    RAG_SEARCH_BIND_ADDRESS      Bind address
    RAG_SEARCH_VECTOR_URL        Vector search service URL
    RAG_SEARCH_VECTOR_API_KEY    Bearer token for the vector service
    RAG_SEARCH_DEFAULT_STRATEGY  hybrid, vector_only, keyword_only or simple
    RUST_LOG                     Log filter, overrides the debug setting
"#,
        robust_search::VERSION
    );
}
