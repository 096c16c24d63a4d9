//! Settings structures for robust-search configuration

use crate::search::SearchStrategy;
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use url::Url;

/// Main settings structure loaded from settings.yml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub server: ServerSettings,
    pub search: SearchSettings,
    pub vector: VectorSettings,
    pub keyword: KeywordSettings,
    pub cache: CacheSettings,
    pub outgoing: OutgoingSettings,
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse settings from a YAML string
    pub fn from_yaml(content: &str) -> Result<Self> {
        let settings: Settings = serde_yaml::from_str(content)?;
        Ok(settings)
    }

    /// Merge with environment variables (RAG_SEARCH_* prefix)
    pub fn merge_env(&mut self) {
        self.merge_vars(|key| std::env::var(key).ok());
    }

    /// Merge overrides from an arbitrary variable source
    pub(crate) fn merge_vars<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = var("RAG_SEARCH_DEBUG") {
            self.general.debug = val.parse().unwrap_or(false);
        }
        if let Some(val) = var("RAG_SEARCH_PORT") {
            if let Ok(port) = val.parse() {
                self.server.port = port;
            }
        }
        if let Some(val) = var("RAG_SEARCH_BIND_ADDRESS") {
            self.server.bind_address = val;
        }
        if let Some(val) = var("RAG_SEARCH_VECTOR_URL") {
            self.vector.url = val;
        }
        if let Some(val) = var("RAG_SEARCH_VECTOR_API_KEY") {
            self.vector.api_key = Some(val);
        }
        if let Some(val) = var("RAG_SEARCH_DEFAULT_STRATEGY") {
            if let Ok(strategy) = val.parse() {
                self.search.default_strategy = strategy;
            }
        }
    }

    /// Check that the settings are usable
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.vector.url)
            .map_err(|e| anyhow::anyhow!("Invalid vector backend URL '{}': {}", self.vector.url, e))?;
        if !matches!(url.scheme(), "http" | "https") {
            bail!("Vector backend URL must be http or https: {}", self.vector.url);
        }

        if self.search.max_top_k == 0 {
            bail!("search.max_top_k must be at least 1");
        }
        if self.search.default_top_k == 0 || self.search.default_top_k > self.search.max_top_k {
            bail!(
                "search.default_top_k must be between 1 and {}",
                self.search.max_top_k
            );
        }
        check_timeout("vector.timeout", self.vector.timeout)?;
        check_timeout("outgoing.request_timeout", self.outgoing.request_timeout)?;

        Ok(())
    }
}

/// Upper bound for any configured timeout, in seconds
pub const MAX_TIMEOUT_SECS: f64 = 3600.0;

fn check_timeout(name: &str, secs: f64) -> Result<()> {
    if !secs.is_finite() || secs <= 0.0 || secs > MAX_TIMEOUT_SECS {
        bail!(
            "{} must be between 0 and {} seconds, got {}",
            name,
            MAX_TIMEOUT_SECS,
            secs
        );
    }
    Ok(())
}

/// General settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Enable debug logging
    pub debug: bool,
    /// Instance name reported by the health endpoint
    pub instance_name: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            debug: false,
            instance_name: "robust-search".to_string(),
        }
    }
}

/// Server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Server port
    pub port: u16,
    /// Bind address
    pub bind_address: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            port: 8890,
            bind_address: "127.0.0.1".to_string(),
        }
    }
}

/// Search behavior settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Strategy used when a request does not name one
    pub default_strategy: SearchStrategy,
    /// Number of results when a request does not name one
    pub default_top_k: usize,
    /// Largest top_k a request may ask for
    pub max_top_k: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            default_strategy: SearchStrategy::Hybrid,
            default_top_k: 10,
            max_top_k: 100,
        }
    }
}

/// Remote vector backend settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorSettings {
    /// Base URL of the vector search service
    pub url: String,
    /// Path of the search endpoint, relative to `url`
    pub search_path: String,
    /// Request timeout in seconds
    pub timeout: f64,
    /// Bearer token if the service requires one
    pub api_key: Option<String>,
}

impl Default for VectorSettings {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:8000".to_string(),
            search_path: "/search".to_string(),
            timeout: 10.0,
            api_key: None,
        }
    }
}

/// Local BM25 keyword index settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeywordSettings {
    /// Build an in-process keyword index
    pub enabled: bool,
    /// JSON lines file of documents to index at startup
    pub corpus_path: Option<PathBuf>,
}

impl Default for KeywordSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            corpus_path: None,
        }
    }
}

/// Response cache settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Cache search responses
    pub enabled: bool,
    /// Time to live in seconds
    pub ttl: u64,
    /// Maximum number of cached responses
    pub max_capacity: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl: 300,
            max_capacity: 10_000,
        }
    }
}

/// Outgoing request settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutgoingSettings {
    /// Default request timeout in seconds
    pub request_timeout: f64,
    /// User agent string (none = crate name and version)
    pub user_agent: Option<String>,
    /// Pool max size
    pub pool_maxsize: usize,
    /// Verify SSL certificates
    pub verify_ssl: bool,
    /// Proxy settings
    pub proxies: ProxySettings,
    /// Extra headers to send
    pub extra_headers: HashMap<String, String>,
}

impl Default for OutgoingSettings {
    fn default() -> Self {
        Self {
            request_timeout: 10.0,
            user_agent: None,
            pool_maxsize: 20,
            verify_ssl: true,
            proxies: ProxySettings::default(),
            extra_headers: HashMap::new(),
        }
    }
}

/// Proxy settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxySettings {
    pub http: Option<String>,
    pub https: Option<String>,
    pub all: Option<String>,
}
