//! Configuration types for the engine.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Which concrete scraper implementation a registry entry maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Mediator-chain site: movie page -> shortener pages -> locker URLs.
    SkyStream,
    /// Generic pattern-scan site: locker links scattered through the page.
    HdVault,
    /// Direct-host site: locker links grouped under quality headers.
    CineVault,
}

/// One entry of the source registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub name: String,
    pub kind: SourceKind,
    pub base_url: String,
    pub enabled: bool,
    /// Explicit dedup priority for the broad search path; lower wins.
    pub priority: u32,
}

/// External catalog (identity lookup) endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    pub base_url: String,
    pub api_key: String,
    pub poster_base: String,
    pub backdrop_base: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.themoviedb.org/3".to_string(),
            api_key: String::new(),
            poster_base: "https://image.tmdb.org/t/p/w500".to_string(),
            backdrop_base: "https://image.tmdb.org/t/p/original".to_string(),
        }
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Run the shared browser headless.
    pub headless: bool,
    /// Admission pool for page fetch/search/extract browser work.
    pub fetch_pool: usize,
    /// Admission pool for multi-step resolution sessions. Held far longer
    /// than fetch permits, so sized smaller.
    pub resolve_pool: usize,
    pub max_results_per_source: usize,
    /// Per-source timeout for the search fan-out.
    pub search_timeout: Duration,
    /// Per-source timeout for deep extraction in the broad path.
    pub extract_timeout: Duration,
    /// Overall budget for one resolution call.
    pub resolve_timeout: Duration,
    pub cache_path: PathBuf,
    pub state_path: PathBuf,
    /// TTL for cached raw search results.
    pub search_ttl: Duration,
    /// TTL for cached resolved-link sets. Link pages churn slower than
    /// search rankings, so this is the longer of the two.
    pub links_ttl: Duration,
    pub catalog: CatalogConfig,
    pub sources: Vec<SourceConfig>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let data_dir = dirs::cache_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("linkharvest");
        Self {
            headless: true,
            fetch_pool: 4,
            resolve_pool: 2,
            max_results_per_source: 20,
            search_timeout: Duration::from_secs(30),
            extract_timeout: Duration::from_secs(60),
            resolve_timeout: Duration::from_secs(90),
            cache_path: data_dir.join("result_cache.sqlite"),
            state_path: data_dir.join("sync_state.json"),
            search_ttl: Duration::from_secs(24 * 60 * 60),
            links_ttl: Duration::from_secs(7 * 24 * 60 * 60),
            catalog: CatalogConfig::default(),
            sources: Vec::new(),
        }
    }
}
