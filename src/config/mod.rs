//! Engine configuration and the source registry.
//!
//! Defaults are compiled in; every knob can be overridden through
//! environment variables so deployments can rotate source domains without
//! a rebuild (the sites move domains constantly).

mod types;

pub use types::{CatalogConfig, EngineConfig, SourceConfig, SourceKind};

use std::path::PathBuf;
use std::time::Duration;

fn env_string(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
        .unwrap_or(default)
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl EngineConfig {
    /// Build a configuration from environment variables, falling back to the
    /// compiled-in defaults for anything unset.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        cfg.headless = env_bool("LINKHARVEST_HEADLESS", cfg.headless);
        cfg.fetch_pool = env_u64("LINKHARVEST_FETCH_POOL", cfg.fetch_pool as u64) as usize;
        cfg.resolve_pool = env_u64("LINKHARVEST_RESOLVE_POOL", cfg.resolve_pool as u64) as usize;
        cfg.max_results_per_source =
            env_u64("LINKHARVEST_MAX_RESULTS", cfg.max_results_per_source as u64) as usize;
        cfg.search_timeout =
            Duration::from_secs(env_u64("LINKHARVEST_SEARCH_TIMEOUT_SECS", 30));
        cfg.extract_timeout =
            Duration::from_secs(env_u64("LINKHARVEST_EXTRACT_TIMEOUT_SECS", 60));
        cfg.resolve_timeout =
            Duration::from_secs(env_u64("LINKHARVEST_RESOLVE_TIMEOUT_SECS", 90));

        if let Ok(dir) = std::env::var("LINKHARVEST_DATA_DIR") {
            let dir = PathBuf::from(dir);
            cfg.cache_path = dir.join("result_cache.sqlite");
            cfg.state_path = dir.join("sync_state.json");
        }

        cfg.catalog.base_url = env_string("CATALOG_URL", &cfg.catalog.base_url);
        cfg.catalog.api_key = env_string("CATALOG_API_KEY", &cfg.catalog.api_key);

        cfg.sources = vec![
            SourceConfig {
                name: "SkyStream".to_string(),
                kind: SourceKind::SkyStream,
                base_url: env_string("SKYSTREAM_URL", "https://skystream.example"),
                enabled: env_bool("SKYSTREAM_ENABLED", true),
                priority: 1,
            },
            SourceConfig {
                name: "HdVault".to_string(),
                kind: SourceKind::HdVault,
                base_url: env_string("HDVAULT_URL", "https://hdvault.example"),
                enabled: env_bool("HDVAULT_ENABLED", true),
                priority: 2,
            },
            SourceConfig {
                name: "CineVault".to_string(),
                kind: SourceKind::CineVault,
                base_url: env_string("CINEVAULT_URL", "https://cinevault.example"),
                enabled: env_bool("CINEVAULT_ENABLED", true),
                priority: 3,
            },
        ];

        cfg
    }

    /// Enabled sources in ascending priority order (lowest value first).
    pub fn enabled_sources(&self) -> Vec<&SourceConfig> {
        let mut sources: Vec<&SourceConfig> = self.sources.iter().filter(|s| s.enabled).collect();
        sources.sort_by_key(|s| s.priority);
        sources
    }
}
