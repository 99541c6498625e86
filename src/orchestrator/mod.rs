//! Multi-source orchestration.
//!
//! Fans operations out across every enabled source, tolerating partial
//! failure: one slow or broken site contributes nothing and is logged, it
//! never sinks a sibling. Broad operations consult the result cache before
//! touching the network; concurrent populate races are tolerated, last
//! write wins.

use crate::cache::{CacheClass, ResultCache};
use crate::config::EngineConfig;
use crate::driver::SharedDriver;
use crate::error::{Error, Result};
use crate::fetch::FetchClient;
use crate::identity::CatalogClient;
use crate::model::{Candidate, Extraction, ResolutionResult};
use crate::resolver::LinkResolver;
use crate::sources::{build_sources, SourceScraper};
use crate::state::SyncState;
use crate::util::{normalize_page_url, strip_query};
use futures::future::join_all;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct Orchestrator {
    config: EngineConfig,
    driver: SharedDriver,
    resolver: LinkResolver,
    cache: ResultCache,
    state: Arc<SyncState>,
    sources: Vec<Arc<dyn SourceScraper>>,
}

impl Orchestrator {
    /// Build the full engine from configuration. The browser is not
    /// launched here; call [`Orchestrator::start`] before any operation
    /// that may escalate to it.
    pub async fn new(config: EngineConfig) -> Result<Self> {
        let driver = SharedDriver::new(&config);
        let fetch = FetchClient::new(driver.clone())?;
        let catalog = CatalogClient::new(config.catalog.clone())?;
        let sources = build_sources(&config, fetch, catalog);
        Self::assemble(config, driver, sources).await
    }

    /// Build with an injected source set. Used by tests and callers that
    /// bring their own scrapers.
    pub async fn with_sources(
        config: EngineConfig,
        sources: Vec<Arc<dyn SourceScraper>>,
    ) -> Result<Self> {
        let driver = SharedDriver::new(&config);
        Self::assemble(config, driver, sources).await
    }

    async fn assemble(
        config: EngineConfig,
        driver: SharedDriver,
        sources: Vec<Arc<dyn SourceScraper>>,
    ) -> Result<Self> {
        let resolver = LinkResolver::new(driver.clone(), config.resolve_timeout)?;
        let cache = ResultCache::open_with_ttls(
            &config.cache_path,
            config.search_ttl,
            config.links_ttl,
        )
        .await?;
        let state = Arc::new(SyncState::load(&config.state_path));
        info!(sources = sources.len(), "Engine assembled");
        Ok(Self {
            config,
            driver,
            resolver,
            cache,
            state,
            sources,
        })
    }

    /// Launch (or revive) the shared browser.
    pub async fn start(&self) -> Result<()> {
        self.driver.ensure_started().await
    }

    pub async fn shutdown(&self) {
        self.driver.shutdown().await;
    }

    fn source_by_name(&self, name: &str) -> Result<&Arc<dyn SourceScraper>> {
        self.sources
            .iter()
            .find(|s| s.name() == name)
            .ok_or_else(|| Error::UnknownSource {
                name: name.to_string(),
            })
    }

    /// Search every enabled source concurrently and merge the candidates.
    pub async fn search(&self, query: &str, year: Option<&str>) -> Result<Vec<Candidate>> {
        let cache_key = format!("{query}|{}", year.unwrap_or(""));
        if let Some(hit) = self.cache.get(CacheClass::Search, &cache_key).await? {
            debug!(%query, "Search served from cache");
            return Ok(hit);
        }

        let deduped = self.search_scoped(query, year, None, None).await?;
        self.cache
            .put(CacheClass::Search, &cache_key, &deduped)
            .await?;
        Ok(deduped)
    }

    /// Search a chosen subset of sources with a per-call result cap.
    /// `source_names = None` means every enabled source; `max_per_source`
    /// falls back to the configured limit. Scoped searches skip the shared
    /// cache so a narrowed result set never shadows a full one.
    pub async fn search_scoped(
        &self,
        query: &str,
        year: Option<&str>,
        source_names: Option<&[&str]>,
        max_per_source: Option<usize>,
    ) -> Result<Vec<Candidate>> {
        let selected: Vec<Arc<dyn SourceScraper>> = match source_names {
            Some(names) => names
                .iter()
                .map(|name| self.source_by_name(name).cloned())
                .collect::<Result<_>>()?,
            None => self.sources.clone(),
        };

        let max = max_per_source.unwrap_or(self.config.max_results_per_source);
        let timeout = self.config.search_timeout;
        let tasks = selected.iter().map(|source| {
            let source = Arc::clone(source);
            let query = query.to_string();
            let year = year.map(str::to_string);
            async move {
                let name = source.name().to_string();
                let outcome = tokio::time::timeout(
                    timeout,
                    source.search(&query, year.as_deref(), max),
                )
                .await;
                (name, outcome)
            }
        });

        let mut merged = Vec::new();
        for (name, outcome) in join_all(tasks).await {
            match outcome {
                Ok(Ok(mut candidates)) => {
                    debug!(source = %name, found = candidates.len(), "Source search done");
                    merged.append(&mut candidates);
                }
                Ok(Err(e)) => warn!(source = %name, "Source search failed: {e}"),
                Err(_) => warn!(source = %name, "Source search timed out"),
            }
        }

        Ok(dedup_candidates(merged))
    }

    /// Targeted extraction: one named source, one page.
    pub async fn extract_links(&self, source_name: &str, page_url: &str) -> Result<Extraction> {
        self.source_by_name(source_name)?
            .extract_links(page_url)
            .await
    }

    /// Broad extraction: for every enabled source, search for the title and
    /// deep-extract the top candidate's page. Links flagged
    /// `needs_resolution` are returned as-is; resolving them is the caller's
    /// explicit, separate request.
    pub async fn extract_links_broad(
        &self,
        title: &str,
        year: Option<&str>,
    ) -> Result<Extraction> {
        let cache_key = format!("{title}|{}", year.unwrap_or(""));
        if let Some(hit) = self.cache.get(CacheClass::Links, &cache_key).await? {
            debug!(%title, "Broad extraction served from cache");
            return Ok(hit);
        }

        let timeout = self.config.extract_timeout;
        let tasks = self.sources.iter().map(|source| {
            let source = Arc::clone(source);
            let title = title.to_string();
            let year = year.map(str::to_string);
            async move {
                let name = source.name().to_string();
                let outcome = tokio::time::timeout(
                    timeout,
                    extract_top_candidate(source, &title, year.as_deref()),
                )
                .await;
                (name, outcome)
            }
        });

        let mut extraction = Extraction::default();
        for (name, outcome) in join_all(tasks).await {
            match outcome {
                Ok(Ok(mut partial)) => {
                    debug!(
                        source = %name,
                        links = partial.links.len(),
                        embeds = partial.embeds.len(),
                        "Source extraction done"
                    );
                    extraction.links.append(&mut partial.links);
                    extraction.embeds.append(&mut partial.embeds);
                }
                Ok(Err(e)) => warn!(source = %name, "Source extraction failed: {e}"),
                Err(_) => warn!(source = %name, "Source extraction timed out"),
            }
        }

        extraction.links = crate::extract::dedup_links(extraction.links);
        self.cache
            .put(CacheClass::Links, &cache_key, &extraction)
            .await?;
        Ok(extraction)
    }

    /// Resolve one intermediate-host URL to a direct download.
    pub async fn resolve(&self, url: &str) -> Result<ResolutionResult> {
        self.resolver.resolve(url).await
    }

    /// Incremental front-page sync for one source: returns candidates newer
    /// than the stored watermark and advances it to the newest seen.
    pub async fn sync_latest(&self, source_name: &str) -> Result<Vec<Candidate>> {
        let source = self.source_by_name(source_name)?;
        let latest = source
            .latest(self.config.max_results_per_source)
            .await?;

        let watermark = self.state.watermark(source_name);
        let fresh: Vec<Candidate> = latest
            .into_iter()
            .take_while(|c| {
                watermark
                    .as_deref()
                    .map(|w| normalize_page_url(&c.page_url) != normalize_page_url(w))
                    .unwrap_or(true)
            })
            .collect();

        if let Some(newest) = fresh.first() {
            self.state.advance(source_name, &newest.page_url)?;
        }
        info!(source = source_name, fresh = fresh.len(), "Front-page sync complete");
        Ok(fresh)
    }
}

async fn extract_top_candidate(
    source: Arc<dyn SourceScraper>,
    title: &str,
    year: Option<&str>,
) -> Result<Extraction> {
    let candidates = source.search(title, year, 1).await?;
    let Some(top) = candidates.first() else {
        debug!(source = source.name(), %title, "No candidate found");
        return Ok(Extraction::default());
    };
    source.extract_links(&top.page_url).await
}

/// Merge candidates from all sources: identity id wins when both sides have
/// one, otherwise the normalized page URL. Sources are visited in priority
/// order, so the first occurrence survives.
fn dedup_candidates(candidates: Vec<Candidate>) -> Vec<Candidate> {
    let mut seen_ids = HashSet::new();
    let mut seen_urls = HashSet::new();
    let mut out = Vec::new();
    for candidate in candidates {
        let fresh = match candidate.identity.as_ref() {
            Some(identity) => seen_ids.insert(identity.id),
            None => seen_urls.insert(strip_query(&normalize_page_url(&candidate.page_url))),
        };
        if fresh {
            out.push(candidate);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Identity;

    fn candidate(source: &str, url: &str, identity_id: Option<i64>) -> Candidate {
        Candidate {
            raw_title: "Movie 2020 1080p".to_string(),
            title: "Movie".to_string(),
            year: Some("2020".to_string()),
            quality: "1080P".to_string(),
            page_url: url.to_string(),
            source: source.to_string(),
            identity: identity_id.map(|id| Identity {
                id,
                title: "Movie".to_string(),
                poster_url: None,
                backdrop_url: None,
                rating: 7.0,
                overview: String::new(),
                release_date: "2020-01-01".to_string(),
            }),
        }
    }

    #[test]
    fn dedup_prefers_first_seen_identity() {
        let merged = dedup_candidates(vec![
            candidate("a", "https://a.example/movie/", Some(7)),
            candidate("b", "https://b.example/movie/", Some(7)),
            candidate("b", "https://b.example/other/", Some(8)),
        ]);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].source, "a");
        assert_eq!(merged[1].identity.as_ref().map(|i| i.id), Some(8));
    }

    #[test]
    fn dedup_without_identity_uses_page_url() {
        let merged = dedup_candidates(vec![
            candidate("a", "https://a.example/movie/?ref=1", None),
            candidate("b", "https://a.example/movie/?ref=2", None),
            candidate("b", "https://b.example/movie/", None),
        ]);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].source, "a");
    }
}
