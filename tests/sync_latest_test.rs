//! Incremental front-page sync: candidates newer than the watermark come
//! back, the watermark advances, and it survives an engine rebuild.

use assert_fs::fixture::PathChild;
use async_trait::async_trait;
use linkharvest::config::EngineConfig;
use linkharvest::model::{Candidate, Extraction};
use linkharvest::sources::SourceScraper;
use linkharvest::{Orchestrator, Result};
use std::sync::Arc;
use tempfile::TempDir;

fn test_config(dir: &TempDir) -> EngineConfig {
    let mut config = EngineConfig::default();
    config.cache_path = dir.path().join("cache.sqlite");
    config.state_path = dir.path().join("state.json");
    config
}

/// Front page whose newest-first post list is fixed at construction.
struct FrontPage {
    posts: Vec<String>,
}

impl FrontPage {
    fn new(posts: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            posts: posts.iter().map(|s| s.to_string()).collect(),
        })
    }
}

#[async_trait]
impl SourceScraper for FrontPage {
    fn name(&self) -> &str {
        "FrontPage"
    }

    async fn search(&self, _q: &str, _y: Option<&str>, _max: usize) -> Result<Vec<Candidate>> {
        Ok(Vec::new())
    }

    async fn extract_links(&self, _page_url: &str) -> Result<Extraction> {
        Ok(Extraction::default())
    }

    async fn latest(&self, max: usize) -> Result<Vec<Candidate>> {
        Ok(self
            .posts
            .iter()
            .take(max)
            .map(|url| Candidate {
                raw_title: "Some Movie 2024 1080p".to_string(),
                title: "Some Movie".to_string(),
                year: Some("2024".to_string()),
                quality: "1080P".to_string(),
                page_url: url.clone(),
                source: "FrontPage".to_string(),
                identity: None,
            })
            .collect())
    }
}

#[tokio::test]
async fn first_sync_takes_everything_and_sets_watermark() {
    let dir = assert_fs::TempDir::new().unwrap();
    let mut config = EngineConfig::default();
    config.cache_path = dir.path().join("cache.sqlite");
    config.state_path = dir.path().join("state.json");

    let source = FrontPage::new(&[
        "https://site.example/post/3",
        "https://site.example/post/2",
        "https://site.example/post/1",
    ]);
    let engine = Orchestrator::with_sources(config, vec![source])
        .await
        .unwrap();

    let fresh = engine.sync_latest("FrontPage").await.unwrap();
    assert_eq!(fresh.len(), 3);
    assert!(dir.child("state.json").path().exists());

    // Nothing new on the very next pass.
    let again = engine.sync_latest("FrontPage").await.unwrap();
    assert!(again.is_empty());
}

#[tokio::test]
async fn watermark_cuts_the_listing_and_persists() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir);

    {
        let old = FrontPage::new(&["https://site.example/post/5"]);
        let engine = Orchestrator::with_sources(config.clone(), vec![old])
            .await
            .unwrap();
        assert_eq!(engine.sync_latest("FrontPage").await.unwrap().len(), 1);
    }

    // Rebuild with two newer posts above the watermarked one.
    let newer = FrontPage::new(&[
        "https://site.example/post/7",
        "https://site.example/post/6",
        "https://site.example/post/5",
        "https://site.example/post/4",
    ]);
    let engine = Orchestrator::with_sources(config, vec![newer])
        .await
        .unwrap();

    let fresh = engine.sync_latest("FrontPage").await.unwrap();
    assert_eq!(fresh.len(), 2);
    assert_eq!(fresh[0].page_url, "https://site.example/post/7");
    assert_eq!(fresh[1].page_url, "https://site.example/post/6");
}

#[tokio::test]
async fn sync_for_unknown_source_is_an_error() {
    let dir = TempDir::new().unwrap();
    let engine = Orchestrator::with_sources(test_config(&dir), Vec::new())
        .await
        .unwrap();
    let err = engine.sync_latest("Nope").await.unwrap_err();
    assert!(matches!(err, linkharvest::Error::UnknownSource { .. }));
}
