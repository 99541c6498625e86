//! Tier dispatch behavior observable without a browser: canonical-host
//! transforms complete with zero network calls, and unrecognized hosts are
//! refused immediately as failure values.

use linkharvest::config::EngineConfig;
use linkharvest::Orchestrator;
use tempfile::TempDir;

fn test_config(dir: &TempDir) -> EngineConfig {
    let mut config = EngineConfig::default();
    config.cache_path = dir.path().join("cache.sqlite");
    config.state_path = dir.path().join("state.json");
    config
}

async fn engine(dir: &TempDir) -> Orchestrator {
    Orchestrator::with_sources(test_config(dir), Vec::new())
        .await
        .expect("engine assembles")
}

#[tokio::test]
async fn gdrive_url_resolves_by_pure_transform() {
    let dir = TempDir::new().unwrap();
    let engine = engine(&dir).await;

    // No start() call: a transform-tier host must not need the driver.
    let result = engine
        .resolve("https://drive.google.com/d/XYZ789/view")
        .await
        .unwrap();

    assert!(result.success);
    assert_eq!(
        result.direct_url.as_deref(),
        Some("https://drive.google.com/uc?export=download&id=XYZ789")
    );
    assert_eq!(result.original_url, "https://drive.google.com/d/XYZ789/view");
    assert!(result.error.is_none());
}

#[tokio::test]
async fn pixeldrain_url_resolves_by_pure_transform() {
    let dir = TempDir::new().unwrap();
    let engine = engine(&dir).await;

    let result = engine
        .resolve("https://pixeldrain.com/u/abc123")
        .await
        .unwrap();

    assert!(result.success);
    assert_eq!(
        result.direct_url.as_deref(),
        Some("https://pixeldrain.com/api/file/abc123")
    );
}

#[tokio::test]
async fn unknown_host_fails_immediately_with_value() {
    let dir = TempDir::new().unwrap();
    let engine = engine(&dir).await;

    let result = engine
        .resolve("https://totally-unknown.example/file/1")
        .await
        .unwrap();

    assert!(!result.success);
    assert!(result.direct_url.is_none());
    assert_eq!(result.original_url, "https://totally-unknown.example/file/1");
    let error = result.error.unwrap();
    assert!(error.contains("totally-unknown.example"), "error was: {error}");
}

#[tokio::test]
async fn browser_tier_without_driver_fails_fast() {
    let dir = TempDir::new().unwrap();
    let engine = engine(&dir).await;

    // hubdrive is a browser-tier host; without start() the call must
    // return DriverNotReady rather than blocking on a launch.
    let err = engine
        .resolve("https://hubdrive.space/file/99")
        .await
        .unwrap_err();
    assert!(matches!(err, linkharvest::Error::DriverNotReady));
}

#[test]
fn selector_artifacts_are_inspectable() {
    assert!(!linkharvest::CLICK_CANDIDATES.is_empty());
    assert!(linkharvest::CLICK_KEYWORDS.contains(&"download"));
}
