//! SkyStream variant against a canned site: search listing parse, relevance
//! filtering, title cleansing, and the mediator-hop link extraction.

use linkharvest::config::{CatalogConfig, EngineConfig};
use linkharvest::sources::{SkyStream, SourceScraper};
use linkharvest::{CatalogClient, FetchClient, SharedDriver};

fn fetch_client() -> FetchClient {
    let driver = SharedDriver::new(&EngineConfig::default());
    FetchClient::new(driver).unwrap()
}

fn catalog_client() -> CatalogClient {
    // Empty API key: identity lookup is skipped, candidates stay lexical.
    CatalogClient::new(CatalogConfig::default()).unwrap()
}

#[tokio::test]
async fn search_parses_listing_and_filters_relevance() {
    let mut server = mockito::Server::new_async().await;
    let listing = r#"
        <article><h2 class="entry-title">
            <a href="/movie/inception-2010/">Inception 2010 1080p BluRay Hindi Dubbed</a>
        </h2></article>
        <article><h2 class="entry-title">
            <a href="/movie/unrelated/">Completely Different Film 2019</a>
        </h2></article>
    "#;
    let _m = server
        .mock("GET", "/")
        .match_query(mockito::Matcher::Regex("s=".to_string()))
        .with_status(200)
        .with_body(listing)
        .create_async()
        .await;

    let source = SkyStream::new(
        "SkyStream".to_string(),
        server.url(),
        fetch_client(),
        catalog_client(),
    );

    let candidates = source.search("Inception", Some("2010"), 10).await.unwrap();
    assert_eq!(candidates.len(), 1);
    let c = &candidates[0];
    assert_eq!(c.title, "Inception");
    assert_eq!(c.year.as_deref(), Some("2010"));
    assert_eq!(c.quality, "1080P");
    assert!(c.page_url.ends_with("/movie/inception-2010/"));
    assert!(c.identity.is_none());
}

#[tokio::test]
async fn extract_follows_mediator_pages_for_locker_urls() {
    let mut server = mockito::Server::new_async().await;
    let base = server.url();

    // Movie page links to one mediator; the locker URL lives one hop away.
    let movie_page = format!(
        r#"
        <h4>1080p Hindi Dubbed</h4>
        <a href="{base}/howblogs.xyz/go1">Download 1080p</a>
        <a href="https://gofile.io/d/direct0">Direct GoFile</a>
        <iframe src="https://streamtape.example/embed/xyz"></iframe>
        "#
    );
    let mediator_page = r#"
        <a href="https://hubdrive.space/file/111">HubDrive</a>
        <a href="https://drive.google.com/d/FILE1/view">GDrive Instant</a>
    "#;

    let _movie = server
        .mock("GET", "/movie/inception-2010/")
        .with_status(200)
        .with_body(movie_page)
        .create_async()
        .await;
    let _mediator = server
        .mock("GET", "/howblogs.xyz/go1")
        .with_status(200)
        .with_body(mediator_page)
        .create_async()
        .await;

    let source = SkyStream::new(
        "SkyStream".to_string(),
        base.clone(),
        fetch_client(),
        catalog_client(),
    );

    let extraction = source
        .extract_links(&format!("{base}/movie/inception-2010/"))
        .await
        .unwrap();

    let urls: Vec<&str> = extraction.links.iter().map(|l| l.url.as_str()).collect();
    assert!(
        urls.contains(&"https://hubdrive.space/file/111"),
        "mediator hop missing: {urls:?}"
    );
    assert!(urls.contains(&"https://gofile.io/d/direct0"));
    assert!(urls.contains(&"https://drive.google.com/d/FILE1/view"));

    let hubdrive = extraction
        .links
        .iter()
        .find(|l| l.url.contains("hubdrive"))
        .unwrap();
    assert!(hubdrive.needs_resolution);
    assert_eq!(hubdrive.source, "SkyStream");

    let gdrive = extraction
        .links
        .iter()
        .find(|l| l.url.contains("drive.google"))
        .unwrap();
    assert!(!gdrive.needs_resolution);

    assert_eq!(extraction.embeds.len(), 1);
    assert!(extraction.embeds[0].url.contains("streamtape"));
}

#[tokio::test]
async fn latest_reads_front_page_in_order() {
    let mut server = mockito::Server::new_async().await;
    let front = r#"
        <article><h2 class="entry-title"><a href="/movie/new-release/">New Release 2024 1080p</a></h2></article>
        <article><h2 class="entry-title"><a href="/movie/older-one/">Older One 2023 720p</a></h2></article>
    "#;
    let _m = server
        .mock("GET", "/")
        .with_status(200)
        .with_body(front)
        .create_async()
        .await;

    let source = SkyStream::new(
        "SkyStream".to_string(),
        server.url(),
        fetch_client(),
        catalog_client(),
    );

    let latest = source.latest(10).await.unwrap();
    assert_eq!(latest.len(), 2);
    assert_eq!(latest[0].title, "New Release");
    assert_eq!(latest[0].year.as_deref(), Some("2024"));
    assert_eq!(latest[1].title, "Older One");
}
