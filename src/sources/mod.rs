//! Source scrapers.
//!
//! Each supported site implements [`SourceScraper`]; the orchestrator only
//! ever talks to the trait. Variants share the listing parser, the
//! year-stripped search retry and the relevance filter defined here.

mod cinevault;
mod hdvault;
mod skystream;

pub use cinevault::CineVault;
pub use hdvault::HdVault;
pub use skystream::SkyStream;

use crate::config::{EngineConfig, SourceKind};
use crate::error::Result;
use crate::fetch::FetchClient;
use crate::identity::CatalogClient;
use crate::model::{Candidate, Extraction};
use crate::util::urls::absolutize;
use crate::util::{
    clean_title, is_skippable_url, normalize_page_url, significant_words, title_matches,
};
use async_trait::async_trait;
use lazy_static::lazy_static;
use scraper::{Html, Selector};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

/// Capability contract every source site implements.
#[async_trait]
pub trait SourceScraper: Send + Sync {
    fn name(&self) -> &str;

    /// Search the site. Empty year-qualified results are retried once
    /// without the year. Never errors for "nothing found".
    async fn search(
        &self,
        query: &str,
        year: Option<&str>,
        max_results: usize,
    ) -> Result<Vec<Candidate>>;

    /// Deep-extract download and embed links from one result page.
    async fn extract_links(&self, page_url: &str) -> Result<Extraction>;

    /// Newest titles from the site's front page. Sites without a usable
    /// front-page listing keep the empty default.
    async fn latest(&self, max: usize) -> Result<Vec<Candidate>> {
        let _ = max;
        Ok(Vec::new())
    }
}

/// Build the enabled scrapers in priority order.
pub fn build_sources(
    config: &EngineConfig,
    fetch: FetchClient,
    catalog: CatalogClient,
) -> Vec<Arc<dyn SourceScraper>> {
    config
        .enabled_sources()
        .into_iter()
        .map(|sc| -> Arc<dyn SourceScraper> {
            match sc.kind {
                SourceKind::SkyStream => Arc::new(SkyStream::new(
                    sc.name.clone(),
                    sc.base_url.clone(),
                    fetch.clone(),
                    catalog.clone(),
                )),
                SourceKind::HdVault => Arc::new(HdVault::new(
                    sc.name.clone(),
                    sc.base_url.clone(),
                    fetch.clone(),
                    catalog.clone(),
                )),
                SourceKind::CineVault => Arc::new(CineVault::new(
                    sc.name.clone(),
                    sc.base_url.clone(),
                    fetch.clone(),
                    catalog.clone(),
                )),
            }
        })
        .collect()
}

lazy_static! {
    static ref LISTING_SEL: Selector = Selector::parse(
        "article h2 a[href], article h3 a[href], h2.entry-title a[href], \
         .post-title a[href], .result-item a[href], .blog-items article a[href]"
    )
    .expect("listing selector");
    static ref FALLBACK_LISTING_SEL: Selector =
        Selector::parse("article a[href], .post a[href]").expect("fallback listing selector");
}

/// Parse a search/front-page listing into (raw title, absolute URL) pairs,
/// deduplicated by normalized URL in document order.
pub(crate) fn parse_listing(html: &str, base_url: &str) -> Vec<(String, String)> {
    let doc = Html::parse_document(html);
    let mut seen = HashSet::new();
    let mut out = Vec::new();

    let mut collect = |selector: &Selector, out: &mut Vec<(String, String)>| {
        for anchor in doc.select(selector) {
            let Some(href) = anchor.value().attr("href") else {
                continue;
            };
            if is_skippable_url(href) {
                continue;
            }
            let title = anchor
                .text()
                .collect::<String>()
                .trim()
                .to_string();
            if title.is_empty() {
                continue;
            }
            let url = absolutize(base_url, href);
            if seen.insert(normalize_page_url(&url)) {
                out.push((title, url));
            }
        }
    };

    collect(&LISTING_SEL, &mut out);
    if out.is_empty() {
        collect(&FALLBACK_LISTING_SEL, &mut out);
    }
    out
}

/// How a site shapes its search URL.
#[derive(Debug, Clone, Copy)]
pub(crate) enum SearchStyle {
    /// WordPress style: `{base}/?s={query}`.
    QueryParam,
    /// Path style: `{base}/search/{query}`.
    PathSegment,
}

/// Shared search flow: run `search_once` with the year appended, retry
/// without it on an empty result, then filter by relevance, cleanse titles
/// and enrich with catalog identities up to `max_results`.
pub(crate) async fn search_candidates(
    source: &str,
    fetch: &FetchClient,
    catalog: &CatalogClient,
    base_url: &str,
    style: SearchStyle,
    query: &str,
    year: Option<&str>,
    max_results: usize,
) -> Result<Vec<Candidate>> {
    let mut listing = search_once(fetch, base_url, style, query, year).await?;
    if listing.is_empty() && year.is_some() {
        debug!(source, %query, "Year-qualified search empty, retrying without year");
        listing = search_once(fetch, base_url, style, query, None).await?;
    }

    let words = significant_words(query);
    let mut candidates = Vec::new();
    for (raw_title, page_url) in listing {
        if !title_matches(&raw_title, &words, None) {
            continue;
        }
        let (title, found_year) = clean_title(&raw_title);
        let candidate_year = found_year.or_else(|| year.map(str::to_string));
        let identity = catalog.identify(&title, candidate_year.as_deref()).await;
        candidates.push(Candidate {
            raw_title: raw_title.clone(),
            quality: crate::util::extract_quality(&raw_title),
            title,
            year: candidate_year,
            page_url,
            source: source.to_string(),
            identity,
        });
        if candidates.len() >= max_results {
            break;
        }
    }
    Ok(candidates)
}

async fn search_once(
    fetch: &FetchClient,
    base_url: &str,
    style: SearchStyle,
    query: &str,
    year: Option<&str>,
) -> Result<Vec<(String, String)>> {
    let term = match year {
        Some(y) => format!("{query} {y}"),
        None => query.to_string(),
    };
    let base = base_url.trim_end_matches('/');
    let encoded = urlencoding::encode(&term);
    let url = match style {
        SearchStyle::QueryParam => format!("{base}/?s={encoded}"),
        SearchStyle::PathSegment => format!("{base}/search/{encoded}"),
    };
    let html = fetch.get_html(&url).await?;
    Ok(parse_listing(&html, base_url))
}

/// Shared extraction flow: fetch, scan both link kinds.
pub(crate) async fn extract_from_page(
    source: &str,
    fetch: &FetchClient,
    page_url: &str,
) -> Result<Extraction> {
    let html = fetch.get_html(page_url).await?;
    Ok(Extraction {
        links: crate::extract::scan_download_links(&html, source),
        embeds: crate::extract::scan_embed_links(&html),
    })
}
