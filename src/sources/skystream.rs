//! SkyStream-style sites: movie pages link to ad-shortener mediator pages,
//! which in turn carry the real file-locker URLs.

use super::{search_candidates, SourceScraper};
use crate::error::Result;
use crate::extract::{dedup_links, is_mediator_url, scan_download_links};
use crate::fetch::FetchClient;
use crate::identity::CatalogClient;
use crate::model::{Candidate, Extraction};
use crate::util::clean_title;
use async_trait::async_trait;
use lazy_static::lazy_static;
use scraper::{Html, Selector};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Mediator pages followed per movie page. Each is one extra HTTP GET.
const MAX_MEDIATOR_HOPS: usize = 6;

lazy_static! {
    static ref ANCHOR_SEL: Selector = Selector::parse("a[href]").expect("anchor selector");
}

pub struct SkyStream {
    name: String,
    base_url: String,
    fetch: FetchClient,
    catalog: CatalogClient,
}

impl SkyStream {
    pub fn new(name: String, base_url: String, fetch: FetchClient, catalog: CatalogClient) -> Self {
        Self {
            name,
            base_url,
            fetch,
            catalog,
        }
    }

    fn mediator_urls(html: &str) -> Vec<String> {
        let doc = Html::parse_document(html);
        let mut seen = HashSet::new();
        doc.select(&ANCHOR_SEL)
            .filter_map(|a| a.value().attr("href"))
            .filter(|href| is_mediator_url(href))
            .filter(|href| seen.insert(crate::util::strip_query(href)))
            .map(str::to_string)
            .collect()
    }
}

#[async_trait]
impl SourceScraper for SkyStream {
    fn name(&self) -> &str {
        &self.name
    }

    async fn search(
        &self,
        query: &str,
        year: Option<&str>,
        max_results: usize,
    ) -> Result<Vec<Candidate>> {
        search_candidates(
            &self.name,
            &self.fetch,
            &self.catalog,
            &self.base_url,
            super::SearchStyle::QueryParam,
            query,
            year,
            max_results,
        )
        .await
    }

    async fn extract_links(&self, page_url: &str) -> Result<Extraction> {
        let html = self.fetch.get_html(page_url).await?;
        let mut extraction = Extraction {
            links: scan_download_links(&html, &self.name),
            embeds: crate::extract::scan_embed_links(&html),
        };

        // The movie page itself usually only links to mediators; the locker
        // URLs live one hop further. Mediators never challenge, so these
        // hops stay on plain HTTP.
        for mediator in Self::mediator_urls(&html).into_iter().take(MAX_MEDIATOR_HOPS) {
            match self.fetch.get_html_plain(&mediator).await {
                Ok(inner) => {
                    let mut inner_links = scan_download_links(&inner, &self.name);
                    debug!(
                        mediator,
                        found = inner_links.len(),
                        "Followed mediator page"
                    );
                    extraction.links.append(&mut inner_links);
                }
                Err(e) => warn!(mediator, "Mediator fetch failed: {e}"),
            }
        }

        extraction.links = dedup_links(extraction.links);
        Ok(extraction)
    }

    async fn latest(&self, max: usize) -> Result<Vec<Candidate>> {
        let html = self.fetch.get_html(&self.base_url).await?;
        let candidates = super::parse_listing(&html, &self.base_url)
            .into_iter()
            .take(max)
            .map(|(raw_title, page_url)| {
                let (title, year) = clean_title(&raw_title);
                Candidate {
                    quality: crate::util::extract_quality(&raw_title),
                    raw_title,
                    title,
                    year,
                    page_url,
                    source: self.name.clone(),
                    identity: None,
                }
            })
            .collect();
        Ok(candidates)
    }
}
