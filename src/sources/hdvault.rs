//! HdVault-style sites: path-segment search and heavily scripted download
//! pages, where locker URLs hide in `data-link` attributes and inline JS
//! as often as in plain anchors. The full-strategy scanner handles all of
//! those shapes.

use super::{extract_from_page, search_candidates, SearchStyle, SourceScraper};
use crate::error::Result;
use crate::fetch::FetchClient;
use crate::identity::CatalogClient;
use crate::model::{Candidate, Extraction};
use async_trait::async_trait;

pub struct HdVault {
    name: String,
    base_url: String,
    fetch: FetchClient,
    catalog: CatalogClient,
}

impl HdVault {
    pub fn new(name: String, base_url: String, fetch: FetchClient, catalog: CatalogClient) -> Self {
        Self {
            name,
            base_url,
            fetch,
            catalog,
        }
    }
}

#[async_trait]
impl SourceScraper for HdVault {
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
            SearchStyle::PathSegment,
            query,
            year,
            max_results,
        )
        .await
    }

    async fn extract_links(&self, page_url: &str) -> Result<Extraction> {
        extract_from_page(&self.name, &self.fetch, page_url).await
    }
}
