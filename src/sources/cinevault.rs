//! CineVault-style sites: locker links sit directly in the page HTML under
//! per-quality headers. No mediator hop.

use super::{extract_from_page, search_candidates, SourceScraper};
use crate::error::Result;
use crate::fetch::FetchClient;
use crate::identity::CatalogClient;
use crate::model::{Candidate, Extraction};
use async_trait::async_trait;

pub struct CineVault {
    name: String,
    base_url: String,
    fetch: FetchClient,
    catalog: CatalogClient,
}

impl CineVault {
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
impl SourceScraper for CineVault {
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
        extract_from_page(&self.name, &self.fetch, page_url).await
    }
}
