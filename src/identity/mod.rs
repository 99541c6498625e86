//! Canonical title identification against an external catalog.
//!
//! Lookup is best-effort by design: a catalog outage or a miss degrades a
//! candidate to "unidentified", it never fails the surrounding operation.

use crate::config::CatalogConfig;
use crate::model::Identity;
use crate::util::{significant_words, title_matches};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, trace};

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    id: i64,
    title: String,
    #[serde(default)]
    poster_path: Option<String>,
    #[serde(default)]
    backdrop_path: Option<String>,
    #[serde(default)]
    vote_average: f64,
    #[serde(default)]
    overview: String,
    #[serde(default)]
    release_date: String,
}

/// Client for the movie catalog search API.
#[derive(Clone)]
pub struct CatalogClient {
    http: reqwest::Client,
    config: CatalogConfig,
}

impl CatalogClient {
    pub fn new(config: CatalogConfig) -> crate::error::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self { http, config })
    }

    /// Look up the canonical identity for a cleansed title. Queries with the
    /// year first when one is known; an empty result set retries without it
    /// (release-year metadata on source sites is frequently off by one).
    ///
    /// Returns `Ok(None)` on any failure path, including network errors.
    pub async fn identify(&self, title: &str, year: Option<&str>) -> Option<Identity> {
        if self.config.api_key.is_empty() {
            trace!("Catalog lookup skipped, no API key configured");
            return None;
        }

        let mut hits = match self.search(title, year).await {
            Ok(hits) => hits,
            Err(e) => {
                debug!(%title, "Catalog search failed: {e}");
                return None;
            }
        };

        if hits.is_empty() && year.is_some() {
            hits = match self.search(title, None).await {
                Ok(hits) => hits,
                Err(e) => {
                    debug!(%title, "Catalog year-less retry failed: {e}");
                    return None;
                }
            };
        }

        let words = significant_words(title);
        let hit = hits
            .into_iter()
            .find(|hit| title_matches(&hit.title, &words, year))?;

        Some(Identity {
            id: hit.id,
            title: hit.title,
            poster_url: hit
                .poster_path
                .map(|p| format!("{}{p}", self.config.poster_base)),
            backdrop_url: hit
                .backdrop_path
                .map(|p| format!("{}{p}", self.config.backdrop_base)),
            rating: hit.vote_average,
            overview: hit.overview,
            release_date: hit.release_date,
        })
    }

    async fn search(&self, title: &str, year: Option<&str>) -> crate::error::Result<Vec<SearchHit>> {
        let mut url = format!(
            "{}/search/movie?api_key={}&query={}",
            self.config.base_url.trim_end_matches('/'),
            self.config.api_key,
            urlencoding::encode(title)
        );
        if let Some(year) = year {
            url.push_str(&format!("&year={year}"));
        }

        let resp = self.http.get(&url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(crate::error::Error::UpstreamHttp {
                status: status.as_u16(),
                url,
            });
        }
        let parsed: SearchResponse = resp.json().await?;
        Ok(parsed.results)
    }
}
