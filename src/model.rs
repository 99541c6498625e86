//! Payload types flowing between the orchestrator, scrapers and resolver.
//!
//! Everything here is serde-serializable because the cache persists these
//! shapes as JSON and the request layer forwards them to clients verbatim.

use serde::{Deserialize, Serialize};

/// Canonical metadata for a title, obtained from the external catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Identity {
    pub id: i64,
    pub title: String,
    pub poster_url: Option<String>,
    pub backdrop_url: Option<String>,
    pub rating: f64,
    pub overview: String,
    pub release_date: String,
}

/// A scraped (title, page URL) pair produced by a source's search step.
///
/// Ephemeral: lives only for the duration of the orchestration call that
/// produced it. `identity` is best-effort enrichment; a candidate without one
/// keeps its lexical fields and is still returned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    /// Title exactly as it appeared on the page, quality/language noise included.
    pub raw_title: String,
    /// Cleansed title with quality, language and size tokens stripped.
    pub title: String,
    pub year: Option<String>,
    pub quality: String,
    pub page_url: String,
    /// Name of the source scraper that produced this candidate.
    pub source: String,
    pub identity: Option<Identity>,
}

/// A downloadable link discovered on a source page.
///
/// `needs_resolution` marks links that point at an intermediate locker
/// rather than a final file; those are resolved on demand through
/// [`crate::LinkResolver`], never eagerly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadLink {
    pub url: String,
    pub quality: String,
    /// Human-facing label: "Hindi Dubbed", "Dual Audio", "Download", ...
    pub type_label: String,
    pub source: String,
    /// Host classification derived from the URL pattern ("hubdrive",
    /// "gofile", "gdrive", ...).
    pub source_host: String,
    pub needs_resolution: bool,
    pub filename: Option<String>,
    pub filesize: Option<String>,
}

/// A streaming embed link. Never resolved further.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbedLink {
    pub url: String,
    pub quality: String,
    pub player: String,
}

/// Result of a single page's deep link extraction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Extraction {
    pub links: Vec<DownloadLink>,
    pub embeds: Vec<EmbedLink>,
}

impl Extraction {
    pub fn is_empty(&self) -> bool {
        self.links.is_empty() && self.embeds.is_empty()
    }
}

/// Session material that must be replayed when fetching the direct URL,
/// for terminal CDNs that enforce session affinity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthContext {
    /// (name, value) pairs harvested from the resolving session.
    pub cookies: Vec<(String, String)>,
    pub user_agent: String,
    /// The intermediate URL the direct link was resolved from.
    pub referer: String,
}

/// Uniform outcome of a resolution attempt, regardless of host tier.
///
/// Failures are values, not exceptions: `success == false` with `error`
/// populated and `original_url` always retained.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolutionResult {
    pub success: bool,
    pub direct_url: Option<String>,
    pub filename: Option<String>,
    pub filesize: Option<String>,
    pub auth: Option<AuthContext>,
    pub original_url: String,
    pub error: Option<String>,
}

impl ResolutionResult {
    pub fn success(original_url: impl Into<String>, direct_url: impl Into<String>) -> Self {
        Self {
            success: true,
            direct_url: Some(direct_url.into()),
            filename: None,
            filesize: None,
            auth: None,
            original_url: original_url.into(),
            error: None,
        }
    }

    pub fn failure(original_url: impl Into<String>, error: impl ToString) -> Self {
        Self {
            success: false,
            direct_url: None,
            filename: None,
            filesize: None,
            auth: None,
            original_url: original_url.into(),
            error: Some(error.to_string()),
        }
    }
}
