//! Canonical-host transforms. Zero network calls.

use crate::model::ResolutionResult;
use once_cell::sync::Lazy;
use regex::Regex;

static GDRIVE_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/(?:file/)?d/([A-Za-z0-9_-]+)").expect("valid gdrive id regex"));
static GDRIVE_OPEN_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[?&]id=([A-Za-z0-9_-]+)").expect("valid gdrive open id regex"));
static PIXELDRAIN_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/u/([A-Za-z0-9]+)").expect("valid pixeldrain id regex"));

/// Google Drive viewer URL to its direct-download form.
pub fn resolve_gdrive(url: &str) -> ResolutionResult {
    let id = GDRIVE_ID_RE
        .captures(url)
        .or_else(|| GDRIVE_OPEN_ID_RE.captures(url))
        .map(|c| c[1].to_string());
    match id {
        Some(id) => ResolutionResult::success(
            url,
            format!("https://drive.google.com/uc?export=download&id={id}"),
        ),
        None => ResolutionResult::failure(url, "No file id in Google Drive URL"),
    }
}

/// Pixeldrain viewer URL to its file API endpoint.
pub fn resolve_pixeldrain(url: &str) -> ResolutionResult {
    match PIXELDRAIN_ID_RE.captures(url).map(|c| c[1].to_string()) {
        Some(id) => {
            ResolutionResult::success(url, format!("https://pixeldrain.com/api/file/{id}"))
        }
        None => ResolutionResult::failure(url, "No file id in Pixeldrain URL"),
    }
}
