//! Download-link scanning over a fetched page.
//!
//! Several strategies run in sequence over the same document; results are
//! merged and deduplicated by query-stripped URL. Best-effort by design:
//! a page where nothing matches simply contributes an empty list.

use lazy_static::lazy_static;
use scraper::{Html, Selector};
use std::collections::HashSet;
use tracing::debug;

use super::patterns::{identify_host, is_download_url, INTERMEDIATE_HOSTS};
use crate::model::DownloadLink;
use crate::util::{extract_quality, extract_type_label, is_skippable_url, strip_query};

lazy_static! {
    static ref ANCHOR_SEL: Selector = Selector::parse("a[href]").expect("anchor selector");
    static ref DATA_LINK_SEL: Selector =
        Selector::parse("[data-link]").expect("data-link selector");
    static ref HEADER_SEL: Selector =
        Selector::parse("h1, h2, h3, h4, h5, h6").expect("header selector");
}

fn needs_resolution(host_type: &str) -> bool {
    INTERMEDIATE_HOSTS.iter().any(|(t, _)| *t == host_type)
}

fn build_link(url: &str, context_text: &str, source: &str) -> DownloadLink {
    let host_type = identify_host(url).unwrap_or("unknown");
    DownloadLink {
        url: url.to_string(),
        quality: extract_quality(context_text),
        type_label: extract_type_label(context_text),
        source: source.to_string(),
        source_host: host_type.to_string(),
        needs_resolution: needs_resolution(host_type),
        filename: None,
        filesize: None,
    }
}

/// Scan page HTML for download links using every strategy:
/// anchors, `data-link` attributes, header-wrapped anchors, and a raw
/// regex pass over the source for script-embedded URLs.
pub fn scan_download_links(html: &str, source: &str) -> Vec<DownloadLink> {
    let doc = Html::parse_document(html);
    let mut links = Vec::new();

    // Anchors anywhere on the page.
    for anchor in doc.select(&ANCHOR_SEL) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        if is_skippable_url(href) || !is_download_url(href) {
            continue;
        }
        let text = anchor.text().collect::<String>();
        let parent_text = anchor
            .parent()
            .and_then(scraper::ElementRef::wrap)
            .map(|p| p.text().collect::<String>())
            .unwrap_or_default();
        links.push(build_link(href, &format!("{text} {parent_text}"), source));
    }

    // data-link attributes on interactive elements (buttons, divs).
    for elem in doc.select(&DATA_LINK_SEL) {
        if let Some(data_link) = elem.value().attr("data-link") {
            if is_download_url(data_link) {
                let text = elem.text().collect::<String>();
                links.push(build_link(data_link, &text, source));
            }
        }
    }

    // Anchors wrapped in header tags; the header text usually carries the
    // quality/language description for the whole block.
    for header in doc.select(&HEADER_SEL) {
        let header_text = header.text().collect::<String>();
        for anchor in header.select(&ANCHOR_SEL) {
            if let Some(href) = anchor.value().attr("href") {
                if is_download_url(href) && !is_skippable_url(href) {
                    links.push(build_link(href, &header_text, source));
                }
            }
        }
    }

    // Raw scan for locker URLs embedded in script source.
    for m in super::patterns::MEDIA_URL_IN_TEXT_RE.find_iter(html) {
        let url = m.as_str().trim_end_matches(['.', ',', ';']);
        links.push(build_link(url, "", source));
    }

    let deduped = dedup_links(links);
    debug!(source, count = deduped.len(), "download link scan complete");
    deduped
}

/// Deduplicate by query-stripped URL, keeping first occurrence.
pub fn dedup_links(links: Vec<DownloadLink>) -> Vec<DownloadLink> {
    let mut seen = HashSet::new();
    links
        .into_iter()
        .filter(|l| seen.insert(strip_query(&l.url)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scans_anchors_and_tags_host_types() {
        let html = r#"
            <html><body>
              <h4>Inception 2010 1080p [1.4 GB]</h4>
              <a href="https://hubdrive.space/file/42">Download</a>
              <a href="https://pixeldrain.com/u/abc">Mirror</a>
              <a href="/category/action/">Action</a>
            </body></html>"#;
        let links = scan_download_links(html, "TestSource");
        assert_eq!(links.len(), 2);
        let hub = links.iter().find(|l| l.source_host == "hubdrive").unwrap();
        assert!(hub.needs_resolution);
        let pix = links.iter().find(|l| l.source_host == "pixeldrain").unwrap();
        assert!(!pix.needs_resolution);
    }

    #[test]
    fn picks_up_data_link_attributes() {
        let html = r#"<div data-link="https://gofile.io/d/xyz">Get</div>"#;
        let links = scan_download_links(html, "TestSource");
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].source_host, "gofile");
    }

    #[test]
    fn dedups_by_query_stripped_url() {
        let html = r#"
            <a href="https://hubdrive.space/file/1?t=1">A</a>
            <a href="https://hubdrive.space/file/1?t=2">B</a>"#;
        let links = scan_download_links(html, "TestSource");
        assert_eq!(links.len(), 1);
    }
}
