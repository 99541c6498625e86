//! URL normalization for dedup keys and navigation filtering.

use url::Url;

/// Dedup identity for a download link: the URL with its query string removed.
/// Two links differing only in tracking parameters are the same link.
pub fn strip_query(url: &str) -> String {
    match url.split_once('?') {
        Some((base, _)) => base.to_string(),
        None => url.to_string(),
    }
}

/// Dedup identity for a candidate page: query stripped and trailing slash
/// trimmed, so `/movie/` and `/movie?ref=home` collapse to one key.
pub fn normalize_page_url(url: &str) -> String {
    strip_query(url).trim_end_matches('/').to_string()
}

/// Host portion of a URL, lowercased.
pub fn extract_host(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_lowercase()))
}

/// Links that can never lead to content: fragments, script handlers,
/// pagination and category navigation.
pub fn is_skippable_url(url: &str) -> bool {
    const SKIP: &[&str] = &[
        "#",
        "javascript:",
        "mailto:",
        "/page/",
        "/category/",
        "/cat/",
        "/tag/",
        "facebook.com",
        "twitter.com",
        "instagram.com",
    ];
    let lower = url.to_lowercase();
    lower.is_empty() || SKIP.iter().any(|s| lower.contains(s))
}

/// Resolve a possibly-relative href against a site base URL.
pub fn absolutize(base_url: &str, href: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        return href.to_string();
    }
    if href.starts_with("//") {
        return format!("https:{href}");
    }
    match Url::parse(base_url).and_then(|b| b.join(href)) {
        Ok(joined) => joined.to_string(),
        Err(_) => format!("{}/{}", base_url.trim_end_matches('/'), href.trim_start_matches('/')),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_tracking_parameters() {
        assert_eq!(strip_query("http://h/file.mp4?t=1"), "http://h/file.mp4");
        assert_eq!(strip_query("http://h/file.mp4"), "http://h/file.mp4");
    }

    #[test]
    fn normalizes_page_urls() {
        assert_eq!(
            normalize_page_url("https://site.example/movie/?ref=home"),
            "https://site.example/movie"
        );
    }

    #[test]
    fn skips_navigation_links() {
        assert!(is_skippable_url("javascript:void(0)"));
        assert!(is_skippable_url("/category/action/"));
        assert!(!is_skippable_url("https://hubdrive.space/file/123"));
    }

    #[test]
    fn absolutizes_relative_hrefs() {
        assert_eq!(
            absolutize("https://site.example", "/movie/inception"),
            "https://site.example/movie/inception"
        );
        assert_eq!(
            absolutize("https://site.example", "//cdn.example/embed/1"),
            "https://cdn.example/embed/1"
        );
    }
}
