//! URL pattern tables for the hosts this engine knows about.
//!
//! These lists are the single source of truth for host classification:
//! scanners tag links with the host type found here, and the resolver's
//! tier dispatch keys off the same names. Domains rotate frequently, so
//! entries are substring matches rather than exact hosts.

use lazy_static::lazy_static;
use regex::Regex;

/// Intermediate file-locker hosts, keyed by host type. Links to these are
/// returned with `needs_resolution = true`.
pub const INTERMEDIATE_HOSTS: &[(&str, &[&str])] = &[
    ("hubdrive", &["hubdrive.space", "hubdrive.dad"]),
    ("hubcloud", &["hubcloud.foo", "hubcloud.in"]),
    ("gdflix", &["gdflix.dev", "new1.gdflix.app", "gdflix.cfd"]),
    ("filepress", &["filepress.wiki", "new1.filepress.wiki"]),
    ("gdtot", &["gdtot.cfd", "new6.gdtot.sbs"]),
    ("gofile", &["gofile.io"]),
    ("cinecloud", &["cinecloud.site"]),
];

/// Hosts whose URLs are already canonical or resolvable without a browser.
pub const DIRECT_HOSTS: &[(&str, &[&str])] = &[
    ("gdrive", &["drive.google.com", "docs.google.com"]),
    ("pixeldrain", &["pixeldrain.com"]),
    ("mediafire", &["mediafire.com"]),
    ("mega", &["mega.nz"]),
    ("krakenfiles", &["krakenfiles.com"]),
];

/// Ad-monetized shortener pages sitting between a movie page and the
/// actual locker. Followed over plain HTTP, never via the browser.
pub const MEDIATOR_HOSTS: &[&str] = &[
    "howblogs.xyz",
    "hblinks.dad",
    "gadgetsweb.xyz",
    "cryptoinsights.site",
    "adrinolinks.in",
    "newshub.live",
    "gplinks.co",
    "kolop.net",
];

/// Streaming embed hosts. Embed links are never resolved further.
pub const EMBED_HOSTS: &[&str] = &[
    "vidsrc",
    "streamtape",
    "doodstream",
    "mixdrop",
    "filemoon",
    "streamwish",
    "vidhide",
    "upstream",
    "vidcloud",
    "hglink.to",
    "/embed/",
    "/player/",
];

lazy_static! {
    /// A URL that is itself a media file: the terminal signal the Tier-A
    /// resolver polls for.
    pub static ref DIRECT_MEDIA_RE: Regex =
        Regex::new(r"(?i)\.(mkv|mp4|avi|m4v)(\?|$)").expect("direct media pattern");

    /// Media-file URLs embedded in raw page text or script source.
    pub static ref MEDIA_URL_IN_TEXT_RE: Regex =
        Regex::new(r#"(?i)https?://[^\s"'<>]+\.(?:mkv|mp4|avi|m4v)[^\s"'<>]*"#)
            .expect("media url pattern");
}

/// Classify a URL against the intermediate and direct host tables.
/// Returns the host type name, or `None` for unrecognized hosts.
pub fn identify_host(url: &str) -> Option<&'static str> {
    let lower = url.to_lowercase();
    for (host_type, domains) in INTERMEDIATE_HOSTS {
        if domains.iter().any(|d| lower.contains(d)) {
            return Some(host_type);
        }
    }
    for (host_type, domains) in DIRECT_HOSTS {
        if domains.iter().any(|d| lower.contains(d)) {
            return Some(host_type);
        }
    }
    None
}

/// Whether a URL points at any known download host (either table).
pub fn is_download_url(url: &str) -> bool {
    identify_host(url).is_some()
}

/// Whether a URL points at a known mediator/shortener page.
pub fn is_mediator_url(url: &str) -> bool {
    let lower = url.to_lowercase();
    MEDIATOR_HOSTS.iter().any(|h| lower.contains(h))
}

/// Whether a URL points at a known streaming embed host.
pub fn is_embed_url(url: &str) -> bool {
    let lower = url.to_lowercase();
    EMBED_HOSTS.iter().any(|h| lower.contains(h))
}

/// Whether the URL is a directly fetchable media file.
pub fn is_direct_media_url(url: &str) -> bool {
    DIRECT_MEDIA_RE.is_match(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifies_intermediate_hosts() {
        assert_eq!(identify_host("https://hubdrive.space/file/123"), Some("hubdrive"));
        assert_eq!(identify_host("https://gofile.io/d/abc"), Some("gofile"));
        assert_eq!(identify_host("https://drive.google.com/d/x/view"), Some("gdrive"));
        assert_eq!(identify_host("https://example.com/x"), None);
    }

    #[test]
    fn direct_media_pattern_matches_extensions() {
        assert!(is_direct_media_url("https://cdn.example/movie.mkv"));
        assert!(is_direct_media_url("https://cdn.example/movie.mp4?token=1"));
        assert!(!is_direct_media_url("https://cdn.example/movie.html"));
    }

    #[test]
    fn mediator_and_embed_tables_are_disjoint_from_lockers() {
        assert!(is_mediator_url("https://howblogs.xyz/375923"));
        assert!(!is_mediator_url("https://hubdrive.space/file/1"));
        assert!(is_embed_url("https://streamtape.com/e/xyz"));
    }
}
