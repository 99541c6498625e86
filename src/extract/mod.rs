//! Shared HTML scanning: host pattern tables plus the link/embed scanners
//! every source variant builds on.

pub mod embeds;
pub mod patterns;
pub mod scan;

pub use embeds::scan_embed_links;
pub use patterns::{
    identify_host, is_direct_media_url, is_download_url, is_embed_url, is_mediator_url,
    DIRECT_MEDIA_RE, MEDIA_URL_IN_TEXT_RE,
};
pub use scan::{dedup_links, scan_download_links};
