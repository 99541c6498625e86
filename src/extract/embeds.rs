//! Streaming embed extraction: iframe sources and player links.

use lazy_static::lazy_static;
use scraper::{Html, Selector};
use std::collections::HashSet;

use super::patterns::is_embed_url;
use crate::model::EmbedLink;
use crate::util::{extract_quality, is_skippable_url};

lazy_static! {
    static ref IFRAME_SEL: Selector = Selector::parse("iframe[src]").expect("iframe selector");
    static ref ANCHOR_SEL: Selector = Selector::parse("a[href]").expect("anchor selector");
}

/// Friendly player name derived from the embed host.
fn player_name(url: &str, text: &str) -> String {
    const PLAYERS: &[(&str, &str)] = &[
        ("vidsrc", "VidSrc"),
        ("streamtape", "StreamTape"),
        ("doodstream", "DoodStream"),
        ("mixdrop", "MixDrop"),
        ("filemoon", "FileMoon"),
        ("streamwish", "StreamWish"),
        ("vidhide", "VidHide"),
        ("upstream", "UpStream"),
        ("vidcloud", "VidCloud"),
    ];
    let lower = url.to_lowercase();
    for (key, name) in PLAYERS {
        if lower.contains(key) {
            return (*name).to_string();
        }
    }
    if text.trim().is_empty() {
        "Embedded Player".to_string()
    } else {
        text.trim().to_string()
    }
}

/// Scan page HTML for streaming embeds: iframe `src` attributes first,
/// then anchors pointing at known embed hosts. Download-labeled anchors
/// are excluded so lockers don't masquerade as players.
pub fn scan_embed_links(html: &str) -> Vec<EmbedLink> {
    let doc = Html::parse_document(html);
    let mut seen = HashSet::new();
    let mut embeds = Vec::new();

    for iframe in doc.select(&IFRAME_SEL) {
        let Some(src) = iframe.value().attr("src") else {
            continue;
        };
        let src = src.trim();
        if src.is_empty() || is_skippable_url(src) || !is_embed_url(src) {
            continue;
        }
        let url = if src.starts_with("//") {
            format!("https:{src}")
        } else {
            src.to_string()
        };
        if seen.insert(url.clone()) {
            embeds.push(EmbedLink {
                url,
                quality: "HD".to_string(),
                player: player_name(src, ""),
            });
        }
    }

    for anchor in doc.select(&ANCHOR_SEL) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let text = anchor.text().collect::<String>();
        let text_lower = text.to_lowercase();
        if text_lower.contains("download") || text_lower.contains("instant") {
            continue;
        }
        if is_skippable_url(href) || !is_embed_url(href) {
            continue;
        }
        if seen.insert(href.to_string()) {
            embeds.push(EmbedLink {
                url: href.to_string(),
                quality: extract_quality(&text),
                player: player_name(href, &text),
            });
        }
    }

    embeds
}
