//! Click-through heuristics for locker pages.

/// Ordered selector candidates tried on a locker page, most specific first.
/// The first selector that matches a visible element wins the round.
pub const CLICK_CANDIDATES: &[&str] = &[
    "#direct-download",
    "#instant-download",
    "a.btn-success[href*='download']",
    "button#download",
    "a#download",
    ".download-button",
    ".btn-download",
    "a[href*='instant']",
    "button.generate",
    "a.generate-link",
];

/// Keywords matched (lowercased) against the visible text of clickable
/// elements when none of [`CLICK_CANDIDATES`] hit. Order sets precedence.
pub const CLICK_KEYWORDS: &[&str] = &["instant", "direct", "generate", "download"];

/// Script template that walks all clickable elements and clicks the first
/// whose visible text contains the given keyword. Returns `true` on a click.
pub(super) fn keyword_click_script(keyword: &str) -> String {
    format!(
        r#"(() => {{
            const nodes = document.querySelectorAll('a, button, [role="button"], input[type="submit"]');
            for (const el of nodes) {{
                const text = (el.innerText || el.value || '').toLowerCase();
                const visible = el.offsetParent !== null;
                if (visible && text.includes({keyword:?})) {{
                    el.click();
                    return true;
                }}
            }}
            return false;
        }})()"#
    )
}

/// Script that returns the href of the first visible anchor that either
/// points straight at a media file or presents itself as the final
/// download button.
pub(super) const VISIBLE_DOWNLOAD_ANCHOR_SCRIPT: &str = r#"(() => {
    const media = /\.(mkv|mp4|avi|m4v)(\?|$)/i;
    const anchors = document.querySelectorAll('a[href]');
    for (const a of anchors) {
        if (a.offsetParent === null) continue;
        const href = a.href || '';
        if (media.test(href)) return href;
        const text = (a.innerText || '').toLowerCase();
        if (a.hasAttribute('download') && href.startsWith('http')) return href;
        if ((text.includes('download now') || text.includes('click here to download'))
            && href.startsWith('http')) return href;
    }
    return null;
})()"#;
