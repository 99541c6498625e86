//! Browser-driven locker resolution.
//!
//! The flow for a locker page: wire up network interception before
//! navigating, click through up to two rounds of gate buttons, then poll
//! for the direct URL. Three completion signals race with a fixed
//! precedence checked each tick: intercepted network traffic first, a
//! visible final download anchor second, and a periodic full-page rescan
//! third. Polling is hard-bounded; exhaustion is an outcome, not a hang.

use super::selectors::{keyword_click_script, CLICK_CANDIDATES, CLICK_KEYWORDS};
use super::selectors::VISIBLE_DOWNLOAD_ANCHOR_SCRIPT;
use crate::driver::{Session, SharedDriver};
use crate::error::{Error, Result};
use crate::extract::{is_direct_media_url, MEDIA_URL_IN_TEXT_RE};
use crate::model::{AuthContext, ResolutionResult};
use chromiumoxide::cdp::browser_protocol::network::{
    EventRequestWillBeSent, EventResponseReceived,
};
use chromiumoxide::Page;
use futures::StreamExt;
use parking_lot::Mutex;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace};

const POLL_TICKS: u32 = 60;
const TICK: Duration = Duration::from_secs(1);
/// Full-page rescans run on every RESCAN_EVERY-th tick.
const RESCAN_EVERY: u32 = 5;
const CLICK_ROUNDS: u32 = 2;

pub(super) async fn resolve(driver: &SharedDriver, url: &str) -> Result<ResolutionResult> {
    let _permit = driver.resolve_permit().await?;
    let session = driver.session().await?;

    let outcome = drive_session(&session, url).await;
    if let Err(e) = session.close().await {
        debug!(%url, "Session close after resolution failed: {e}");
    }
    outcome
}

async fn drive_session(session: &Session, url: &str) -> Result<ResolutionResult> {
    let page = session.page();

    let captured: Arc<Mutex<Option<String>>> = Arc::new(Mutex::new(None));
    let interceptors = install_interceptors(page, Arc::clone(&captured)).await?;

    let result = async {
        page.goto(url).await.map_err(|e| {
            debug!(%url, "Locker navigation failed: {e}");
            Error::NavigationTimeout {
                url: url.to_string(),
            }
        })?;
        let _ = page.wait_for_navigation().await;

        let mut clicked = false;
        for round in 1..=CLICK_ROUNDS {
            if captured.lock().is_some() {
                break;
            }
            if click_round(page).await {
                trace!(%url, round, "Click round hit a gate element");
                clicked = true;
                // Jittered settle delay; gate pages watch for robotic timing.
                let settle = 1500 + rand::rng().random_range(0..1000);
                tokio::time::sleep(Duration::from_millis(settle)).await;
            }
        }

        for tick in 1..=POLL_TICKS {
            if let Some(direct) = captured.lock().take() {
                info!(%url, tick, "Direct URL captured via network interception");
                return Ok(finish(page, url, direct).await);
            }

            if let Some(direct) = visible_download_anchor(page).await {
                info!(%url, tick, "Direct URL found on visible anchor");
                return Ok(finish(page, url, direct).await);
            }

            if tick % RESCAN_EVERY == 0 {
                if let Some(direct) = full_page_rescan(page).await {
                    info!(%url, tick, "Direct URL found by page rescan");
                    return Ok(finish(page, url, direct).await);
                }
            }

            tokio::time::sleep(TICK).await;
        }

        let err = if clicked {
            Error::ResolutionExhausted {
                url: url.to_string(),
            }
        } else {
            Error::NoInteractiveElement {
                url: url.to_string(),
            }
        };
        debug!(%url, "Locker resolution gave up: {err}");
        Ok(ResolutionResult::failure(url, err))
    }
    .await;

    for task in interceptors {
        task.abort();
    }
    result
}

/// Listen for direct-media URLs on both outgoing requests and incoming
/// responses. Must be installed before navigation or the gate page's own
/// redirects can slip past.
async fn install_interceptors(
    page: &Page,
    captured: Arc<Mutex<Option<String>>>,
) -> Result<Vec<JoinHandle<()>>> {
    let mut requests = page.event_listener::<EventRequestWillBeSent>().await?;
    let mut responses = page.event_listener::<EventResponseReceived>().await?;

    let sink = Arc::clone(&captured);
    let on_request = tokio::spawn(async move {
        while let Some(event) = requests.next().await {
            let url = &event.request.url;
            if is_direct_media_url(url) {
                trace!(%url, "Intercepted media request");
                let mut slot = sink.lock();
                if slot.is_none() {
                    *slot = Some(url.clone());
                }
                break;
            }
        }
    });

    let on_response = tokio::spawn(async move {
        while let Some(event) = responses.next().await {
            let url = &event.response.url;
            if is_direct_media_url(url) {
                trace!(%url, "Intercepted media response");
                let mut slot = captured.lock();
                if slot.is_none() {
                    *slot = Some(url.clone());
                }
                break;
            }
        }
    });

    Ok(vec![on_request, on_response])
}

/// One round of click-through: ordered selector candidates first, keyword
/// text search as the generic fallback.
async fn click_round(page: &Page) -> bool {
    for selector in CLICK_CANDIDATES {
        if let Ok(element) = page.find_element(*selector).await {
            if element.click().await.is_ok() {
                trace!(selector, "Clicked selector candidate");
                return true;
            }
        }
    }

    for keyword in CLICK_KEYWORDS {
        let script = keyword_click_script(keyword);
        let hit = match page.evaluate(script).await {
            Ok(value) => value.into_value::<bool>().unwrap_or(false),
            Err(_) => false,
        };
        if hit {
            trace!(keyword, "Clicked element by keyword text");
            return true;
        }
    }

    false
}

async fn visible_download_anchor(page: &Page) -> Option<String> {
    let value = page.evaluate(VISIBLE_DOWNLOAD_ANCHOR_SCRIPT).await.ok()?;
    value.into_value::<Option<String>>().ok().flatten()
}

async fn full_page_rescan(page: &Page) -> Option<String> {
    let html = page.content().await.ok()?;
    MEDIA_URL_IN_TEXT_RE
        .find(&html)
        .map(|m| m.as_str().to_string())
}

/// Harvest session material alongside the direct URL. Terminal CDNs behind
/// these lockers commonly bind the link to the cookies and user agent that
/// produced it.
async fn finish(page: &Page, original_url: &str, direct_url: String) -> ResolutionResult {
    let cookies = match page.get_cookies().await {
        Ok(cookies) => cookies
            .into_iter()
            .map(|c| (c.name, c.value))
            .collect(),
        Err(e) => {
            debug!("Cookie harvest failed: {e}");
            Vec::new()
        }
    };

    let user_agent = match page.evaluate("navigator.userAgent").await {
        Ok(value) => value.into_value::<String>().unwrap_or_default(),
        Err(_) => String::new(),
    };

    let mut result = ResolutionResult::success(original_url, direct_url.clone());
    result.filename = filename_from_url(&direct_url);
    result.auth = Some(AuthContext {
        cookies,
        user_agent,
        referer: original_url.to_string(),
    });
    result
}

fn filename_from_url(url: &str) -> Option<String> {
    let path = url.split('?').next().unwrap_or(url);
    let segment = path.rsplit('/').next()?;
    if segment.contains('.') && !segment.is_empty() {
        Some(
            urlencoding::decode(segment)
                .map(|s| s.into_owned())
                .unwrap_or_else(|_| segment.to_string()),
        )
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filename_extraction_decodes_segments() {
        assert_eq!(
            filename_from_url("https://cdn.example/files/Movie%20Name.mkv?token=1"),
            Some("Movie Name.mkv".to_string())
        );
        assert_eq!(filename_from_url("https://cdn.example/files/"), None);
        assert_eq!(filename_from_url("https://cdn.example/download"), None);
    }
}
