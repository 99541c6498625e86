//! Two-tier page fetching.
//!
//! Plain HTTP is always tried first; the shared browser is an escalation
//! path reserved for hosts that reject bare clients or sit behind a
//! JavaScript challenge. Browser fetches hold a slot in the driver's
//! fetch pool for their whole duration.

use crate::driver::{SharedDriver, USER_AGENT};
use crate::error::{Error, Result};
use crate::util::extract_host;
use dashmap::DashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace, warn};

/// Markers that identify an interstitial challenge page rather than real
/// content. Matched case-insensitively against the response body.
const CHALLENGE_SIGNATURES: &[&str] = &[
    "just a moment",
    "cf-browser-verification",
    "checking your browser",
    "verify you are human",
    "attention required! | cloudflare",
    "ddos-guard",
];

fn looks_like_challenge(body: &str) -> bool {
    let head: String = body.chars().take(4096).collect();
    let head = head.to_lowercase();
    CHALLENGE_SIGNATURES.iter().any(|sig| head.contains(sig))
}

/// HTTP + browser page fetcher shared across sources and resolvers.
#[derive(Clone)]
pub struct FetchClient {
    http: reqwest::Client,
    driver: SharedDriver,
    /// Hosts that served a challenge to the plain tier. Subsequent fetches
    /// skip straight to the browser instead of burning a doomed request.
    challenged_hosts: Arc<DashSet<String>>,
}

impl FetchClient {
    pub fn new(driver: SharedDriver) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;
        Ok(Self {
            http,
            driver,
            challenged_hosts: Arc::new(DashSet::new()),
        })
    }

    /// Raw HTTP client, for JSON endpoints that never need a browser.
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Fetch a page's HTML, escalating to the shared browser when plain
    /// HTTP fails or returns a challenge interstitial.
    pub async fn get_html(&self, url: &str) -> Result<String> {
        let host = extract_host(url);
        if let Some(host) = host.as_deref() {
            if self.challenged_hosts.contains(host) {
                debug!(%url, "Host known to challenge, going straight to browser");
                return self.get_html_browser(url).await;
            }
        }

        match self.get_html_plain(url).await {
            Ok(body) if !looks_like_challenge(&body) => {
                trace!(%url, "Fetched via plain HTTP");
                return Ok(body);
            }
            Ok(_) => {
                debug!(%url, "Challenge interstitial detected, escalating to browser");
                if let Some(host) = host {
                    self.challenged_hosts.insert(host);
                }
            }
            Err(e) => {
                debug!(%url, "Plain HTTP fetch failed ({e}), escalating to browser");
            }
        }
        self.get_html_browser(url).await
    }

    /// Plain HTTP tier. Non-success statuses become [`Error::UpstreamHttp`].
    pub async fn get_html_plain(&self, url: &str) -> Result<String> {
        let resp = self.http.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(Error::UpstreamHttp {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(resp.text().await?)
    }

    /// Browser tier. Requires the shared driver to be started; a fetch-pool
    /// permit is held until the HTML has been captured.
    pub async fn get_html_browser(&self, url: &str) -> Result<String> {
        let _permit = self.driver.fetch_permit().await?;
        let session = self.driver.session().await?;

        let result = async {
            session.page().goto(url).await.map_err(|e| {
                warn!(%url, "Browser navigation failed: {e}");
                Error::NavigationTimeout {
                    url: url.to_string(),
                }
            })?;
            let _ = session.page().wait_for_navigation().await;
            // Challenge pages clear themselves after a short delay; give the
            // interstitial one chance to settle before reading the DOM.
            let html = session.page().content().await?;
            if looks_like_challenge(&html) {
                tokio::time::sleep(Duration::from_secs(6)).await;
                let settled = session.page().content().await?;
                return Ok(settled);
            }
            Ok(html)
        }
        .await;

        let close_result = session.close().await;
        if let Err(e) = close_result {
            debug!(%url, "Session close failed: {e}");
        }
        result
    }
}
