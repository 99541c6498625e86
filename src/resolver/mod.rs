//! Intermediate-host URL resolution.
//!
//! Every known locker host falls into one of three tiers, ordered by cost:
//! pure string transforms, token API calls, and full browser click-through.
//! `resolve` always hands back the same [`ResolutionResult`] shape so
//! callers never branch on host type; an unrecognized host is refused
//! before any tier is attempted.

mod browser_host;
mod direct;
mod gofile;
mod selectors;

pub use selectors::{CLICK_CANDIDATES, CLICK_KEYWORDS};

use crate::driver::SharedDriver;
use crate::error::{Error, Result};
use crate::extract::identify_host;
use crate::model::ResolutionResult;
use std::time::Duration;
use tracing::{info, warn};

/// Resolution strategy for a classified host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostTier {
    /// Requires simulated interaction through the shared browser.
    Browser,
    /// Resolvable through the host's public API, no browser.
    TokenApi,
    /// Direct URL is a pure function of the input URL.
    Transform,
}

/// Classify a URL into its resolution tier, or `None` for unknown hosts.
pub fn classify(url: &str) -> Option<(&'static str, HostTier)> {
    let host = identify_host(url)?;
    let tier = match host {
        "gdrive" | "pixeldrain" => HostTier::Transform,
        "gofile" => HostTier::TokenApi,
        _ => HostTier::Browser,
    };
    Some((host, tier))
}

/// Resolves locker URLs to direct-download URLs.
#[derive(Clone)]
pub struct LinkResolver {
    driver: SharedDriver,
    http: reqwest::Client,
    timeout: Duration,
}

impl LinkResolver {
    pub fn new(driver: SharedDriver, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(crate::driver::USER_AGENT)
            .timeout(Duration::from_secs(20))
            .build()?;
        Ok(Self {
            driver,
            http,
            timeout,
        })
    }

    /// Resolve one intermediate URL.
    ///
    /// Host-level failures come back as unsuccessful [`ResolutionResult`]
    /// values with the original URL retained. `Err` is reserved for the
    /// driver being unavailable when a browser tier needs it.
    pub async fn resolve(&self, url: &str) -> Result<ResolutionResult> {
        let Some((host, tier)) = classify(url) else {
            let err = Error::UnsupportedHost {
                url: url.to_string(),
            };
            warn!(%url, "Refusing unrecognized host");
            return Ok(ResolutionResult::failure(url, err));
        };

        info!(%url, host, ?tier, "Resolving locker URL");
        match tier {
            HostTier::Transform => Ok(match host {
                "gdrive" => direct::resolve_gdrive(url),
                _ => direct::resolve_pixeldrain(url),
            }),
            HostTier::TokenApi => {
                let resolver = gofile::GofileResolver::new(self.http.clone());
                Ok(resolver.resolve(url).await)
            }
            HostTier::Browser => {
                if !self.driver.is_ready().await {
                    return Err(Error::DriverNotReady);
                }
                match tokio::time::timeout(self.timeout, browser_host::resolve(&self.driver, url))
                    .await
                {
                    Ok(result) => absorb_session_error(url, result),
                    Err(_) => {
                        warn!(%url, "Resolution timed out");
                        Ok(ResolutionResult::failure(
                            url,
                            Error::ResolutionExhausted {
                                url: url.to_string(),
                            },
                        ))
                    }
                }
            }
        }
    }
}

/// Keeps the uniform result shape for browser-tier sessions: navigation or
/// listener failures are host failures carried in the result value. Only a
/// lost driver escapes as `Err`.
fn absorb_session_error(url: &str, result: Result<ResolutionResult>) -> Result<ResolutionResult> {
    match result {
        Err(err @ Error::DriverNotReady) => Err(err),
        Err(err) => {
            warn!(%url, %err, "Session failed mid-resolution");
            Ok(ResolutionResult::failure(url, err))
        }
        ok => ok,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_covers_all_tiers() {
        assert_eq!(
            classify("https://drive.google.com/d/X/view"),
            Some(("gdrive", HostTier::Transform))
        );
        assert_eq!(
            classify("https://pixeldrain.com/u/abc"),
            Some(("pixeldrain", HostTier::Transform))
        );
        assert_eq!(
            classify("https://gofile.io/d/abc"),
            Some(("gofile", HostTier::TokenApi))
        );
        assert_eq!(
            classify("https://hubdrive.space/file/99"),
            Some(("hubdrive", HostTier::Browser))
        );
        assert_eq!(classify("https://unknownhost.example/file/1"), None);
    }

    #[test]
    fn session_errors_become_failure_values() {
        let url = "https://hubdrive.space/file/99";
        let result = absorb_session_error(
            url,
            Err(Error::NavigationTimeout {
                url: url.to_string(),
            }),
        )
        .unwrap();
        assert!(!result.success);
        assert_eq!(result.original_url, url);
        assert!(result.error.unwrap().contains("navigation"));
    }

    #[test]
    fn lost_driver_still_surfaces_as_err() {
        let result = absorb_session_error("https://hubdrive.space/file/99", Err(Error::DriverNotReady));
        assert!(matches!(result, Err(Error::DriverNotReady)));
    }
}
