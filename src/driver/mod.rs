//! Shared headless-browser driver.
//!
//! One browser process serves the whole engine. Callers never touch the
//! process directly: they borrow a [`Session`] backed by an isolated
//! browser context, and concurrency is bounded by two semaphore pools so
//! page fetches cannot starve locker resolution (or the reverse).

mod launch;

pub use launch::{apply_stealth, find_browser_executable, USER_AGENT};

use crate::config::EngineConfig;
use crate::error::{Error, Result};
use chromiumoxide::browser::Browser;
use chromiumoxide::cdp::browser_protocol::browser::BrowserContextId;
use chromiumoxide::cdp::browser_protocol::target::{
    CreateBrowserContextParams, CreateTargetParams, DisposeBrowserContextParams,
};
use chromiumoxide::Page;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

struct DriverInner {
    browser: Arc<Browser>,
    handler_task: JoinHandle<()>,
    user_data_dir: PathBuf,
}

/// Handle to the shared browser. Cheap to clone; all clones share the same
/// process, health state, and semaphore pools.
#[derive(Clone)]
pub struct SharedDriver {
    inner: Arc<Mutex<Option<DriverInner>>>,
    headless: bool,
    fetch_pool: Arc<Semaphore>,
    resolve_pool: Arc<Semaphore>,
}

impl SharedDriver {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            inner: Arc::new(Mutex::new(None)),
            headless: config.headless,
            fetch_pool: Arc::new(Semaphore::new(config.fetch_pool)),
            resolve_pool: Arc::new(Semaphore::new(config.resolve_pool)),
        }
    }

    /// Launch the browser if it is not already running, or relaunch it if the
    /// existing process no longer answers a version probe.
    pub async fn ensure_started(&self) -> Result<()> {
        let mut guard = self.inner.lock().await;

        if let Some(inner) = guard.as_ref() {
            match inner.browser.version().await {
                Ok(_) => return Ok(()),
                Err(e) => {
                    warn!("Shared browser failed health check, relaunching: {e}");
                    if let Some(dead) = guard.take() {
                        dead.handler_task.abort();
                        let _ = std::fs::remove_dir_all(&dead.user_data_dir);
                    }
                }
            }
        }

        let (browser, handler_task, user_data_dir) = launch::launch_browser(self.headless).await?;
        info!("Shared browser ready (headless={})", self.headless);
        *guard = Some(DriverInner {
            browser: Arc::new(browser),
            handler_task,
            user_data_dir,
        });
        Ok(())
    }

    /// Whether a live browser is currently attached. Does not probe health.
    pub async fn is_ready(&self) -> bool {
        self.inner.lock().await.is_some()
    }

    async fn browser(&self) -> Result<Arc<Browser>> {
        let guard = self.inner.lock().await;
        match guard.as_ref() {
            Some(inner) => Ok(Arc::clone(&inner.browser)),
            None => Err(Error::DriverNotReady),
        }
    }

    /// Acquire a slot in the page-fetch pool.
    pub async fn fetch_permit(&self) -> Result<OwnedSemaphorePermit> {
        Arc::clone(&self.fetch_pool)
            .acquire_owned()
            .await
            .map_err(|_| Error::DriverNotReady)
    }

    /// Acquire a slot in the locker-resolution pool.
    pub async fn resolve_permit(&self) -> Result<OwnedSemaphorePermit> {
        Arc::clone(&self.resolve_pool)
            .acquire_owned()
            .await
            .map_err(|_| Error::DriverNotReady)
    }

    /// Open a fresh isolated session. Fails fast with [`Error::DriverNotReady`]
    /// when the browser has not been started; callers must not block on a
    /// launch they did not request.
    pub async fn session(&self) -> Result<Session> {
        let browser = self.browser().await?;

        let ctx = browser
            .execute(CreateBrowserContextParams::default())
            .await?;
        let context_id = ctx.result.browser_context_id.clone();

        let params = CreateTargetParams::builder()
            .url("about:blank")
            .browser_context_id(context_id.clone())
            .build()
            .map_err(Error::Browser)?;

        let page = match browser.new_page(params).await {
            Ok(page) => page,
            Err(e) => {
                let _ = browser
                    .execute(DisposeBrowserContextParams::new(context_id))
                    .await;
                return Err(e.into());
            }
        };

        if let Err(e) = launch::apply_stealth(&page).await {
            debug!("Stealth script injection failed: {e:#}");
        }

        Ok(Session {
            page: Some(page),
            browser,
            context_id: Some(context_id),
        })
    }

    /// Tear the browser down. Sessions still alive keep their `Arc<Browser>`
    /// until they drop, but the event handler stops and the profile dir goes.
    pub async fn shutdown(&self) {
        let mut guard = self.inner.lock().await;
        if let Some(inner) = guard.take() {
            match Arc::try_unwrap(inner.browser) {
                Ok(mut browser) => {
                    let _ = browser.close().await;
                    let _ = browser.wait().await;
                }
                Err(_) => warn!("Shutting down with live sessions outstanding"),
            }
            inner.handler_task.abort();
            let _ = std::fs::remove_dir_all(&inner.user_data_dir);
            info!("Shared browser shut down");
        }
    }
}

/// An isolated page inside its own browser context. Cookies, storage, and
/// cache never leak between sessions. Prefer [`Session::close`]; `Drop` only
/// schedules a best-effort disposal.
pub struct Session {
    page: Option<Page>,
    browser: Arc<Browser>,
    context_id: Option<BrowserContextId>,
}

impl Session {
    pub fn page(&self) -> &Page {
        // Only `close()` takes the page out, and it consumes self.
        self.page.as_ref().unwrap()
    }

    /// Close the page and dispose the backing context.
    pub async fn close(mut self) -> Result<()> {
        if let Some(page) = self.page.take() {
            let _ = page.close().await;
        }
        if let Some(id) = self.context_id.take() {
            self.browser
                .execute(DisposeBrowserContextParams::new(id))
                .await?;
        }
        Ok(())
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Some(id) = self.context_id.take() {
            let browser = Arc::clone(&self.browser);
            let page = self.page.take();
            tokio::spawn(async move {
                if let Some(page) = page {
                    let _ = page.close().await;
                }
                if let Err(e) = browser
                    .execute(DisposeBrowserContextParams::new(id))
                    .await
                {
                    debug!("Context disposal on drop failed: {e}");
                }
            });
        }
    }
}
