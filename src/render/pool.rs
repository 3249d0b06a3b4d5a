use crate::config::RenderPoolConfig;
use crate::render::RenderError;

#[cfg(feature = "browser")]
use crate::render::RENDER_OK_STATUS;
#[cfg(feature = "browser")]
use chromiumoxide::page::ScreenshotParams;
#[cfg(feature = "browser")]
use chromiumoxide::{Browser, BrowserConfig, Page};
#[cfg(feature = "browser")]
use futures::StreamExt;
#[cfg(feature = "browser")]
use std::path::Path;
#[cfg(feature = "browser")]
use std::sync::Arc;
#[cfg(feature = "browser")]
use std::time::Duration;
#[cfg(feature = "browser")]
use tokio::sync::{Mutex, Semaphore};

/// Resolves once the DOM is interactive; the looser wait used by the
/// navigation retry
#[cfg(feature = "browser")]
const DOM_READY_SCRIPT: &str = r#"
    new Promise((resolve) => {
        if (document.readyState === 'complete' || document.readyState === 'interactive') {
            resolve(document.readyState);
        } else {
            document.addEventListener('DOMContentLoaded', () => resolve(document.readyState));
            setTimeout(() => resolve('timeout'), 10000);
        }
    })
"#;

/// Arena of reusable browser pages guarded by a counting semaphore
///
/// At most `pool_size` renders run at once; callers wait a bounded time for
/// a slot and fail the single render (never the crawl) when none frees up.
/// Checked-in pages are reset to a blank document; a page that fails its
/// reset is discarded and a replacement is created lazily on the next
/// checkout.
#[cfg(feature = "browser")]
pub struct RenderPool {
    browser: Browser,
    idle: Mutex<Vec<Page>>,
    slots: Arc<Semaphore>,
    config: RenderPoolConfig,
    _handler: tokio::task::JoinHandle<()>,
}

#[cfg(feature = "browser")]
impl RenderPool {
    /// Launches the browser process and prepares an empty page arena
    ///
    /// Pages are created lazily on first checkout rather than up front, so
    /// a pool that never renders costs one browser process and nothing
    /// else.
    pub async fn launch(config: &RenderPoolConfig, headless: bool) -> Result<Self, RenderError> {
        let mut builder = BrowserConfig::builder();

        if !headless {
            // with_head disables headless mode
            builder = builder.with_head();
        }

        builder = builder
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--disable-dev-shm-usage")
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--no-sandbox")
            .arg("--disable-gpu");

        let browser_config = builder.build().map_err(RenderError::Launch)?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| RenderError::Launch(e.to_string()))?;

        let handle = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        tracing::info!(
            "Render pool ready ({} page slots, headless={})",
            config.pool_size,
            headless
        );

        Ok(Self {
            browser,
            idle: Mutex::new(Vec::new()),
            slots: Arc::new(Semaphore::new(config.pool_size)),
            config: config.clone(),
            _handler: handle,
        })
    }

    /// Renders a page and returns its final HTML with a status code
    pub async fn render(&self, url: &str) -> Result<(String, u16), RenderError> {
        let _permit = self.acquire_slot().await?;
        let page = self.checkout().await?;

        let result = self.navigate_and_capture(&page, url).await;

        match &result {
            Ok(_) => self.checkin(page).await,
            Err(_) => {
                // A page that failed navigation is in an unknown state
                let _ = page.close().await;
            }
        }

        result
    }

    /// Captures a full-page screenshot, returning bytes or writing to a
    /// path
    pub async fn screenshot(
        &self,
        url: &str,
        output: Option<&Path>,
    ) -> Result<Option<Vec<u8>>, RenderError> {
        let _permit = self.acquire_slot().await?;
        let page = self.checkout().await?;

        let result = self.navigate(&page, url).await;
        let result = match result {
            Ok(()) => {
                let params = ScreenshotParams::builder().full_page(true).build();
                match output {
                    Some(path) => page
                        .save_screenshot(params, path)
                        .await
                        .map(|_| None)
                        .map_err(|e| RenderError::Capture(e.to_string())),
                    None => page
                        .screenshot(params)
                        .await
                        .map(Some)
                        .map_err(|e| RenderError::Capture(e.to_string())),
                }
            }
            Err(e) => Err(e),
        };

        match &result {
            Ok(_) => self.checkin(page).await,
            Err(_) => {
                let _ = page.close().await;
            }
        }

        result
    }

    async fn acquire_slot(&self) -> Result<tokio::sync::SemaphorePermit<'_>, RenderError> {
        let wait = Duration::from_millis(self.config.acquire_timeout_ms);
        match tokio::time::timeout(wait, self.slots.acquire()).await {
            Ok(Ok(permit)) => Ok(permit),
            Ok(Err(_)) => Err(RenderError::Closed),
            Err(_) => Err(RenderError::Busy),
        }
    }

    /// Takes an idle page from the arena, creating one when none is waiting
    async fn checkout(&self) -> Result<Page, RenderError> {
        if let Some(page) = self.idle.lock().await.pop() {
            return Ok(page);
        }
        self.browser
            .new_page("about:blank")
            .await
            .map_err(|e| RenderError::Page(e.to_string()))
    }

    /// Resets a page to a blank document and returns it to the arena; a
    /// failed reset discards the page
    async fn checkin(&self, page: Page) {
        let reset = page.goto("about:blank").await.map(|_| ());
        match reset {
            Ok(()) => self.idle.lock().await.push(page),
            Err(e) => {
                tracing::debug!("Discarding browser page after failed reset: {}", e);
                let _ = page.close().await;
            }
        }
    }

    /// Navigates with the primary load wait, retrying once with a looser
    /// DOM-ready wait and a shorter timeout
    async fn navigate(&self, page: &Page, url: &str) -> Result<(), RenderError> {
        let primary_timeout = Duration::from_millis(self.config.nav_timeout_ms);
        let primary = tokio::time::timeout(primary_timeout, async {
            page.goto(url).await.map_err(|e| e.to_string())?;
            page.wait_for_navigation()
                .await
                .map_err(|e| e.to_string())?;
            Ok::<(), String>(())
        })
        .await;

        match primary {
            Ok(Ok(())) => return Ok(()),
            Ok(Err(e)) => tracing::debug!("Primary navigation failed for {}: {}", url, e),
            Err(_) => tracing::debug!("Primary navigation timed out for {}", url),
        }

        tokio::time::sleep(Duration::from_millis(self.config.retry_backoff_ms)).await;

        let retry_timeout = Duration::from_millis(self.config.retry_nav_timeout_ms);
        let retry = tokio::time::timeout(retry_timeout, async {
            page.goto(url).await.map_err(|e| e.to_string())?;
            // Looser condition: DOM interactive is enough on the retry
            let _ = page.evaluate(DOM_READY_SCRIPT.to_string()).await;
            Ok::<(), String>(())
        })
        .await;

        match retry {
            Ok(Ok(())) => Ok(()),
            _ => Err(RenderError::Navigation(url.to_string())),
        }
    }

    async fn navigate_and_capture(
        &self,
        page: &Page,
        url: &str,
    ) -> Result<(String, u16), RenderError> {
        self.navigate(page, url).await?;

        let capture_timeout = Duration::from_millis(self.config.retry_nav_timeout_ms);
        let content = tokio::time::timeout(capture_timeout, page.content())
            .await
            .map_err(|_| RenderError::Capture("content read timed out".to_string()))?
            .map_err(|e| RenderError::Capture(e.to_string()))?;

        Ok((content, RENDER_OK_STATUS))
    }
}

/// Stub pool for builds without browser support; every operation fails
/// cleanly and the engine falls back to plain content
#[cfg(not(feature = "browser"))]
pub struct RenderPool;

#[cfg(not(feature = "browser"))]
impl RenderPool {
    pub async fn launch(_config: &RenderPoolConfig, _headless: bool) -> Result<Self, RenderError> {
        Err(RenderError::Unavailable)
    }

    pub async fn render(&self, _url: &str) -> Result<(String, u16), RenderError> {
        Err(RenderError::Unavailable)
    }

    pub async fn screenshot(
        &self,
        _url: &str,
        _output: Option<&std::path::Path>,
    ) -> Result<Option<Vec<u8>>, RenderError> {
        Err(RenderError::Unavailable)
    }
}
