//! Headless Chromium page source
//!
//! One browser process and one tab serve the whole crawl. Images are
//! disabled, and each load waits a fixed settle interval for client-side
//! rendering before the DOM is serialized.

use crate::config::FetchConfig;
use crate::crawler::fetcher::{FetchError, LoadedDocument, PageSource};
use crate::ScraperError;
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::error::CdpError;
use chromiumoxide::Page;
use futures::StreamExt;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use url::Url;

pub struct BrowserSource {
    browser: Browser,
    handler: JoinHandle<()>,
    page: Option<Page>,
    timeout: Duration,
    settle: Duration,
}

impl BrowserSource {
    /// Launches a headless browser session
    ///
    /// # Returns
    ///
    /// * `Ok(BrowserSource)` - Browser is running and its event loop is driven
    /// * `Err(ScraperError::Browser)` - No usable Chromium, or it failed to start
    pub async fn launch(config: &FetchConfig) -> Result<Self, ScraperError> {
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .arg("--blink-settings=imagesEnabled=false")
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg(format!("--user-agent={}", config.user_agent))
            .request_timeout(config.timeout());

        if let Some(path) = &config.chrome_executable {
            builder = builder.chrome_executable(path);
        }

        let browser_config = builder.build().map_err(ScraperError::Browser)?;
        let (browser, mut events) = Browser::launch(browser_config)
            .await
            .map_err(|e| ScraperError::Browser(e.to_string()))?;

        // The CDP connection only makes progress while its handler is polled
        let handler = tokio::spawn(async move {
            while let Some(event) = events.next().await {
                if let Err(e) = event {
                    debug!("Browser event loop stopped: {}", e);
                    break;
                }
            }
        });

        info!("Headless browser session started");

        Ok(Self {
            browser,
            handler,
            page: None,
            timeout: config.timeout(),
            settle: config.settle(),
        })
    }

    /// Returns the session tab, opening it on first use or after a reset
    async fn tab(&mut self) -> Result<Page, FetchError> {
        if let Some(page) = &self.page {
            return Ok(page.clone());
        }

        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| FetchError::Browser(e.to_string()))?;
        self.page = Some(page.clone());
        Ok(page)
    }

    /// Drops the current tab so the next load starts from a fresh one
    async fn reset_tab(&mut self) {
        if let Some(page) = self.page.take() {
            if let Err(e) = page.close().await {
                debug!("Failed to close tab: {}", e);
            }
        }
    }
}

#[async_trait]
impl PageSource for BrowserSource {
    fn name(&self) -> &'static str {
        "browser"
    }

    async fn load(&mut self, url: &Url) -> Result<LoadedDocument, FetchError> {
        let page = self.tab().await?;

        match tokio::time::timeout(self.timeout, page.goto(url.as_str())).await {
            Err(_) => {
                self.reset_tab().await;
                return Err(FetchError::Timeout(self.timeout));
            }
            Ok(Err(e)) => {
                self.reset_tab().await;
                return Err(classify_cdp_error(e, self.timeout));
            }
            Ok(Ok(_)) => {}
        }

        tokio::time::sleep(self.settle).await;

        let html = page
            .content()
            .await
            .map_err(|e| FetchError::Browser(e.to_string()))?;

        // Redirects and client-side navigation move the document
        let final_url = match page.url().await {
            Ok(Some(current)) => Url::parse(&current)
                .ok()
                .filter(|u| matches!(u.scheme(), "http" | "https"))
                .unwrap_or_else(|| url.clone()),
            Ok(None) => url.clone(),
            Err(e) => {
                debug!("Could not read tab URL: {}", e);
                url.clone()
            }
        };

        Ok(LoadedDocument { final_url, html })
    }

    async fn close(&mut self) -> Result<(), ScraperError> {
        self.reset_tab().await;

        let closed = self
            .browser
            .close()
            .await
            .map_err(|e| ScraperError::Browser(e.to_string()));
        if let Err(e) = self.browser.wait().await {
            warn!("Browser process did not exit cleanly: {}", e);
        }
        self.handler.abort();

        info!("Headless browser session closed");
        closed.map(|_| ())
    }
}

/// Maps a CDP error onto the crawler's failure taxonomy
fn classify_cdp_error(error: CdpError, timeout: Duration) -> FetchError {
    match error {
        CdpError::Timeout => FetchError::Timeout(timeout),
        other => {
            let message = other.to_string();
            if message.contains("net::ERR_") {
                FetchError::Connection(message)
            } else {
                FetchError::Browser(message)
            }
        }
    }
}
