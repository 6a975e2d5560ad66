//! Page fetching with retry, pacing and cancellation
//!
//! This module handles every page load issued by the crawler, including:
//! - The [`PageSource`] seam implemented by the browser and HTTP renderers
//! - Retry logic with exponential backoff for transient failures
//! - The politeness delay between two consecutive loads
//! - Prompt abandonment of in-flight loads on cancellation
//! - Error classification

use crate::config::FetchConfig;
use crate::crawler::parser::is_empty_document;
use crate::state::SessionState;
use crate::ScraperError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use url::Url;

/// What a single load produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedDocument {
    /// Where the load ended up after redirects
    pub final_url: Url,

    /// Serialized DOM
    pub html: String,
}

/// A fully rendered page, as read from the DOM after loading settled
#[derive(Debug, Clone)]
pub struct RenderedPage {
    /// The URL that was requested; the frontier and manifest key
    pub url: Url,

    /// The document's own URL after redirects; relative links resolve here
    pub final_url: Url,

    /// Serialized DOM
    pub html: String,

    /// When the load finished
    pub fetched_at: DateTime<Utc>,

    /// Attempts spent, first try included
    pub attempts: u32,
}

/// Why a page load failed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("page load timed out after {0:?}")]
    Timeout(Duration),

    #[error("connection failed: {0}")]
    Connection(String),

    #[error("server answered HTTP {status}")]
    Status { status: u16 },

    #[error("rendered document is empty")]
    EmptyDocument,

    #[error("browser error: {0}")]
    Browser(String),

    #[error("not an HTML document ({0})")]
    NotHtml(String),

    #[error("fetch cancelled")]
    Cancelled,
}

impl FetchError {
    /// Returns true if another attempt may succeed
    ///
    /// | Condition | Transient |
    /// |-----------|-----------|
    /// | Timeout, connection, empty DOM, browser hiccup | yes |
    /// | HTTP 5xx, 408, 429 | yes |
    /// | Other HTTP 4xx/3xx | no |
    /// | Non-HTML content | no |
    /// | Cancelled | no |
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout(_) | Self::Connection(_) | Self::EmptyDocument | Self::Browser(_) => true,
            Self::Status { status } => *status >= 500 || *status == 408 || *status == 429,
            Self::NotHtml(_) | Self::Cancelled => false,
        }
    }
}

/// Something that can turn a URL into serialized HTML
///
/// Implementations perform exactly one load per call; retries, pacing and
/// cancellation belong to [`FetchClient`].
#[async_trait]
pub trait PageSource: Send {
    /// Short name used in log lines
    fn name(&self) -> &'static str;

    /// Loads `url` once and returns the serialized document with its final URL
    async fn load(&mut self, url: &Url) -> Result<LoadedDocument, FetchError>;

    /// Releases the underlying session
    async fn close(&mut self) -> Result<(), ScraperError> {
        Ok(())
    }
}

/// Retry schedule for transient failures
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts per URL, first try included
    pub max_attempts: u32,

    /// Delay before the first retry
    pub base_delay: Duration,

    /// Caps the exponential growth
    pub max_delay: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &FetchConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            base_delay: Duration::from_secs_f64(config.retry_delay),
            max_delay: Duration::from_secs_f64(config.max_retry_delay),
        }
    }

    /// Delay before retry number `retry` (1-based): `base * 2^(retry-1)`, capped
    pub fn delay_for(&self, retry: u32) -> Duration {
        if retry == 0 {
            return Duration::ZERO;
        }
        let factor = 2u32.saturating_pow(retry - 1);
        self.base_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }
}

/// Drives a [`PageSource`] with bounded retries and a politeness delay
///
/// One client owns one session for the whole crawl. Loads are strictly
/// sequential; the delay is applied before every load, retries included.
pub struct FetchClient<S: PageSource> {
    source: S,
    policy: RetryPolicy,
    session: SessionState,
    cancel: CancellationToken,
}

impl<S: PageSource> FetchClient<S> {
    /// Creates a new fetch client
    ///
    /// # Arguments
    ///
    /// * `source` - The page source performing single loads
    /// * `policy` - Retry schedule
    /// * `delay` - Minimum pause between the end of one load and the start of the next
    /// * `cancel` - Token that aborts sleeps and in-flight loads
    pub fn new(
        source: S,
        policy: RetryPolicy,
        delay: Duration,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            source,
            policy,
            session: SessionState::new(delay),
            cancel,
        }
    }

    /// Fetches a URL with full error handling and retry logic
    ///
    /// # Returns
    ///
    /// * `Ok(RenderedPage)` - A non-empty document was read
    /// * `Err(FetchError::Cancelled)` - Cancellation was requested; the target
    ///   should not be charged against the budget
    /// * `Err(FetchError)` - The last error once retries are exhausted, or the
    ///   first permanent error
    pub async fn fetch(&mut self, url: &Url) -> Result<RenderedPage, FetchError> {
        let mut attempt = 0;

        loop {
            attempt += 1;
            self.wait_for_turn().await?;

            debug!(url = %url, attempt, source = self.source.name(), "Loading page");
            self.session.record_request_start();

            let result = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => Err(FetchError::Cancelled),
                loaded = self.source.load(url) => loaded,
            };
            self.session.record_request_end(Instant::now());

            let error = match result {
                Ok(doc) if !is_empty_document(&doc.html) => {
                    if attempt > 1 {
                        debug!(url = %url, attempt, "Page loaded after retry");
                    }
                    if doc.final_url != *url {
                        debug!(url = %url, final_url = %doc.final_url, "Page was redirected");
                    }
                    return Ok(RenderedPage {
                        url: url.clone(),
                        final_url: doc.final_url,
                        html: doc.html,
                        fetched_at: Utc::now(),
                        attempts: attempt,
                    });
                }
                Ok(_) => FetchError::EmptyDocument,
                Err(e) => e,
            };

            if error == FetchError::Cancelled {
                return Err(error);
            }

            if !error.is_transient() || attempt >= self.policy.max_attempts {
                warn!(
                    url = %url,
                    attempt,
                    max_attempts = self.policy.max_attempts,
                    error = %error,
                    "Giving up on page"
                );
                return Err(error);
            }

            let delay = self.policy.delay_for(attempt);
            warn!(
                url = %url,
                attempt,
                max_attempts = self.policy.max_attempts,
                delay_ms = delay.as_millis() as u64,
                error = %error,
                "Page load failed, retrying"
            );
            self.sleep(delay).await?;
        }
    }

    /// Waits until the politeness delay since the previous load has passed
    async fn wait_for_turn(&self) -> Result<(), FetchError> {
        match self.session.time_until_next_request(Instant::now()) {
            Some(wait) => self.sleep(wait).await,
            None if self.cancel.is_cancelled() => Err(FetchError::Cancelled),
            None => Ok(()),
        }
    }

    async fn sleep(&self, duration: Duration) -> Result<(), FetchError> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(FetchError::Cancelled),
            _ = tokio::time::sleep(duration) => Ok(()),
        }
    }

    /// Loads issued so far, retries included
    pub fn requests_made(&self) -> u32 {
        self.session.request_count
    }

    /// Releases the page source session
    pub async fn close(&mut self) -> Result<(), ScraperError> {
        debug!(source = self.source.name(), "Closing page source");
        self.source.close().await
    }
}
