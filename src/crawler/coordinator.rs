//! Crawl coordinator
//!
//! This module contains the main crawl loop that ties together all components:
//! frontier, fetch client, content extraction, link discovery, keyword
//! extraction and PDF output.

use crate::config::{Renderer, ScraperConfig};
use crate::crawler::browser::BrowserSource;
use crate::crawler::fetcher::{FetchClient, FetchError, PageSource, RetryPolicy};
use crate::crawler::frontier::{CrawlTarget, Frontier};
use crate::crawler::http::HttpSource;
use crate::crawler::parser::{ContentExtractor, ExtractedPage};
use crate::keywords::KeywordExtractor;
use crate::output::{
    CrawlManifest, CrawlStatistics, DocumentEmitter, PageRecord, PageTotal, PdfBatcher,
    PdfEmitter,
};
use crate::state::TargetState;
use crate::url::Scope;
use crate::Result;
use chrono::Utc;
use std::path::PathBuf;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use url::Url;

/// What a finished crawl produced
#[derive(Debug, Clone)]
pub struct CrawlReport {
    pub statistics: CrawlStatistics,

    /// Path of `scraped_urls.json`
    pub manifest_path: PathBuf,

    /// PDFs written, in sequence order
    pub pdfs: Vec<PathBuf>,
}

/// Main crawl coordinator
///
/// Owns the frontier, the manifest and the single fetch session. Targets are
/// processed strictly one after another.
pub struct Crawler<S: PageSource, E: DocumentEmitter> {
    scope: Scope,
    max_pages: u32,
    output_dir: PathBuf,
    client: FetchClient<S>,
    extractor: ContentExtractor,
    batcher: PdfBatcher<E>,
    frontier: Frontier,
    manifest: CrawlManifest,
    stats: CrawlStatistics,
    next_sequence: u32,
    pdfs: Vec<PathBuf>,
    cancel: CancellationToken,
}

impl<S: PageSource, E: DocumentEmitter> Crawler<S, E> {
    /// Creates a crawler seeded with the start URL
    ///
    /// # Arguments
    ///
    /// * `config` - The validated run configuration
    /// * `scope` - Site scope derived from the start URL
    /// * `start_url` - Normalized start URL
    /// * `source` - Page source for the whole crawl
    /// * `emitter` - Renderer for page records
    /// * `cancel` - Token that stops the crawl
    pub fn new(
        config: &ScraperConfig,
        scope: Scope,
        start_url: Url,
        source: S,
        emitter: E,
        cancel: CancellationToken,
    ) -> Self {
        let client = FetchClient::new(
            source,
            RetryPolicy::from_config(&config.fetch),
            config.crawl.delay(),
            cancel.clone(),
        );
        let batcher = PdfBatcher::new(
            emitter,
            KeywordExtractor::from_config(&config.keywords),
            config.output.batch_size,
        );

        let mut frontier = Frontier::new();
        let mut manifest = CrawlManifest::new(start_url.clone(), Utc::now());
        manifest.record(&start_url);
        frontier.push(CrawlTarget {
            url: start_url,
            depth: 0,
            discovered_from: None,
        });

        Self {
            scope,
            max_pages: config.crawl.max_pages,
            output_dir: config.output.directory.clone(),
            client,
            extractor: ContentExtractor::from_config(&config.extract),
            batcher,
            frontier,
            manifest,
            stats: CrawlStatistics::default(),
            next_sequence: 1,
            pdfs: Vec::new(),
            cancel,
        }
    }

    /// Runs the crawl to completion
    ///
    /// Whatever ends the loop (empty frontier, exhausted budget, cancellation
    /// or an internal error) the session is closed, buffered records are
    /// rendered and the manifest is written before returning.
    pub async fn run(mut self) -> Result<CrawlReport> {
        let start_time = Instant::now();
        tracing::info!(
            site = self.scope.site(),
            max_pages = self.max_pages,
            "Starting crawl"
        );

        let outcome = self.crawl_loop().await;

        if let Err(e) = self.client.close().await {
            tracing::warn!("Failed to close page source: {}", e);
        }

        // The final batch knows the exact number of discovered URLs
        self.flush(PageTotal::Exact(self.manifest.len()));
        let manifest_path = self.manifest.write(&self.output_dir)?;

        outcome?;

        self.stats.urls_discovered = self.manifest.len();
        self.stats.requests_made = self.client.requests_made();
        self.stats.frontier_remaining = self.frontier.len();
        self.stats.cancelled = self.cancel.is_cancelled();
        self.stats.duration = start_time.elapsed();

        tracing::info!(
            attempted = self.stats.pages_attempted(),
            pdfs = self.stats.pdfs_created,
            urls = self.stats.urls_discovered,
            "Crawl completed in {:?}",
            self.stats.duration
        );

        Ok(CrawlReport {
            statistics: self.stats,
            manifest_path,
            pdfs: self.pdfs,
        })
    }

    async fn crawl_loop(&mut self) -> Result<()> {
        while self.stats.pages_attempted() < self.max_pages {
            if self.cancel.is_cancelled() {
                tracing::info!("Crawl cancelled, stopping");
                break;
            }

            let target = match self.frontier.pop() {
                Some(t) => t,
                None => {
                    tracing::info!("Frontier is empty, crawl complete");
                    break;
                }
            };

            if self.process_target(target).await?.is_none() {
                tracing::info!("Crawl cancelled during fetch, stopping");
                break;
            }

            let attempted = self.stats.pages_attempted();
            if attempted % 10 == 0 {
                tracing::info!(
                    "Progress: {} / {} pages, {} in frontier, {} URLs discovered",
                    attempted,
                    self.max_pages,
                    self.frontier.len(),
                    self.manifest.len()
                );
            }
        }

        if self.stats.pages_attempted() >= self.max_pages {
            tracing::info!(
                remaining = self.frontier.len(),
                "Page budget of {} reached",
                self.max_pages
            );
        }

        Ok(())
    }

    /// Fetches one target and feeds its results back into the crawl
    ///
    /// # Returns
    ///
    /// * `Ok(Some(state))` - The terminal state the target reached
    /// * `Ok(None)` - The fetch was abandoned because of cancellation
    async fn process_target(&mut self, target: CrawlTarget) -> Result<Option<TargetState>> {
        let state = TargetState::Pending.transition(TargetState::Fetching)?;
        tracing::debug!(url = %target.url, depth = target.depth, "Fetching");

        let page = match self.client.fetch(&target.url).await {
            Ok(page) => page,
            Err(FetchError::Cancelled) => return Ok(None),
            Err(e) => {
                let state = state.transition(TargetState::Failed)?;
                self.stats.pages_failed += 1;
                tracing::warn!(url = %target.url, error = %e, "Page failed");
                return Ok(Some(state));
            }
        };
        let state = state.transition(TargetState::Fetched)?;
        self.stats.pages_fetched += 1;

        // Links resolve against where the document actually lives
        let extracted = self.extractor.extract(&page.html, &page.final_url);
        self.discover_links(&target, &extracted);

        if self.extractor.is_low_value(&extracted.text) {
            self.stats.low_value_pages += 1;
            tracing::info!(
                url = %page.url,
                chars = extracted.text.chars().count(),
                "Too little text, no PDF"
            );
            return Ok(Some(state));
        }

        let record = PageRecord {
            url: page.url,
            fetched_at: page.fetched_at,
            raw_text: extracted.text,
            sequence_number: self.next_sequence,
            title: extracted.title,
        };
        self.next_sequence += 1;

        if self.batcher.push(record) {
            self.flush(PageTotal::AtLeast(self.manifest.len()));
        }

        Ok(Some(state))
    }

    /// Normalizes and scopes every outbound link, appending new ones
    fn discover_links(&mut self, parent: &CrawlTarget, page: &ExtractedPage) {
        let mut added = 0;
        for raw in &page.links {
            let url = match self.scope.normalize(raw, &page.base_url) {
                Ok(url) => url,
                Err(reason) => {
                    self.stats.links_skipped += 1;
                    tracing::debug!(link = %raw, reason = %reason, "Skipping link");
                    continue;
                }
            };

            let target = CrawlTarget {
                url: url.clone(),
                depth: parent.depth + 1,
                discovered_from: Some(parent.url.clone()),
            };
            if self.frontier.push(target) {
                self.manifest.record(&url);
                added += 1;
            }
        }

        tracing::debug!(
            url = %parent.url,
            links = page.links.len(),
            added,
            "Links processed"
        );
    }

    fn flush(&mut self, total: PageTotal) {
        let outcome = self.batcher.flush(total);
        self.stats.pdfs_created += outcome.written.len();
        self.stats.render_errors += outcome.failed;
        self.pdfs.extend(outcome.written);
    }
}

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Derive the site scope from the start URL
/// 2. Create the output directory
/// 3. Open the page source selected by the configuration
/// 4. Crawl breadth-first until the frontier or the page budget is exhausted
/// 5. Render PDFs in batches and write the URL manifest
///
/// # Arguments
///
/// * `config` - The validated configuration
/// * `cancel` - Token that stops the crawl early; output stays valid
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Crawl reached a terminal state
/// * `Err(ScraperError)` - Setup failed (bad start URL, no browser, unwritable output)
///
/// # Example
///
/// ```no_run
/// use site2pdf::config::{build_config, ConfigOverrides};
/// use site2pdf::crawler::run_crawl;
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let overrides = ConfigOverrides {
///     start_url: Some("https://example.com".to_string()),
///     ..Default::default()
/// };
/// let config = build_config(None, &overrides)?;
/// let report = run_crawl(&config, CancellationToken::new()).await?;
/// println!("{} PDFs", report.pdfs.len());
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: &ScraperConfig, cancel: CancellationToken) -> Result<CrawlReport> {
    let (scope, start_url) = Scope::from_config(&config.crawl)?;
    std::fs::create_dir_all(&config.output.directory)?;
    let emitter = PdfEmitter::new(&config.output.directory);

    match config.fetch.renderer {
        Renderer::Browser => {
            let source = BrowserSource::launch(&config.fetch).await?;
            Crawler::new(config, scope, start_url, source, emitter, cancel)
                .run()
                .await
        }
        Renderer::Http => {
            let source = HttpSource::new(&config.fetch)?;
            Crawler::new(config, scope, start_url, source, emitter, cancel)
                .run()
                .await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::fetcher::LoadedDocument;
    use crate::output::{KeywordSet, RenderResult};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tempfile::TempDir;

    /// In-memory site: path -> outcome; records the order of loads
    struct FakeSite {
        pages: HashMap<String, std::result::Result<String, FetchError>>,
        /// Requested path -> path the load lands on
        redirects: HashMap<String, String>,
        loads: Arc<Mutex<Vec<String>>>,
        cancel_after: Option<(usize, CancellationToken)>,
    }

    impl FakeSite {
        fn new(pages: &[(&str, std::result::Result<&str, FetchError>)]) -> Self {
            Self {
                pages: pages
                    .iter()
                    .map(|(path, outcome)| {
                        (path.to_string(), outcome.clone().map(|html| html.to_string()))
                    })
                    .collect(),
                redirects: HashMap::new(),
                loads: Arc::new(Mutex::new(Vec::new())),
                cancel_after: None,
            }
        }
    }

    #[async_trait]
    impl PageSource for FakeSite {
        fn name(&self) -> &'static str {
            "fake"
        }

        async fn load(&mut self, url: &Url) -> std::result::Result<LoadedDocument, FetchError> {
            let mut loads = self.loads.lock().unwrap();
            loads.push(url.path().to_string());
            if let Some((limit, token)) = &self.cancel_after {
                if loads.len() >= *limit {
                    token.cancel();
                }
            }
            let final_url = match self.redirects.get(url.path()) {
                Some(target) => url.join(target).unwrap(),
                None => url.clone(),
            };
            self.pages
                .get(url.path())
                .cloned()
                .unwrap_or(Err(FetchError::Status { status: 404 }))
                .map(|html| LoadedDocument { final_url, html })
        }
    }

    /// Remembers which records were emitted instead of rendering them
    #[derive(Clone, Default)]
    struct CollectingEmitter {
        emitted: Arc<Mutex<Vec<(u32, String, PageTotal)>>>,
    }

    impl DocumentEmitter for CollectingEmitter {
        fn emit(
            &self,
            record: &PageRecord,
            _keywords: &KeywordSet,
            total: PageTotal,
        ) -> RenderResult<PathBuf> {
            self.emitted.lock().unwrap().push((
                record.sequence_number,
                record.raw_text.clone(),
                total,
            ));
            Ok(PathBuf::from(format!("{:03}.pdf", record.sequence_number)))
        }
    }

    fn config(dir: &TempDir, max_pages: u32, batch_size: usize) -> ScraperConfig {
        let mut config = ScraperConfig::default();
        config.crawl.start_url = "https://example.com/".to_string();
        config.crawl.max_pages = max_pages;
        config.crawl.delay_between_requests = 0.0;
        config.fetch.retry_delay = 0.0;
        config.fetch.max_retry_delay = 0.0;
        config.output.directory = dir.path().to_path_buf();
        config.output.batch_size = batch_size;
        config
    }

    async fn crawl(
        config: &ScraperConfig,
        site: FakeSite,
        emitter: CollectingEmitter,
        cancel: CancellationToken,
    ) -> CrawlReport {
        let (scope, start_url) = Scope::from_config(&config.crawl).unwrap();
        Crawler::new(config, scope, start_url, site, emitter, cancel)
            .run()
            .await
            .unwrap()
    }

    const CONTENT: &str = "<p>Plenty of readable content on this page.</p>";

    fn page(body: &str, links: &[&str]) -> String {
        let anchors: String = links
            .iter()
            .map(|l| format!(r#"<a href="{}">link</a>"#, l))
            .collect();
        format!("<html><body><nav>{}</nav>{}</body></html>", anchors, body)
    }

    #[tokio::test]
    async fn test_breadth_first_order() {
        let dir = TempDir::new().unwrap();
        let home = page(CONTENT, &["/a", "/b"]);
        let a = page(CONTENT, &["/a/deep"]);
        let b = page(CONTENT, &["/b/deep"]);
        let site = FakeSite::new(&[
            ("/", Ok(home.as_str())),
            ("/a", Ok(a.as_str())),
            ("/b", Ok(b.as_str())),
            ("/a/deep", Ok(CONTENT)),
            ("/b/deep", Ok(CONTENT)),
        ]);
        let loads = site.loads.clone();

        let report = crawl(
            &config(&dir, 10, 25),
            site,
            CollectingEmitter::default(),
            CancellationToken::new(),
        )
        .await;

        assert_eq!(
            *loads.lock().unwrap(),
            vec!["/", "/a", "/b", "/a/deep", "/b/deep"]
        );
        assert_eq!(report.statistics.pages_fetched, 5);
        assert_eq!(report.statistics.urls_discovered, 5);
    }

    #[tokio::test]
    async fn test_links_resolve_against_redirect_target() {
        let dir = TempDir::new().unwrap();
        let home = page(CONTENT, &["/docs/"]);
        let docs = page(CONTENT, &["intro"]);
        let mut site = FakeSite::new(&[
            ("/", Ok(home.as_str())),
            ("/docs", Ok(docs.as_str())),
            ("/docs/intro", Ok(CONTENT)),
        ]);
        site.redirects.insert("/docs".to_string(), "/docs/".to_string());
        let loads = site.loads.clone();

        let report = crawl(
            &config(&dir, 10, 25),
            site,
            CollectingEmitter::default(),
            CancellationToken::new(),
        )
        .await;

        assert_eq!(*loads.lock().unwrap(), vec!["/", "/docs", "/docs/intro"]);
        assert_eq!(report.statistics.pages_failed, 0);

        let manifest = std::fs::read_to_string(&report.manifest_path).unwrap();
        let file: crate::output::ManifestFile = serde_json::from_str(&manifest).unwrap();
        assert_eq!(
            file.urls,
            vec![
                "https://example.com/",
                "https://example.com/docs",
                "https://example.com/docs/intro"
            ]
        );
    }

    #[tokio::test]
    async fn test_budget_is_hard_ceiling() {
        let dir = TempDir::new().unwrap();
        let home = page(CONTENT, &["/1", "/2", "/3", "/4"]);
        let site = FakeSite::new(&[
            ("/", Ok(home.as_str())),
            ("/1", Err(FetchError::Timeout(Duration::from_secs(1)))),
            ("/2", Ok(CONTENT)),
            ("/3", Ok(CONTENT)),
            ("/4", Ok(CONTENT)),
        ]);
        let loads = site.loads.clone();

        let report = crawl(
            &config(&dir, 3, 25),
            site,
            CollectingEmitter::default(),
            CancellationToken::new(),
        )
        .await;

        assert_eq!(report.statistics.pages_attempted(), 3);
        assert_eq!(report.statistics.pages_failed, 1);
        // three attempts for the timing-out page
        assert_eq!(loads.lock().unwrap().len(), 5);
        assert_eq!(report.statistics.requests_made, 5);
        assert_eq!(report.statistics.frontier_remaining, 2);
    }

    #[tokio::test]
    async fn test_failed_page_stays_in_manifest() {
        let dir = TempDir::new().unwrap();
        let home = page(CONTENT, &["/slow", "/next"]);
        let site = FakeSite::new(&[
            ("/", Ok(home.as_str())),
            ("/slow", Err(FetchError::Timeout(Duration::from_secs(30)))),
            ("/next", Ok(CONTENT)),
        ]);

        let report = crawl(
            &config(&dir, 10, 25),
            site,
            CollectingEmitter::default(),
            CancellationToken::new(),
        )
        .await;

        assert_eq!(report.statistics.pages_failed, 1);
        assert_eq!(report.statistics.pages_fetched, 2);

        let manifest = std::fs::read_to_string(&report.manifest_path).unwrap();
        assert!(manifest.contains("https://example.com/slow"));
        assert!(manifest.contains("https://example.com/next"));
    }

    #[tokio::test]
    async fn test_low_value_page_still_discovers_links() {
        let dir = TempDir::new().unwrap();
        let home = page("<p>Tiny</p>", &["/more"]);
        let site = FakeSite::new(&[("/", Ok(home.as_str())), ("/more", Ok(CONTENT))]);
        let emitter = CollectingEmitter::default();

        let report = crawl(
            &config(&dir, 10, 25),
            site,
            emitter.clone(),
            CancellationToken::new(),
        )
        .await;

        assert_eq!(report.statistics.low_value_pages, 1);
        assert_eq!(report.statistics.pdfs_created, 1);
        let emitted = emitter.emitted.lock().unwrap();
        assert_eq!(emitted.len(), 1);
        assert_eq!(emitted[0].0, 1);
    }

    #[tokio::test]
    async fn test_batches_use_provisional_then_exact_totals() {
        let dir = TempDir::new().unwrap();
        let home = page(CONTENT, &["/a", "/b"]);
        let site = FakeSite::new(&[("/", Ok(home.as_str())), ("/a", Ok(CONTENT)), ("/b", Ok(CONTENT))]);
        let emitter = CollectingEmitter::default();

        crawl(
            &config(&dir, 10, 2),
            site,
            emitter.clone(),
            CancellationToken::new(),
        )
        .await;

        let totals: Vec<PageTotal> = emitter
            .emitted
            .lock()
            .unwrap()
            .iter()
            .map(|(_, _, total)| *total)
            .collect();
        assert_eq!(
            totals,
            vec![
                PageTotal::AtLeast(3),
                PageTotal::AtLeast(3),
                PageTotal::Exact(3)
            ]
        );
    }

    #[tokio::test]
    async fn test_off_site_and_duplicate_links_ignored() {
        let dir = TempDir::new().unwrap();
        let home = page(
            CONTENT,
            &[
                "/a",
                "/a/",
                "/a#section",
                "http://example.com/a",
                "https://other.org/",
                "https://blog.example.com/post",
                "/login",
                "/file.pdf",
                "mailto:someone@example.com",
            ],
        );
        let site = FakeSite::new(&[("/", Ok(home.as_str())), ("/a", Ok(CONTENT))]);

        let report = crawl(
            &config(&dir, 10, 25),
            site,
            CollectingEmitter::default(),
            CancellationToken::new(),
        )
        .await;

        let manifest = std::fs::read_to_string(&report.manifest_path).unwrap();
        let file: crate::output::ManifestFile = serde_json::from_str(&manifest).unwrap();
        assert_eq!(
            file.urls,
            vec![
                "https://example.com/",
                "https://example.com/a",
                "https://blog.example.com/post"
            ]
        );
        assert_eq!(report.statistics.links_skipped, 4);
    }

    #[tokio::test]
    async fn test_cancellation_flushes_and_writes_manifest() {
        let dir = TempDir::new().unwrap();
        let home = page(CONTENT, &["/a", "/b", "/c"]);
        let cancel = CancellationToken::new();
        let mut site = FakeSite::new(&[
            ("/", Ok(home.as_str())),
            ("/a", Ok(CONTENT)),
            ("/b", Ok(CONTENT)),
            ("/c", Ok(CONTENT)),
        ]);
        site.cancel_after = Some((2, cancel.clone()));
        let emitter = CollectingEmitter::default();

        let report = crawl(&config(&dir, 10, 25), site, emitter.clone(), cancel).await;

        assert!(report.statistics.cancelled);
        assert_eq!(report.statistics.pages_attempted(), 2);
        assert_eq!(emitter.emitted.lock().unwrap().len(), 2);
        assert_eq!(report.statistics.urls_discovered, 4);
        assert!(report.manifest_path.exists());
    }
}
