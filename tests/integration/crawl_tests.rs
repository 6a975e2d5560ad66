//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and run the full
//! crawl cycle end-to-end through the plain HTTP page source, writing real
//! PDFs and manifests into temporary directories.

use site2pdf::config::{validate, Renderer, ScraperConfig};
use site2pdf::crawler::{run_crawl, ContentExtractor, CrawlReport};
use site2pdf::output::ManifestFile;
use lopdf::{Document, Object};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CONTENT: &str = "<p>Community gardens grow vegetables for the whole neighbourhood.</p>";

/// Creates a fast test configuration pointing at the mock server
fn create_test_config(server: &MockServer, out: &TempDir, max_pages: u32) -> ScraperConfig {
    let mut config = ScraperConfig::default();
    config.crawl.start_url = server.uri();
    config.crawl.max_pages = max_pages;
    config.crawl.delay_between_requests = 0.0;
    config.fetch.renderer = Renderer::Http;
    config.fetch.timeout_seconds = 1;
    config.fetch.retry_delay = 0.0;
    config.fetch.max_retry_delay = 0.0;
    config.output.directory = out.path().to_path_buf();
    config.output.log_file = false;
    validate(&config).expect("test config is valid");
    config
}

/// Serves `body` as HTML at `route`
async fn mount_page(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/html"))
        .mount(server)
        .await;
}

/// Minimal HTML page: navigation links plus a body
fn html(links: &[&str], body: &str) -> String {
    let anchors: String = links
        .iter()
        .map(|l| format!(r#"<a href="{}">{}</a>"#, l, l))
        .collect();
    format!(
        "<html><head><title>Test</title></head><body><nav>{}</nav>{}</body></html>",
        anchors, body
    )
}

async fn crawl(config: &ScraperConfig) -> CrawlReport {
    run_crawl(config, CancellationToken::new())
        .await
        .expect("crawl completes")
}

fn read_manifest(report: &CrawlReport) -> ManifestFile {
    let contents = std::fs::read_to_string(&report.manifest_path).expect("manifest exists");
    serde_json::from_str(&contents).expect("manifest is valid JSON")
}

fn pdf_names(report: &CrawlReport) -> Vec<String> {
    report
        .pdfs
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
        .collect()
}

/// Every string drawn with `Tj` across all sheets of a PDF
fn pdf_text_runs(path: &Path) -> Vec<String> {
    let doc = Document::load(path).expect("PDF parses");
    let mut runs = Vec::new();
    for (_, page_id) in doc.get_pages() {
        let content = doc.get_and_decode_page_content(page_id).unwrap();
        for op in content.operations {
            if op.operator == "Tj" {
                if let Some(Object::String(bytes, _)) = op.operands.first() {
                    runs.push(String::from_utf8_lossy(bytes).to_string());
                }
            }
        }
    }
    runs
}

#[tokio::test]
async fn test_single_page_produces_one_pdf() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();
    mount_page(
        &server,
        "/",
        "<html><body><nav>Menu</nav><p>Hello world test content here</p><footer>F</footer></body></html>"
            .to_string(),
    )
    .await;

    let report = crawl(&create_test_config(&server, &out, 1)).await;

    assert_eq!(report.statistics.pages_fetched, 1);
    assert_eq!(report.pdfs.len(), 1);

    let name = &pdf_names(&report)[0];
    assert!(name.starts_with("001_"));
    assert!(name.ends_with("_127_0_0_1.pdf"), "unexpected name {}", name);

    let bytes = std::fs::read(&report.pdfs[0]).unwrap();
    assert!(bytes.starts_with(b"%PDF"));

    // Navigation and footer text never reach the document body
    let runs = pdf_text_runs(&report.pdfs[0]);
    assert!(runs.contains(&"Hello world test content here".to_string()));
    assert!(!runs.iter().any(|run| run.contains("Menu")));
    assert!(!runs.iter().any(|run| run == "F"));

    // Only the PDF and the manifest remain in the output directory
    let entries = std::fs::read_dir(out.path()).unwrap().count();
    assert_eq!(entries, 2);
}

#[test]
fn test_navigation_and_footer_text_excluded() {
    let extractor = ContentExtractor::from_config(&Default::default());
    let page = extractor.extract(
        "<nav>Menu</nav><p>Hello world test content here</p><footer>F</footer>",
        &Url::parse("https://example.com").unwrap(),
    );

    assert_eq!(page.text, "Hello world test content here");
    assert!(!page.text.contains("Menu"));
}

#[tokio::test]
async fn test_timed_out_page_recorded_and_crawl_continues() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();
    let base = server.uri();

    mount_page(&server, "/", html(&["/slow", "/next"], CONTENT)).await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(CONTENT, "text/html")
                .set_delay(Duration::from_secs(3)),
        )
        .expect(3)
        .mount(&server)
        .await;
    mount_page(&server, "/next", html(&[], CONTENT)).await;

    let report = crawl(&create_test_config(&server, &out, 10)).await;

    assert_eq!(report.statistics.pages_failed, 1);
    assert_eq!(report.statistics.pages_fetched, 2);
    assert_eq!(report.pdfs.len(), 2);

    let manifest = read_manifest(&report);
    assert!(manifest.urls.contains(&format!("{}/slow", base)));
    assert!(manifest.urls.contains(&format!("{}/next", base)));
}

#[tokio::test]
async fn test_short_page_follows_links_without_pdf() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    mount_page(&server, "/", html(&["/more"], "<p>Tiny</p>")).await;
    mount_page(&server, "/more", html(&[], CONTENT)).await;

    let report = crawl(&create_test_config(&server, &out, 10)).await;

    assert_eq!(report.statistics.pages_fetched, 2);
    assert_eq!(report.statistics.low_value_pages, 1);
    assert_eq!(report.pdfs.len(), 1);
    assert_eq!(read_manifest(&report).total_urls, 2);
}

#[tokio::test]
async fn test_breadth_first_discovery_order() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();
    let base = server.uri();

    mount_page(&server, "/", html(&["/zebra", "/apple"], CONTENT)).await;
    mount_page(&server, "/zebra", html(&["/zebra/deep"], CONTENT)).await;
    mount_page(&server, "/apple", html(&["/apple/deep"], CONTENT)).await;
    mount_page(&server, "/zebra/deep", html(&[], CONTENT)).await;
    mount_page(&server, "/apple/deep", html(&[], CONTENT)).await;

    let report = crawl(&create_test_config(&server, &out, 10)).await;

    let manifest = read_manifest(&report);
    assert_eq!(
        manifest.urls,
        vec![
            format!("{}/", base),
            format!("{}/zebra", base),
            format!("{}/apple", base),
            format!("{}/zebra/deep", base),
            format!("{}/apple/deep", base),
        ]
    );

    let requested: Vec<String> = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(|r| r.url.path().to_string())
        .collect();
    assert_eq!(
        requested,
        vec!["/", "/zebra", "/apple", "/zebra/deep", "/apple/deep"]
    );
}

#[tokio::test]
async fn test_relative_links_follow_trailing_slash_redirect() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();
    let base = server.uri();

    mount_page(&server, "/", html(&["/docs/"], CONTENT)).await;
    // The normalized link drops the slash; the server puts it back
    Mock::given(method("GET"))
        .and(path("/docs"))
        .respond_with(ResponseTemplate::new(301).insert_header("Location", "/docs/"))
        .mount(&server)
        .await;
    mount_page(&server, "/docs/", html(&["intro"], CONTENT)).await;
    mount_page(&server, "/docs/intro", html(&[], CONTENT)).await;

    let report = crawl(&create_test_config(&server, &out, 10)).await;

    assert_eq!(report.statistics.pages_fetched, 3);
    assert_eq!(report.statistics.pages_failed, 0);

    let manifest = read_manifest(&report);
    assert_eq!(
        manifest.urls,
        vec![
            format!("{}/", base),
            format!("{}/docs", base),
            format!("{}/docs/intro", base),
        ]
    );
    assert!(!manifest.urls.contains(&format!("{}/intro", base)));
}

#[tokio::test]
async fn test_page_budget_never_exceeded() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    let links: Vec<String> = (0..8).map(|i| format!("/p{}", i)).collect();
    let link_refs: Vec<&str> = links.iter().map(String::as_str).collect();
    mount_page(&server, "/", html(&link_refs, CONTENT)).await;
    for link in &links {
        mount_page(&server, link, html(&[], CONTENT)).await;
    }

    let report = crawl(&create_test_config(&server, &out, 3)).await;

    assert_eq!(report.statistics.pages_attempted(), 3);
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
    assert_eq!(report.pdfs.len(), 3);

    // Discovery is not limited by the budget
    assert_eq!(read_manifest(&report).total_urls, 9);
}

#[tokio::test]
async fn test_manifest_and_filenames_unique() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    // Every page links to every other page, in several spellings
    let all = ["/", "/a", "/a/", "/b#top", "/b", "/c?utm_source=x", "/c"];
    for route in ["/", "/a", "/b", "/c"] {
        mount_page(&server, route, html(&all, CONTENT)).await;
    }

    let report = crawl(&create_test_config(&server, &out, 20)).await;

    let manifest = read_manifest(&report);
    let unique: HashSet<&String> = manifest.urls.iter().collect();
    assert_eq!(unique.len(), manifest.urls.len());
    assert_eq!(manifest.total_urls, 4);

    let names = pdf_names(&report);
    let unique_names: HashSet<&String> = names.iter().collect();
    assert_eq!(names.len(), 4);
    assert_eq!(unique_names.len(), names.len());
}

#[tokio::test]
async fn test_permanent_failures_not_retried() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    mount_page(&server, "/", html(&["/missing", "/download"], CONTENT)).await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/download"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("%PDF-1.4", "application/pdf"))
        .expect(1)
        .mount(&server)
        .await;

    let report = crawl(&create_test_config(&server, &out, 10)).await;

    assert_eq!(report.statistics.pages_fetched, 1);
    assert_eq!(report.statistics.pages_failed, 2);
    assert_eq!(report.statistics.requests_made, 3);
}

#[tokio::test]
async fn test_server_errors_retried_then_recover() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    mount_page(&server, "/", html(&["/flaky"], CONTENT)).await;
    // First answer fails, later ones succeed
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    mount_page(&server, "/flaky", html(&[], CONTENT)).await;

    let report = crawl(&create_test_config(&server, &out, 10)).await;

    assert_eq!(report.statistics.pages_fetched, 2);
    assert_eq!(report.statistics.pages_failed, 0);
    assert_eq!(report.statistics.requests_made, 3);
}

#[tokio::test]
async fn test_cancelled_crawl_still_writes_manifest() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();
    mount_page(&server, "/", html(&["/a"], CONTENT)).await;

    let cancel = CancellationToken::new();
    cancel.cancel();
    let report = run_crawl(&create_test_config(&server, &out, 10), cancel)
        .await
        .unwrap();

    assert!(report.statistics.cancelled);
    assert_eq!(report.statistics.pages_attempted(), 0);
    assert!(report.pdfs.is_empty());

    let manifest = read_manifest(&report);
    assert_eq!(manifest.urls, vec![format!("{}/", server.uri())]);
}
