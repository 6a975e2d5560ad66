//! Crawler module for page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - Browser and plain-HTTP page sources
//! - Fetching with retry, pacing and cancellation
//! - Content extraction and link discovery
//! - The breadth-first frontier
//! - Overall crawl coordination

mod browser;
mod coordinator;
mod fetcher;
mod frontier;
mod http;
mod parser;

pub use browser::BrowserSource;
pub use coordinator::{run_crawl, CrawlReport, Crawler};
pub use fetcher::{FetchClient, FetchError, LoadedDocument, PageSource, RenderedPage, RetryPolicy};
pub use frontier::{CrawlTarget, Frontier};
pub use http::{build_http_client, HttpSource};
pub use parser::{is_empty_document, ContentExtractor, ExtractedPage};
