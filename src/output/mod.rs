//! Output module for rendering pages and recording crawl results
//!
//! This module handles:
//! - Rendering page records into paginated PDFs with deterministic filenames
//! - Batching records so memory stays bounded
//! - Writing the URL manifest
//! - Recording crawl statistics

mod batch;
mod manifest;
mod naming;
mod pdf;
pub mod stats;
mod text;
mod traits;

pub use batch::{FlushOutcome, PdfBatcher};
pub use manifest::{CrawlManifest, ManifestFile, MANIFEST_FILENAME};
pub use naming::pdf_filename;
pub use pdf::PdfEmitter;
pub use stats::{print_statistics, CrawlStatistics};
pub use text::SafeText;
pub use traits::{
    DocumentEmitter, KeywordSet, PageRecord, PageTotal, RenderError, RenderResult,
};
