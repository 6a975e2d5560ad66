//! Output records and the document emitter seam
//!
//! This module defines what the crawler hands to the output layer and the
//! trait every document renderer implements.

use chrono::{DateTime, Utc};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;
use url::Url;

/// Errors that can occur while rendering or writing one document
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Failed to build PDF: {0}")]
    Pdf(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type RenderResult<T> = Result<T, RenderError>;

/// Text of one successfully fetched page, waiting to be rendered
#[derive(Debug, Clone)]
pub struct PageRecord {
    pub url: Url,

    pub fetched_at: DateTime<Utc>,

    /// Cleaned text as produced by extraction
    pub raw_text: String,

    /// 1-based, strictly increasing in creation order
    pub sequence_number: u32,

    pub title: Option<String>,
}

/// Keywords derived from one record; never mutated after creation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordSet {
    pub terms: Vec<String>,

    /// Sequence number of the record the terms were extracted from
    pub source_sequence: u32,
}

/// The "Y" in "page X of Y"
///
/// While the crawl runs only a lower bound is known; the final flush knows
/// the exact number of discovered URLs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageTotal {
    AtLeast(usize),
    Exact(usize),
}

impl PageTotal {
    /// "Page 3 of 12" or "Page 3 of at least 12"
    pub fn label(&self, sequence: u32) -> String {
        format!("Page {} of {}", sequence, self)
    }
}

impl fmt::Display for PageTotal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AtLeast(n) => write!(f, "at least {}", n),
            Self::Exact(n) => write!(f, "{}", n),
        }
    }
}

/// Trait for document renderers
///
/// An emitter turns one record into one file on disk. A failure affects
/// only that record.
pub trait DocumentEmitter {
    /// Renders `record` and returns the path of the written file
    ///
    /// # Arguments
    ///
    /// * `record` - The page to render
    /// * `keywords` - Keywords used for the filename and metadata
    /// * `total` - Total for the "page X of Y" label
    fn emit(
        &self,
        record: &PageRecord,
        keywords: &KeywordSet,
        total: PageTotal,
    ) -> RenderResult<PathBuf>;
}
