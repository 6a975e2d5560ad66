//! URL handling module for site2pdf
//!
//! This module provides URL normalization, domain extraction, site matching
//! and the crawl [`Scope`] that decides whether a discovered link may enter the
//! frontier.

mod domain;
mod matcher;
mod normalize;

use crate::config::CrawlConfig;
use crate::{UrlError, UrlResult};
use thiserror::Error;
use url::Url;

// Re-export main functions
pub use domain::{domain_slug, site_of};
pub use matcher::{find_ignore_pattern, host_in_site};
pub use normalize::{dedup_key, normalize_url};

/// File extensions that never lead to a text page
const ASSET_EXTENSIONS: &[&str] = &[
    "pdf", "jpg", "jpeg", "png", "gif", "webp", "svg", "ico", "bmp", "tif", "tiff", "mp3",
    "mp4", "m4a", "wav", "ogg", "webm", "avi", "mov", "zip", "gz", "tgz", "rar", "7z", "tar",
    "exe", "dmg", "msi", "woff", "woff2", "ttf", "otf", "eot", "css", "js", "json", "xml",
    "rss", "doc", "docx", "xls", "xlsx", "ppt", "pptx",
];

/// Why a link was kept out of the frontier
///
/// Scope rejections are routine; the crawler drops them silently (at debug
/// level) rather than treating them as errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    #[error("not a crawlable URL: {0}")]
    Invalid(#[from] UrlError),

    #[error("host {0} is outside the crawl scope")]
    OffSite(String),

    #[error("matches ignore pattern '{0}'")]
    Ignored(String),

    #[error("links to a non-text asset (.{0})")]
    Asset(String),
}

/// The boundary of one crawl: the start URL's site plus the ignore list
#[derive(Debug, Clone)]
pub struct Scope {
    /// Start host without `www.`; its subdomains are in scope too
    site: String,

    /// Lowercased ignore patterns
    ignore_patterns: Vec<String>,
}

impl Scope {
    /// Creates a scope from a normalized start URL and an ignore list
    pub fn new(start_url: &Url, ignore_patterns: &[String]) -> UrlResult<Self> {
        let host = start_url.host_str().ok_or(UrlError::MissingDomain)?;

        Ok(Self {
            site: site_of(host),
            ignore_patterns: ignore_patterns.iter().map(|p| p.to_lowercase()).collect(),
        })
    }

    /// Builds the scope for a crawl configuration, returning it with the
    /// normalized start URL
    pub fn from_config(config: &CrawlConfig) -> UrlResult<(Self, Url)> {
        let start_url = normalize_url(&config.start_url)?;
        let scope = Self::new(&start_url, &config.ignore_patterns)?;
        Ok((scope, start_url))
    }

    /// Resolves `raw` against `base`, canonicalizes it and applies the scope
    ///
    /// Pure: no I/O and no state is touched. The returned URL is already in
    /// normalized form, so feeding it back in yields the same URL.
    ///
    /// # Examples
    ///
    /// ```
    /// use site2pdf::url::{normalize_url, Scope, SkipReason};
    ///
    /// let start = normalize_url("https://example.com/").unwrap();
    /// let scope = Scope::new(&start, &["login".to_string()]).unwrap();
    ///
    /// let url = scope.normalize("/docs/#top", &start).unwrap();
    /// assert_eq!(url.as_str(), "https://example.com/docs");
    ///
    /// assert!(matches!(
    ///     scope.normalize("https://other.org/", &start),
    ///     Err(SkipReason::OffSite(_))
    /// ));
    /// ```
    pub fn normalize(&self, raw: &str, base: &Url) -> Result<Url, SkipReason> {
        let resolved = base
            .join(raw.trim())
            .map_err(|e| UrlError::Parse(e.to_string()))?;
        let url = normalize_url(resolved.as_str())?;

        self.check(&url)?;
        Ok(url)
    }

    /// Applies the scope rules to an already normalized URL
    pub fn check(&self, url: &Url) -> Result<(), SkipReason> {
        let host = url.host_str().ok_or(UrlError::MissingDomain)?;
        if !host_in_site(&self.site, host) {
            return Err(SkipReason::OffSite(host.to_string()));
        }

        if let Some(ext) = asset_extension(url) {
            return Err(SkipReason::Asset(ext));
        }

        let target = match url.query() {
            Some(query) => format!("{}?{}", url.path(), query),
            None => url.path().to_string(),
        };
        if let Some(pattern) = find_ignore_pattern(&self.ignore_patterns, &target) {
            return Err(SkipReason::Ignored(pattern.to_string()));
        }

        Ok(())
    }

    /// The site this scope is bound to
    pub fn site(&self) -> &str {
        &self.site
    }
}

/// Returns the lowercased extension of the last path segment when it names a
/// known non-text asset
fn asset_extension(url: &Url) -> Option<String> {
    let last_segment = url.path().rsplit('/').next()?;
    let (_, ext) = last_segment.rsplit_once('.')?;
    let ext = ext.to_lowercase();
    ASSET_EXTENSIONS.contains(&ext.as_str()).then_some(ext)
}
