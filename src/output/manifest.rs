//! The crawl manifest (`scraped_urls.json`)

use crate::url::dedup_key;
use crate::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

pub const MANIFEST_FILENAME: &str = "scraped_urls.json";

/// On-disk shape of the manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestFile {
    pub start_url: String,

    /// RFC 3339 start time of the crawl
    pub timestamp: String,

    pub total_urls: usize,

    pub urls: Vec<String>,
}

/// Every URL accepted into the frontier, in discovery order
///
/// Append-only. A URL is recorded at most once no matter how often it is
/// offered.
#[derive(Debug, Clone)]
pub struct CrawlManifest {
    start_url: Url,
    started_at: DateTime<Utc>,
    urls: Vec<Url>,
    seen: HashSet<String>,
}

impl CrawlManifest {
    pub fn new(start_url: Url, started_at: DateTime<Utc>) -> Self {
        Self {
            start_url,
            started_at,
            urls: Vec::new(),
            seen: HashSet::new(),
        }
    }

    /// Appends `url`; returns false if it was already recorded
    pub fn record(&mut self, url: &Url) -> bool {
        if !self.seen.insert(dedup_key(url).to_string()) {
            return false;
        }
        self.urls.push(url.clone());
        true
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    pub fn urls(&self) -> &[Url] {
        &self.urls
    }

    pub fn to_file(&self) -> ManifestFile {
        ManifestFile {
            start_url: self.start_url.to_string(),
            timestamp: self.started_at.to_rfc3339(),
            total_urls: self.urls.len(),
            urls: self.urls.iter().map(|u| u.to_string()).collect(),
        }
    }

    /// Writes the manifest into `dir` and returns its path
    ///
    /// The file is written under a temporary name first and renamed into
    /// place, so readers never see a partial manifest.
    pub fn write(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(MANIFEST_FILENAME);
        let partial = dir.join(format!(".{}.part", MANIFEST_FILENAME));

        let json = serde_json::to_string_pretty(&self.to_file())?;
        fs::write(&partial, json)?;
        fs::rename(&partial, &path)?;

        tracing::info!(
            path = %path.display(),
            total_urls = self.urls.len(),
            "Wrote URL manifest"
        );
        Ok(path)
    }
}
