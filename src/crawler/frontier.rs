//! Breadth-first crawl frontier
//!
//! This module handles:
//! - FIFO ordering of discovered targets (shallower pages first)
//! - The dedup set keyed by normalized URL, which only ever grows

use crate::url::dedup_key;
use std::collections::{HashSet, VecDeque};
use url::Url;

/// A URL accepted into the crawl
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTarget {
    /// Normalized absolute URL
    pub url: Url,

    /// Link distance from the start URL
    pub depth: u32,

    /// Page the link was found on; None for the start URL
    pub discovered_from: Option<Url>,
}

/// Frontier of discovered-but-not-yet-fetched targets
///
/// A URL is admitted at most once for the lifetime of the crawl, so no two
/// targets with the same normalized URL are ever enqueued.
#[derive(Debug, Default)]
pub struct Frontier {
    queue: VecDeque<CrawlTarget>,
    seen: HashSet<String>,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a target unless its URL has been admitted before
    ///
    /// # Returns
    ///
    /// * `true` - The target was enqueued
    /// * `false` - The URL was already known
    pub fn push(&mut self, target: CrawlTarget) -> bool {
        if !self.seen.insert(dedup_key(&target.url).to_string()) {
            return false;
        }
        self.queue.push_back(target);
        true
    }

    /// Takes the oldest pending target
    pub fn pop(&mut self) -> Option<CrawlTarget> {
        self.queue.pop_front()
    }

    /// Number of targets still waiting
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
