//! Run statistics
//!
//! Counters collected by the crawler over one run and printed at the end.

use std::time::Duration;

/// Crawl statistics summary
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CrawlStatistics {
    /// URLs accepted into the frontier (manifest length)
    pub urls_discovered: usize,

    /// Targets fetched successfully
    pub pages_fetched: u32,

    /// Targets that exhausted their retries or failed permanently
    pub pages_failed: u32,

    /// Fetched pages whose text was too short to render
    pub low_value_pages: u32,

    /// Links rejected by scope, ignore patterns or asset filters
    pub links_skipped: u64,

    pub pdfs_created: usize,

    pub render_errors: usize,

    /// Browser or HTTP requests issued, retries included
    pub requests_made: u32,

    /// URLs still queued when the crawl stopped
    pub frontier_remaining: usize,

    pub duration: Duration,

    /// True when the run was interrupted
    pub cancelled: bool,
}

impl CrawlStatistics {
    /// Targets that counted against the page budget
    pub fn pages_attempted(&self) -> u32 {
        self.pages_fetched + self.pages_failed
    }

    /// Share of attempted targets that were fetched, in percent
    pub fn success_rate(&self) -> f64 {
        let attempted = self.pages_attempted();
        if attempted == 0 {
            return 0.0;
        }
        (self.pages_fetched as f64 / attempted as f64) * 100.0
    }
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  URLs discovered: {}", stats.urls_discovered);
    println!("  Pages attempted: {}", stats.pages_attempted());
    println!("  Requests made: {}", stats.requests_made);
    println!("  Links skipped: {}", stats.links_skipped);
    println!("  Still queued: {}", stats.frontier_remaining);
    println!("  Duration: {:.1}s", stats.duration.as_secs_f64());
    println!();

    println!("Pages:");
    println!("  Fetched: {}", stats.pages_fetched);
    println!("  Failed: {}", stats.pages_failed);
    println!("  Too little text: {}", stats.low_value_pages);
    println!();

    println!("Output:");
    println!("  PDFs created: {}", stats.pdfs_created);
    if stats.render_errors > 0 {
        println!("  Render errors: {}", stats.render_errors);
    }
    println!();

    if stats.cancelled {
        println!("Crawl was interrupted; output is partial.");
        println!();
    }

    println!(
        "Success Rate: {:.1}% ({} / {} pages successfully fetched)",
        stats.success_rate(),
        stats.pages_fetched,
        stats.pages_attempted()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_rate() {
        let stats = CrawlStatistics {
            pages_fetched: 3,
            pages_failed: 1,
            ..Default::default()
        };

        assert_eq!(stats.pages_attempted(), 4);
        assert!((stats.success_rate() - 75.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_success_rate_without_attempts() {
        assert_eq!(CrawlStatistics::default().success_rate(), 0.0);
    }
}
