use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure for site2pdf
///
/// Every section is optional in the TOML file; missing values fall back to
/// the defaults below. Once validated the value is never mutated for the rest
/// of the run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScraperConfig {
    #[serde(default)]
    pub crawl: CrawlConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub extract: ExtractConfig,
    #[serde(default)]
    pub keywords: KeywordConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Crawl scope and budget
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlConfig {
    /// The seed URL; its site bounds the crawl
    #[serde(rename = "start-url", default)]
    pub start_url: String,

    /// Hard ceiling on fetched + failed targets
    #[serde(rename = "max-pages", default = "default_max_pages")]
    pub max_pages: u32,

    /// Minimum pause between the end of one fetch and the start of the next (seconds)
    #[serde(rename = "delay-between-requests", default = "default_delay")]
    pub delay_between_requests: f64,

    /// Case-insensitive substrings; a URL whose path or query contains one is skipped
    #[serde(rename = "ignore-patterns", default = "default_ignore_patterns")]
    pub ignore_patterns: Vec<String>,
}

/// Which page source renders pages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Renderer {
    /// Headless Chromium, executes JavaScript
    #[default]
    Browser,
    /// Plain HTTP GET, no JavaScript
    Http,
}

impl std::str::FromStr for Renderer {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "browser" => Ok(Self::Browser),
            "http" => Ok(Self::Http),
            other => Err(format!("unknown renderer '{}', expected 'browser' or 'http'", other)),
        }
    }
}

/// Fetch behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    #[serde(default)]
    pub renderer: Renderer,

    /// Page load timeout (seconds)
    #[serde(rename = "timeout", default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Time given to client-side rendering before the DOM is read (milliseconds)
    #[serde(rename = "settle-ms", default = "default_settle_ms")]
    pub settle_ms: u64,

    /// Total attempts per URL, first try included
    #[serde(rename = "max-attempts", default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay before the first retry; doubles on each further retry (seconds)
    #[serde(rename = "retry-delay", default = "default_retry_delay")]
    pub retry_delay: f64,

    /// Upper bound for the retry delay (seconds)
    #[serde(rename = "max-retry-delay", default = "default_max_retry_delay")]
    pub max_retry_delay: f64,

    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Explicit Chromium binary; autodetected when absent
    #[serde(rename = "chrome-executable", default)]
    pub chrome_executable: Option<PathBuf>,
}

/// Content extraction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractConfig {
    /// Pages whose cleaned text is shorter than this produce no PDF
    #[serde(rename = "min-text-chars", default = "default_min_text_chars")]
    pub min_text_chars: usize,

    /// class/id substrings marking div/section blocks to drop (schedules, calendars...)
    #[serde(rename = "boilerplate-markers", default = "default_boilerplate_markers")]
    pub boilerplate_markers: Vec<String>,

    /// Drop lines that look like timetables or key/value dumps
    #[serde(rename = "drop-structured-lines", default = "default_true")]
    pub drop_structured_lines: bool,
}

/// Keyword extraction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordConfig {
    /// Keywords per page
    #[serde(default = "default_keyword_count")]
    pub count: usize,

    /// Longest candidate phrase, in words
    #[serde(rename = "max-ngram", default = "default_max_ngram")]
    pub max_ngram: usize,

    /// Token-set similarity above which a candidate counts as a duplicate
    #[serde(rename = "dedup-threshold", default = "default_dedup_threshold")]
    pub dedup_threshold: f64,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory receiving PDFs, the manifest and the log file
    #[serde(default = "default_output_dir")]
    pub directory: PathBuf,

    /// Page records buffered before a flush to disk
    #[serde(rename = "batch-size", default = "default_batch_size")]
    pub batch_size: usize,

    /// Also write a log file into the output directory
    #[serde(rename = "log-file", default = "default_true")]
    pub log_file: bool,
}

impl CrawlConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_secs_f64(self.delay_between_requests)
    }
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            start_url: String::new(),
            max_pages: default_max_pages(),
            delay_between_requests: default_delay(),
            ignore_patterns: default_ignore_patterns(),
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            renderer: Renderer::default(),
            timeout_seconds: default_timeout(),
            settle_ms: default_settle_ms(),
            max_attempts: default_max_attempts(),
            retry_delay: default_retry_delay(),
            max_retry_delay: default_max_retry_delay(),
            user_agent: default_user_agent(),
            chrome_executable: None,
        }
    }
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            min_text_chars: default_min_text_chars(),
            boilerplate_markers: default_boilerplate_markers(),
            drop_structured_lines: true,
        }
    }
}

impl Default for KeywordConfig {
    fn default() -> Self {
        Self {
            count: default_keyword_count(),
            max_ngram: default_max_ngram(),
            dedup_threshold: default_dedup_threshold(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_dir(),
            batch_size: default_batch_size(),
            log_file: true,
        }
    }
}

fn default_max_pages() -> u32 {
    50
}

fn default_delay() -> f64 {
    2.0
}

fn default_ignore_patterns() -> Vec<String> {
    [
        "login",
        "logout",
        "register",
        "newsletter",
        "redirect",
        "wp-json",
        "feed",
        "trackback",
        "xmlrpc",
        "search",
        "page=",
        "paged=",
        "sort=",
        "filter=",
        "cart",
        "checkout",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_timeout() -> u64 {
    30
}

fn default_settle_ms() -> u64 {
    2000
}

fn default_max_attempts() -> u32 {
    3
}

fn default_retry_delay() -> f64 {
    5.0
}

fn default_max_retry_delay() -> f64 {
    60.0
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
        .to_string()
}

fn default_min_text_chars() -> usize {
    10
}

fn default_boilerplate_markers() -> Vec<String> {
    [
        "schedule",
        "timetable",
        "kursplan",
        "zeitplan",
        "booking",
        "calendar",
        "datepicker",
        "kalender",
        "termin",
        "buchen",
        "reservation",
        "availability",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_true() -> bool {
    true
}

fn default_keyword_count() -> usize {
    3
}

fn default_max_ngram() -> usize {
    2
}

fn default_dedup_threshold() -> f64 {
    0.9
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("WebScraperPDFs")
}

fn default_batch_size() -> usize {
    25
}
