//! Configuration module for site2pdf
//!
//! This module handles loading, parsing, overriding and validating the TOML
//! configuration. The result is a single immutable [`ScraperConfig`] that is
//! passed explicitly to every component.
//!
//! # Example
//!
//! ```no_run
//! use site2pdf::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("site2pdf.toml")).unwrap();
//! println!("Crawling at most {} pages", config.crawl.max_pages);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    CrawlConfig, ExtractConfig, FetchConfig, KeywordConfig, OutputConfig, Renderer,
    ScraperConfig,
};

// Re-export parser functions
pub use parser::{build_config, compute_config_hash, load_config, parse_config, ConfigOverrides};
pub use validation::validate;
