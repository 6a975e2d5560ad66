use crate::config::types::{
    CrawlConfig, ExtractConfig, FetchConfig, KeywordConfig, OutputConfig, ScraperConfig,
};
use crate::{ConfigError, ConfigResult};
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &ScraperConfig) -> ConfigResult<()> {
    validate_crawl_config(&config.crawl)?;
    validate_fetch_config(&config.fetch)?;
    validate_extract_config(&config.extract)?;
    validate_keyword_config(&config.keywords)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates crawl scope and budget
fn validate_crawl_config(config: &CrawlConfig) -> ConfigResult<()> {
    if config.start_url.is_empty() {
        return Err(ConfigError::Validation(
            "start_url is required (set [crawl] start-url or pass --url)".to_string(),
        ));
    }

    let url = Url::parse(&config.start_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid start_url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "start_url must use http or https, got '{}'",
            url.scheme()
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(ConfigError::InvalidUrl(format!(
            "start_url '{}' has no host",
            config.start_url
        )));
    }

    if config.max_pages < 1 {
        return Err(ConfigError::Validation(
            "max_pages must be >= 1, got 0".to_string(),
        ));
    }

    validate_seconds("delay_between_requests", config.delay_between_requests)?;

    if config.ignore_patterns.iter().any(|p| p.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "ignore_patterns cannot contain empty entries".to_string(),
        ));
    }

    Ok(())
}

/// Validates fetch settings
fn validate_fetch_config(config: &FetchConfig) -> ConfigResult<()> {
    if config.timeout_seconds < 1 {
        return Err(ConfigError::Validation(
            "timeout must be >= 1 second".to_string(),
        ));
    }

    if config.max_attempts < 1 || config.max_attempts > 10 {
        return Err(ConfigError::Validation(format!(
            "max_attempts must be between 1 and 10, got {}",
            config.max_attempts
        )));
    }

    validate_seconds("retry_delay", config.retry_delay)?;
    validate_seconds("max_retry_delay", config.max_retry_delay)?;

    if config.max_retry_delay < config.retry_delay {
        return Err(ConfigError::Validation(format!(
            "max_retry_delay ({}) must not be smaller than retry_delay ({})",
            config.max_retry_delay, config.retry_delay
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_extract_config(config: &ExtractConfig) -> ConfigResult<()> {
    if config
        .boilerplate_markers
        .iter()
        .any(|m| m.trim().is_empty())
    {
        return Err(ConfigError::Validation(
            "boilerplate_markers cannot contain empty entries".to_string(),
        ));
    }

    Ok(())
}

fn validate_keyword_config(config: &KeywordConfig) -> ConfigResult<()> {
    if config.count < 1 || config.count > 10 {
        return Err(ConfigError::Validation(format!(
            "keyword count must be between 1 and 10, got {}",
            config.count
        )));
    }

    if config.max_ngram < 1 || config.max_ngram > 3 {
        return Err(ConfigError::Validation(format!(
            "max_ngram must be between 1 and 3, got {}",
            config.max_ngram
        )));
    }

    if !(config.dedup_threshold > 0.0 && config.dedup_threshold <= 1.0) {
        return Err(ConfigError::Validation(format!(
            "dedup_threshold must be in (0, 1], got {}",
            config.dedup_threshold
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> ConfigResult<()> {
    if config.directory.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "output directory cannot be empty".to_string(),
        ));
    }

    if config.batch_size < 1 || config.batch_size > 1000 {
        return Err(ConfigError::Validation(format!(
            "batch_size must be between 1 and 1000, got {}",
            config.batch_size
        )));
    }

    Ok(())
}

/// Durations are given as float seconds; reject NaN, infinity and negatives
fn validate_seconds(name: &str, value: f64) -> ConfigResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(ConfigError::Validation(format!(
            "{} must be a finite number of seconds >= 0, got {}",
            name, value
        )));
    }
    Ok(())
}
