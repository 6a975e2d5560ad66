use crate::config::types::{Renderer, ScraperConfig};
use crate::config::validation::validate;
use crate::{ConfigError, ConfigResult};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// Values supplied on the command line; each one replaces the file value
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub start_url: Option<String>,
    pub max_pages: Option<u32>,
    pub output_dir: Option<PathBuf>,
    pub renderer: Option<Renderer>,
    pub delay_between_requests: Option<f64>,
    pub batch_size: Option<usize>,
}

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(ScraperConfig)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use site2pdf::config::load_config;
///
/// let config = load_config(Path::new("site2pdf.toml")).unwrap();
/// println!("Max pages: {}", config.crawl.max_pages);
/// ```
pub fn load_config(path: &Path) -> ConfigResult<ScraperConfig> {
    build_config(Some(path), &ConfigOverrides::default())
}

/// Parses TOML text into an unvalidated configuration
pub fn parse_config(content: &str) -> ConfigResult<ScraperConfig> {
    Ok(toml::from_str(content)?)
}

/// Builds the immutable run configuration
///
/// Reads the file when one is given (defaults otherwise), applies command-line
/// overrides, completes a scheme-less start URL with `https://` and validates
/// the result. Nothing may change the configuration after this returns.
pub fn build_config(
    path: Option<&Path>,
    overrides: &ConfigOverrides,
) -> ConfigResult<ScraperConfig> {
    let mut config = match path {
        Some(path) => {
            let content = std::fs::read_to_string(path)?;
            parse_config(&content)?
        }
        None => ScraperConfig::default(),
    };

    apply_overrides(&mut config, overrides);
    config.crawl.start_url = with_default_scheme(config.crawl.start_url.trim());

    validate(&config)?;

    Ok(config)
}

fn apply_overrides(config: &mut ScraperConfig, overrides: &ConfigOverrides) {
    if let Some(url) = &overrides.start_url {
        config.crawl.start_url = url.clone();
    }
    if let Some(max_pages) = overrides.max_pages {
        config.crawl.max_pages = max_pages;
    }
    if let Some(dir) = &overrides.output_dir {
        config.output.directory = dir.clone();
    }
    if let Some(renderer) = overrides.renderer {
        config.fetch.renderer = renderer;
    }
    if let Some(delay) = overrides.delay_between_requests {
        config.crawl.delay_between_requests = delay;
    }
    if let Some(batch_size) = overrides.batch_size {
        config.output.batch_size = batch_size;
    }
}

/// `example.com` becomes `https://example.com`; anything with a scheme is untouched
fn with_default_scheme(url: &str) -> String {
    if url.is_empty() || url.contains("://") {
        url.to_string()
    } else {
        format!("https://{}", url)
    }
}

/// Computes a SHA-256 fingerprint of the effective configuration
///
/// Logged at the start of every run so two outputs can be traced back to the
/// exact settings that produced them.
///
/// # Returns
///
/// Hex-encoded SHA-256 hash (64 characters)
pub fn compute_config_hash(config: &ScraperConfig) -> ConfigResult<String> {
    let canonical = serde_json::to_vec(config)
        .map_err(|e| ConfigError::Validation(format!("config is not serializable: {}", e)))?;
    let mut hasher = Sha256::new();
    hasher.update(&canonical);
    Ok(hex::encode(hasher.finalize()))
}
