//! site2pdf main entry point
//!
//! This is the command-line interface for the site2pdf crawler.

use anyhow::Context;
use clap::Parser;
use site2pdf::config::{build_config, compute_config_hash, ConfigOverrides, Renderer, ScraperConfig};
use site2pdf::crawler::run_crawl;
use site2pdf::output::print_statistics;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// site2pdf: turns a website into one PDF per page
///
/// site2pdf crawls a single site breadth-first through a headless browser,
/// extracts the readable text of every page and writes it as a PDF named
/// after the page's keywords. A `scraped_urls.json` manifest lists every
/// URL that was discovered.
#[derive(Parser, Debug)]
#[command(name = "site2pdf")]
#[command(version = "1.0.0")]
#[command(about = "Turns a website into one PDF per page", long_about = None)]
struct Cli {
    /// Start URL (overrides the config file)
    #[arg(value_name = "URL")]
    url: Option<String>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Maximum number of pages to fetch
    #[arg(short = 'n', long)]
    max_pages: Option<u32>,

    /// Output directory for PDFs, manifest and log file
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Page renderer: "browser" (JavaScript) or "http" (plain fetch)
    #[arg(long)]
    renderer: Option<Renderer>,

    /// Seconds to wait between two requests
    #[arg(long)]
    delay: Option<f64>,

    /// Pages buffered before PDFs are written
    #[arg(long)]
    batch_size: Option<usize>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and print the effective settings without crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let overrides = ConfigOverrides {
        start_url: cli.url.clone(),
        max_pages: cli.max_pages,
        output_dir: cli.output.clone(),
        renderer: cli.renderer,
        delay_between_requests: cli.delay,
        batch_size: cli.batch_size,
    };
    let config = build_config(cli.config.as_deref(), &overrides)
        .context("Failed to load configuration")?;

    if cli.dry_run {
        return handle_dry_run(&config);
    }

    // Keep the guard alive so buffered log lines reach the file
    let _guard = setup_logging(cli.verbose, cli.quiet, &config)?;

    let hash = compute_config_hash(&config)?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);

    handle_crawl(config).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Console output always; a plain-text log file in the output directory
/// when enabled in the configuration.
fn setup_logging(
    verbose: u8,
    quiet: bool,
    config: &ScraperConfig,
) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("site2pdf=info,warn"),
            1 => EnvFilter::new("site2pdf=debug,info"),
            2 => EnvFilter::new("site2pdf=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    let console = fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false);

    let (file_layer, guard) = if config.output.log_file {
        let (writer, guard) = log_file_writer(&config.output.directory)?;
        let layer = fmt::layer()
            .with_writer(writer)
            .with_ansi(false)
            .with_target(false);
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file_layer)
        .init();

    Ok(guard)
}

/// Opens `scraper_YYYYMMDD_HHMMSS.log` in the output directory
fn log_file_writer(
    dir: &Path,
) -> anyhow::Result<(tracing_appender::non_blocking::NonBlocking, WorkerGuard)> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Cannot create output directory {}", dir.display()))?;
    let filename = format!(
        "scraper_{}.log",
        chrono::Local::now().format("%Y%m%d_%H%M%S")
    );
    let appender = tracing_appender::rolling::never(dir, filename);
    Ok(tracing_appender::non_blocking(appender))
}

/// Handles the --dry-run mode: prints the effective configuration
fn handle_dry_run(config: &ScraperConfig) -> anyhow::Result<()> {
    println!("=== site2pdf Dry Run ===\n");
    println!("{}", toml::to_string_pretty(config)?);
    println!("Config hash: {}", compute_config_hash(config)?);
    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would crawl up to {} pages starting at {}",
        config.crawl.max_pages, config.crawl.start_url
    );
    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: ScraperConfig) -> anyhow::Result<()> {
    tracing::info!(
        "Crawling {} (max {} pages, renderer {:?}) into {}",
        config.crawl.start_url,
        config.crawl.max_pages,
        config.fetch.renderer,
        config.output.directory.display()
    );

    let cancel = CancellationToken::new();
    let signal_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, finishing current page and writing output");
            signal_token.cancel();
        }
    });

    match run_crawl(&config, cancel).await {
        Ok(report) => {
            tracing::info!("Manifest written to {}", report.manifest_path.display());
            print_statistics(&report.statistics);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
