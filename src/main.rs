//! Shelfscan main entry point
//!
//! This is the command-line interface for the Shelfscan catalog crawler.

use anyhow::Context;
use clap::Parser;
use shelfscan::config::{load_config_with_hash, Config};
use shelfscan::crawler::Crawler;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Shelfscan: crawl a paginated catalog into a CSV snapshot
///
/// Shelfscan walks every listing page of the catalog, reads each item's
/// category from its detail page, and writes the normalized records to
/// the configured snapshot file.
#[derive(Parser, Debug)]
#[command(name = "shelfscan")]
#[command(version)]
#[command(about = "Crawl a paginated catalog into a CSV snapshot", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (built-in defaults when omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// First listing page to crawl (overrides site.start-page)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    start_page: Option<u32>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without crawling
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics from the existing snapshot and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = load_configuration(cli.config.as_deref())?;

    if cli.dry_run {
        handle_dry_run(&config, cli.start_page);
    } else if cli.stats {
        handle_stats(&config)?;
    } else {
        handle_crawl(config, cli.start_page).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("shelfscan=info,warn"),
            1 => EnvFilter::new("shelfscan=debug,info"),
            2 => EnvFilter::new("shelfscan=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the config file if one was given, otherwise the defaults
fn load_configuration(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        tracing::info!("No configuration file given, using built-in defaults");
        shelfscan::config::validate(&Config::default())?;
        return Ok(Config::default());
    };

    tracing::info!("Loading configuration from: {}", path.display());
    let (config, hash) = load_config_with_hash(path)
        .with_context(|| format!("failed to load configuration from {}", path.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);
    Ok(config)
}

/// Handles the --dry-run mode: shows the resolved settings
fn handle_dry_run(config: &Config, start_page: Option<u32>) {
    let start = start_page.unwrap_or(config.site.start_page);
    let last = start.saturating_add(config.site.max_pages.saturating_sub(1));

    println!("=== Shelfscan Dry Run ===\n");

    println!("Site:");
    println!("  Base URL: {}", config.site.base_url);
    println!("  Pages: {}..={} at most", start, last);

    println!("\nTransport:");
    println!("  Timeout: {}s", config.transport.timeout_secs);
    println!("  Verify TLS: {}", config.transport.verify_tls);
    println!(
        "  Retries: {} (backoff base {}ms, statuses {:?})",
        config.transport.retries, config.transport.backoff_base_ms, config.transport.retry_statuses
    );
    println!("  User agent: {}", config.transport.user_agent);

    println!("\nWorkers:");
    println!("  Page workers: {}", config.workers.pages);
    println!("  Detail workers per page: {}", config.workers.details);
    println!(
        "  Worst-case in-flight requests: {} (ceiling {})",
        config.workers.pages * config.workers.details,
        config.workers.max_in_flight
    );

    println!("\nOutput:");
    println!("  Snapshot: {}", config.output.snapshot_path);

    println!("\n✓ Configuration is valid");
}

/// Handles the --stats mode: summarizes the existing snapshot
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    use shelfscan::output::{load_statistics, print_statistics};

    println!("Snapshot: {}\n", config.output.snapshot_path);
    let stats = load_statistics(Path::new(&config.output.snapshot_path))
        .context("failed to read snapshot")?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, start_page: Option<u32>) -> anyhow::Result<()> {
    let crawler = Crawler::new(config).context("failed to initialize crawler")?;
    let result = crawler.run(start_page).await;

    tracing::info!(
        "Crawl finished in {}s: {} records, {} pages visited ({} failed, {} empty), snapshot {}",
        result.duration().num_seconds(),
        result.len(),
        result.pages_visited,
        result.pages_failed,
        result.pages_empty,
        if result.snapshot_written {
            "written"
        } else {
            "not written"
        }
    );

    Ok(())
}
