//! Strata main entry point
//!
//! This is the command-line interface for the Strata listing walker.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use strata::config::{load_config_with_hash, Config};
use strata::crawler::{crawl, PassOutcome};
use strata::storage::{open_shared, Storage};
use tracing_subscriber::EnvFilter;

/// Strata: a resilient walker for nested listing sites
///
/// Strata descends a listing site's category, quality, file and server
/// pages to direct media links, and keeps a searchable index of every
/// listing it has seen.
#[derive(Parser, Debug)]
#[command(name = "strata")]
#[command(version)]
#[command(about = "A resilient walker for nested listing sites", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Index database to use instead of the configured one
    #[arg(long, value_name = "PATH")]
    database: Option<PathBuf>,

    /// Run the HTTP API (and a background indexing pass)
    #[arg(long, conflicts_with_all = ["search", "stats", "dry_run"])]
    serve: bool,

    /// Search the index by title and exit
    #[arg(long, value_name = "QUERY", conflicts_with_all = ["serve", "stats", "dry_run"])]
    search: Option<String>,

    /// Show index statistics and exit
    #[arg(long, conflicts_with_all = ["serve", "search", "dry_run"])]
    stats: bool,

    /// Validate config and show what would be walked without fetching anything
    #[arg(long, conflicts_with_all = ["serve", "search", "stats"])]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if let Some(database) = &cli.database {
        config.index.database_path = Some(database.display().to_string());
    }

    // Handle different modes
    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.stats {
        handle_stats(&config)?;
    } else if let Some(query) = &cli.search {
        handle_search(&config, query)?;
    } else if cli.serve {
        strata::server::serve(&config, &config_hash).await?;
    } else {
        handle_crawl(&config, &config_hash).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("strata=info,warn"),
            1 => EnvFilter::new("strata=debug,info"),
            2 => EnvFilter::new("strata=trace,debug"),
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

/// Handles the --dry-run mode: shows the effective configuration
fn handle_dry_run(config: &Config) {
    println!("=== Strata Dry Run ===\n");

    println!("Site:");
    println!("  Seed URL: {}", config.site.seed_url);
    println!("  Name: {}", config.site.site_name);

    println!("\nCrawler Configuration:");
    println!("  Pacing delay: {}ms", config.crawler.pacing_delay);
    println!("  Drill depth: {}", config.crawler.drill_depth);
    println!("  Resolve depth: {}", config.crawler.resolve_depth);
    println!("  Listing page cap: {}", config.crawler.listing_page_cap);
    println!("  Request timeout: {}s", config.crawler.request_timeout);
    println!("  User agent: {}", config.crawler.user_agent);

    println!("\nIndex:");
    match &config.index.database_path {
        Some(path) => println!("  Database: {}", path),
        None => println!("  Database: (none, indexing disabled)"),
    }

    println!("\nServer:");
    println!("  Listen: {}:{}", config.server.host, config.server.port);

    println!("\n✓ Configuration is valid");
}

/// Handles the --stats mode: shows index statistics
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    let storage = open_shared(&config.index)?.context("no index database configured")?;
    let storage = storage
        .lock()
        .map_err(|_| anyhow::anyhow!("index lock poisoned"))?;

    let stats = storage.stats()?;
    println!("Documents: {}", stats.documents);
    println!("Enriched:  {}", stats.enriched);

    if !stats.categories.is_empty() {
        println!("\nBy category:");
        for category in &stats.categories {
            let name = if category.name.is_empty() {
                "(none)"
            } else {
                category.name.as_str()
            };
            println!("  {:>6}  {}", category.documents, name);
        }
    }

    match storage.get_latest_run()? {
        Some(run) => println!(
            "\nLatest run: #{} {} (started {}, finished {})",
            run.id,
            run.status.to_db_string(),
            run.started_at,
            run.finished_at.as_deref().unwrap_or("-")
        ),
        None => println!("\nNo crawl runs recorded"),
    }

    Ok(())
}

/// Handles the --search mode: prints matching listings
fn handle_search(config: &Config, query: &str) -> anyhow::Result<()> {
    let storage = open_shared(&config.index)?.context("no index database configured")?;
    let storage = storage
        .lock()
        .map_err(|_| anyhow::anyhow!("index lock poisoned"))?;

    let results = storage.search(query, strata::storage::SEARCH_LIMIT)?;
    if results.is_empty() {
        println!("No listings match '{}'", query);
        return Ok(());
    }

    for document in &results {
        println!(
            "{}  [{}]\n    {}",
            document.title,
            document.year_category.as_deref().unwrap_or("-"),
            document.link
        );
    }

    Ok(())
}

/// Handles the default mode: one indexing pass
async fn handle_crawl(config: &Config, config_hash: &str) -> anyhow::Result<()> {
    tracing::info!("Starting crawl of {}", config.site.seed_url);

    match crawl(config, config_hash).await {
        Ok(PassOutcome::Completed(report)) => {
            tracing::info!(
                "Crawl completed: {} listings indexed across {} categories",
                report.upserted,
                report.categories
            );
            Ok(())
        }
        Ok(PassOutcome::Disabled) => {
            tracing::warn!("No index database configured; nothing to crawl into");
            Ok(())
        }
        Ok(PassOutcome::AlreadyRunning) => Ok(()),
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
