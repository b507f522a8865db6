//! Job-Sieve main entry point
//!
//! This is the command-line interface for the Job-Sieve career-page scraper.

use anyhow::Context;
use clap::Parser;
use job_sieve::config::{load_config_with_hash, Config};
use job_sieve::crawler::{build_crawler, run_schedule, Crawler};
use job_sieve::output::{
    generate_markdown_summary, load_statistics, print_listings, print_statistics,
};
use job_sieve::storage::{
    open_storage, ListingStore, MemoryStorage, PageRegistry, SqliteStorage, Storage,
};
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError};
use tracing_subscriber::EnvFilter;

/// Job-Sieve: a heuristic career-page scraper
///
/// Job-Sieve periodically visits registered employer career pages, finds
/// job postings in markup it has never seen before, and stores each posting
/// exactly once.
#[derive(Parser, Debug)]
#[command(name = "job-sieve")]
#[command(version)]
#[command(about = "A heuristic career-page scraper", long_about = None)]
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

    /// Scrape every registered page once and exit
    #[arg(long, group = "mode")]
    once: bool,

    /// Print stored listings, newest first, and exit
    #[arg(long, group = "mode")]
    list: bool,

    /// Show statistics from the database and exit
    #[arg(long, group = "mode")]
    stats: bool,

    /// Write the markdown listing report and exit
    #[arg(long, group = "mode")]
    export_summary: bool,

    /// Scrape every registered page without storing anything
    #[arg(long, group = "mode")]
    dry_run: bool,

    /// Register a career page and scrape it immediately
    #[arg(long, value_name = "URL", group = "mode", requires = "name")]
    add_page: Option<String>,

    /// Display name for --add-page
    #[arg(long, value_name = "NAME", requires = "add_page")]
    name: Option<String>,

    /// Unregister a career page (its listings are kept)
    #[arg(long, value_name = "URL", group = "mode")]
    remove_page: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.list {
        handle_list(&config)
    } else if cli.stats {
        handle_stats(&config)
    } else if cli.export_summary {
        handle_export_summary(&config)
    } else if cli.dry_run {
        handle_dry_run(&config, &config_hash).await
    } else if let Some(url) = &cli.add_page {
        let name = cli.name.as_deref().unwrap_or_default();
        handle_add_page(&config, &config_hash, url, name).await
    } else if let Some(url) = &cli.remove_page {
        handle_remove_page(&config, url)
    } else if cli.once {
        handle_once(config, &config_hash).await
    } else {
        handle_schedule(config, &config_hash).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("job_sieve=info,warn"),
            1 => EnvFilter::new("job_sieve=debug,info"),
            2 => EnvFilter::new("job_sieve=trace,debug"),
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

fn open_database(config: &Config) -> anyhow::Result<SqliteStorage> {
    let path = Path::new(&config.output.database_path);
    open_storage(path).with_context(|| format!("Failed to open database {}", path.display()))
}

/// Cancels the crawler's current run on Ctrl-C
fn cancel_on_ctrl_c<S: Storage + 'static>(crawler: &Arc<Crawler<S>>) {
    let token = crawler.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping after the current page");
            token.cancel();
        }
    });
}

/// Handles the --list mode: prints stored listings
fn handle_list(config: &Config) -> anyhow::Result<()> {
    let storage = open_database(config)?;
    print_listings(&storage.list_listings()?);
    Ok(())
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    let storage = open_database(config)?;
    println!(
        "Database: {} (schema v{})\n",
        config.output.database_path,
        storage.schema_version()?
    );

    let stats = load_statistics(&storage)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the --export-summary mode: writes the markdown report
fn handle_export_summary(config: &Config) -> anyhow::Result<()> {
    let storage = open_database(config)?;
    let path = Path::new(&config.output.summary_path);

    let written = generate_markdown_summary(&storage, path)?;
    println!("✓ {} listing(s) exported to: {}", written, path.display());

    Ok(())
}

/// Handles the --dry-run mode: scrapes against a throwaway copy of the store
async fn handle_dry_run(config: &Config, config_hash: &str) -> anyhow::Result<()> {
    let storage = open_database(config)?;
    let snapshot = MemoryStorage::seeded(storage.list_pages()?, storage.list_listings()?);
    drop(storage);

    let crawler = Arc::new(build_crawler(config, config_hash, snapshot)?);
    cancel_on_ctrl_c(&crawler);

    let report = crawler.scrape_registered().await?;

    println!("=== Job-Sieve Dry Run ===\n");
    print_listings(&report.listings);
    println!(
        "\nWould store {} new listing(s) from {}/{} page(s); nothing was written.",
        report.listings.len(),
        report.pages_visited,
        report.pages_total
    );

    Ok(())
}

/// Handles --add-page: registers a page and scrapes it on demand
async fn handle_add_page(
    config: &Config,
    config_hash: &str,
    url: &str,
    name: &str,
) -> anyhow::Result<()> {
    let crawler = build_crawler(config, config_hash, open_database(config)?)?;

    match crawler.add_page(url, name).await? {
        Some(listings) => {
            println!("✓ Registered {} ({})", name, url);
            print_listings(&listings);
        }
        None => println!("{} is already registered", url),
    }

    Ok(())
}

/// Handles --remove-page
fn handle_remove_page(config: &Config, url: &str) -> anyhow::Result<()> {
    let mut storage = open_database(config)?;

    if storage.remove_page(url.trim())? {
        println!("✓ Removed {}", url);
    } else {
        println!("{} is not registered", url);
    }

    Ok(())
}

/// Handles the --once mode: one full scrape of the registry
async fn handle_once(config: Config, config_hash: &str) -> anyhow::Result<()> {
    let crawler = Arc::new(build_crawler(&config, config_hash, open_database(&config)?)?);
    cancel_on_ctrl_c(&crawler);

    let report = crawler.scrape_registered().await?;
    print_listings(&report.listings);

    export_after_run(&config, &crawler);
    Ok(())
}

/// Default mode: scheduled scrapes until Ctrl-C
async fn handle_schedule(config: Config, config_hash: &str) -> anyhow::Result<()> {
    let crawler = Arc::new(build_crawler(&config, config_hash, open_database(&config)?)?);
    cancel_on_ctrl_c(&crawler);

    tracing::info!(
        "{} page(s) registered",
        crawler.list_pages()?.len()
    );

    run_schedule(
        Arc::clone(&crawler),
        config.schedule.interval,
        Some(PathBuf::from(&config.output.summary_path)),
    )
    .await;

    Ok(())
}

/// Refreshes the markdown report; failures are logged, not fatal
fn export_after_run(config: &Config, crawler: &Crawler<SqliteStorage>) {
    let storage = crawler.storage();
    let storage = storage.lock().unwrap_or_else(PoisonError::into_inner);

    if let Err(e) = generate_markdown_summary(&*storage, Path::new(&config.output.summary_path)) {
        tracing::warn!("Failed to write {}: {}", config.output.summary_path, e);
    }
}
