//! Catalog-Sync main entry point
//!
//! This is the command-line interface for the catalog crawler and its query API.

use anyhow::Context;
use catalog_sync::api::{self, AppState};
use catalog_sync::config::{load_config_with_hash, Config};
use catalog_sync::crawler::Crawler;
use catalog_sync::schedule::{run_startup_cycle, start_scheduler};
use catalog_sync::storage::{self, init_database};
use catalog_sync::CycleRunner;
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Catalog-Sync: keeps a queryable copy of a paginated catalog
///
/// On start the whole listing is crawled and the stored catalog replaced.
/// The query API is then served, with an optional daily re-crawl.
#[derive(Parser, Debug)]
#[command(name = "catalog-sync")]
#[command(version)]
#[command(about = "Paginated catalog crawler with a query API", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults apply when omitted)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Run a single crawl cycle and exit without serving the API
    #[arg(long, conflicts_with_all = ["stats", "dry_run"])]
    crawl_only: bool,

    /// Validate config and show what would run without crawling
    #[arg(long, conflicts_with_all = ["stats", "crawl_only"])]
    dry_run: bool,

    /// Show catalog statistics from the database and exit
    #[arg(long, conflicts_with_all = ["dry_run", "crawl_only"])]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; variables may come from the environment
    let dotenv = dotenvy::dotenv();

    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.quiet);

    if let Ok(path) = dotenv {
        tracing::debug!("Loaded environment from {}", path.display());
    }

    match &cli.config {
        Some(path) => tracing::info!("Loading configuration from: {}", path.display()),
        None => tracing::info!("No configuration file given, using defaults"),
    }
    let (config, config_hash) = load_config_with_hash(cli.config.as_deref())
        .context("Failed to load configuration")?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.dry_run {
        handle_dry_run(&config);
        Ok(())
    } else if cli.stats {
        handle_stats(&config)
    } else {
        handle_run(config, config_hash, cli.crawl_only).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("catalog_sync=info,tower_http=info,warn"),
            1 => EnvFilter::new("catalog_sync=debug,tower_http=debug,info"),
            2 => EnvFilter::new("catalog_sync=trace,debug"),
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
    println!("=== Catalog-Sync Dry Run ===\n");

    println!("Source:");
    println!("  Base URL: {}", config.source.base_url);
    println!("  Timeout: {}s", config.source.timeout_secs);
    println!("  Max pages: {}", config.source.max_pages);
    println!("  User agent: {}", config.source.user_agent);

    println!("\nStorage:");
    println!("  Database: {}", config.storage.database);

    println!("\nSchedule:");
    if config.schedule.enabled {
        println!("  Recurring crawl: {} (UTC)", config.schedule.cron);
    } else {
        println!("  Recurring crawl: disabled");
    }

    println!("\nAPI:");
    println!("  Bind: {}", config.api.bind);

    println!("\n✓ Configuration is valid");
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    use catalog_sync::output::{load_statistics, print_statistics};
    use catalog_sync::storage::SqliteStorage;

    println!("Database: {}\n", config.storage.database);

    let storage = SqliteStorage::open(&config.storage.database)
        .with_context(|| format!("Failed to open database {}", config.storage.database))?;
    let stats = load_statistics(&storage).context("Failed to load statistics")?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the default mode: startup crawl, then schedule and API
///
/// A failed startup crawl ends the process with an error.
async fn handle_run(config: Config, config_hash: String, crawl_only: bool) -> anyhow::Result<()> {
    let store = init_database(&config.storage.database)
        .with_context(|| format!("Failed to open database {}", config.storage.database))?;
    let crawler = Crawler::new(&config.source).context("Failed to build the page fetcher")?;
    let runner = CycleRunner::new(crawler, storage::share(store), config_hash);

    let report = run_startup_cycle(&runner)
        .await
        .context("Startup crawl failed")?;
    tracing::info!(
        "Startup crawl stored {} items from {} pages (run {})",
        report.stored,
        report.pages,
        report.run_id
    );

    if crawl_only {
        return Ok(());
    }

    let scheduler = start_scheduler(runner.clone(), &config.schedule)
        .await
        .context("Failed to start the crawl schedule")?;

    let addr: SocketAddr = config
        .api
        .bind
        .parse()
        .with_context(|| format!("Invalid bind address {}", config.api.bind))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Query API listening on http://{}", addr);

    let app = api::router(AppState::new(runner));
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    if let Some(mut scheduler) = scheduler {
        if let Err(e) = scheduler.shutdown().await {
            tracing::warn!("Crawl schedule did not shut down cleanly: {}", e);
        }
    }

    tracing::info!("Shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
