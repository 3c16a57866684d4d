//! On-demand job scans.
//!
//! Output is JSON on stdout; logs go to stderr.

mod config;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use job_scraper::{
    HttpFetcher, ListingQuery, ListingReader, Portal, ScanSummary, Scanner, SqliteStore,
};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;

#[derive(Parser)]
#[command(name = "jobscan")]
#[command(about = "Scan job portals and inspect stored listings")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan portals for one or more roles
    Scan {
        /// Role to scan (repeatable); defaults to SCAN_ROLES
        #[arg(long = "role")]
        roles: Vec<String>,

        /// Portal to scan (repeatable); defaults to all portals
        #[arg(long = "portal")]
        portals: Vec<Portal>,
    },

    /// List stored listings, newest first
    List {
        /// Role slug or role name
        #[arg(long)]
        role: Option<String>,

        #[arg(long)]
        source: Option<Portal>,

        #[arg(long, default_value_t = 100)]
        limit: usize,
    },

    /// Show stored listing counts
    Stats,
}

#[derive(Serialize)]
struct ScanResponse {
    inserted: usize,
    summaries: Vec<ScanSummary>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,job_scraper=debug,sqlx=warn".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_line_number(true),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    match cli.command {
        Commands::Scan { roles, portals } => cmd_scan(&config, roles, portals).await,
        Commands::List {
            role,
            source,
            limit,
        } => cmd_list(&config, role, source, limit).await,
        Commands::Stats => cmd_stats(&config).await,
    }
}

async fn open_store(config: &Config) -> Result<SqliteStore> {
    SqliteStore::new(&config.database_url)
        .await
        .context("Failed to open listing database")
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// ============================================================================
// Commands
// ============================================================================

async fn cmd_scan(config: &Config, roles: Vec<String>, portals: Vec<Portal>) -> Result<()> {
    let roles = if roles.is_empty() {
        config.roles.clone()
    } else {
        roles
    };
    if roles.is_empty() {
        bail!("No roles to scan: pass --role or set SCAN_ROLES");
    }
    let portals = if portals.is_empty() {
        Portal::ALL.to_vec()
    } else {
        portals
    };

    let store = open_store(config).await?;
    let fetcher =
        HttpFetcher::new(config.fetch.clone()).context("Failed to build HTTP client")?;
    let scanner = Scanner::new(fetcher, store, config.scan.clone())?;

    tracing::info!(roles = roles.len(), portals = portals.len(), "Starting jobscan");
    let summaries = scanner.scan_roles(&roles, &portals).await;

    print_json(&ScanResponse {
        inserted: summaries.iter().map(ScanSummary::inserted).sum(),
        summaries,
    })
}

async fn cmd_list(
    config: &Config,
    role: Option<String>,
    source: Option<Portal>,
    limit: usize,
) -> Result<()> {
    let store = open_store(config).await?;

    let mut query = ListingQuery::new().with_limit(limit);
    if let Some(role) = role {
        query = query.for_role(job_scraper::slugify(&role));
    }
    if let Some(source) = source {
        query = query.from_source(source);
    }

    let listings = store.list(&query).await.context("Failed to list listings")?;
    print_json(&listings)
}

async fn cmd_stats(config: &Config) -> Result<()> {
    let store = open_store(config).await?;
    let stats = store
        .stats(Utc::now())
        .await
        .context("Failed to compute stats")?;
    print_json(&stats)
}
