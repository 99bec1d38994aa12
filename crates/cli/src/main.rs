//! Price feed command line.
//!
//! `fetch` pulls recently sold listings into the snapshot store; `feed`
//! computes the smoothed price-per-square-foot series from a snapshot.

mod report;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use pricefeed_core::{Config, Snapshot};
use pricefeed_features::FeedEngine;
use pricefeed_ingestion::{SearchClient, SnapshotStore};
use std::path::PathBuf;
use tracing::warn;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Parser, Debug)]
#[command(name = "pricefeed")]
#[command(version, about = "Smoothed price-per-square-foot feed from recent home sales")]
struct Args {
    /// JSON configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// SQLite snapshot store (overrides the config file)
    #[arg(long, global = true)]
    db: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch recently sold listings and store them as a snapshot
    Fetch {
        /// Number of result pages to request
        #[arg(long)]
        pages: Option<u32>,

        /// Also write the snapshot to this JSON file
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Compute the price feed from a snapshot
    Feed {
        /// Snapshot JSON file (defaults to the latest stored snapshot)
        #[arg(long, conflicts_with = "snapshot")]
        input: Option<PathBuf>,

        /// Stored snapshot id
        #[arg(long)]
        snapshot: Option<i64>,

        /// Rolling window size in days
        #[arg(short, long)]
        window: Option<usize>,

        /// IQR multiplier for outlier removal
        #[arg(short, long)]
        multiplier: Option<f64>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// List stored snapshots
    List,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Logs go to stderr so stdout stays clean for reports.
    tracing_subscriber::registry()
        .with(log_filter(std::env::var(EnvFilter::DEFAULT_ENV).ok().as_deref()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = match &args.config {
        Some(path) => Config::from_json_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Config::default(),
    };
    if let Some(db) = args.db {
        config.store.path = db;
    }

    match args.command {
        Command::Fetch { pages, output } => {
            if let Some(pages) = pages {
                config.source.max_pages = pages;
            }
            fetch(config, output).await
        }
        Command::Feed {
            input,
            snapshot,
            window,
            multiplier,
            json,
        } => {
            if let Some(window) = window {
                config.feed.window = window;
            }
            if let Some(multiplier) = multiplier {
                config.feed.iqr_multiplier = multiplier;
            }
            feed(&config, input, snapshot, json)
        }
        Command::List => list(&config),
    }
}

/// Log filter from `RUST_LOG`, falling back to `info` when unset or invalid.
fn log_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .filter(|d| !d.trim().is_empty())
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_LEVEL))
}

async fn fetch(config: Config, output: Option<PathBuf>) -> anyhow::Result<()> {
    let mut store = SnapshotStore::open(&config.store.path)?;
    let client = SearchClient::new(config.source)?;

    let outcome = client.fetch_all().await;
    if let Some(reason) = &outcome.stopped_early {
        warn!(%reason, "Fetch stopped early, keeping partial snapshot");
    }
    if outcome.snapshot.is_empty() {
        bail!("no listings collected");
    }

    let id = store.save(&outcome.snapshot)?;
    println!(
        "Collected {} listings from {} page(s) into snapshot {id} ({} skipped)",
        outcome.snapshot.len(),
        outcome.pages_fetched,
        outcome.stats.skipped()
    );

    if let Some(path) = output {
        std::fs::write(&path, serde_json::to_string_pretty(&outcome.snapshot)?)
            .with_context(|| format!("writing {}", path.display()))?;
    }

    Ok(())
}

fn load_snapshot(config: &Config, input: Option<PathBuf>, id: Option<i64>) -> anyhow::Result<Snapshot> {
    if let Some(path) = input {
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?;
        return Ok(serde_json::from_str(&text)?);
    }

    let store = SnapshotStore::open(&config.store.path)?;
    let snapshot = match id {
        Some(id) => store.load(id)?,
        None => store.latest()?,
    };
    snapshot.context("no stored snapshot; run `pricefeed fetch` first")
}

fn feed(config: &Config, input: Option<PathBuf>, id: Option<i64>, json: bool) -> anyhow::Result<()> {
    let snapshot = load_snapshot(config, input, id)?;
    let engine = FeedEngine::new(&config.feed)?;
    let report = engine.run_snapshot(&snapshot);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report::render(&report));
    }
    Ok(())
}

fn list(config: &Config) -> anyhow::Result<()> {
    let store = SnapshotStore::open(&config.store.path)?;
    for info in store.list()? {
        println!(
            "{:>5}  {}  {} listings",
            info.id,
            info.fetched_at.format("%Y-%m-%d %H:%M:%S UTC"),
            info.transaction_count
        );
    }
    Ok(())
}
