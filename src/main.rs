//! # Market Headlines
//!
//! A financial-news headline pipeline that scrapes front pages from public
//! news sites, extracts candidate headlines with text heuristics, and
//! persists them deduplicated to a relational store for downstream
//! sentiment scoring and dashboarding.
//!
//! ## Features
//!
//! - Fetches all configured front pages concurrently over one shared
//!   HTTP client, with browser-like request headers
//! - Extracts headlines from headings, link text, and teaser spans,
//!   filtering noise with a tunable token threshold
//! - Inserts conflict-free: re-scraping an unchanged page stores nothing
//! - Leaves sentiment columns `NULL` for an external scoring pass
//!
//! ## Usage
//!
//! ```sh
//! market_headlines -c ./config/scrape.toml
//! ```
//!
//! ## Architecture
//!
//! The application follows a pipeline architecture:
//! 1. **Fetching**: download every configured front page concurrently
//! 2. **Extraction**: map each page body to an ordered list of headlines
//! 3. **Persistence**: derive a source key per URL and insert only
//!    headlines not already recorded for that source
//!
//! Per-URL failures are isolated; only an unreachable store aborts the
//! run.

use clap::Parser;
use std::error::Error;
use std::path::Path;
use tracing::{error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

use market_headlines::cli::Cli;
use market_headlines::config;
use market_headlines::extractor::extract_headlines;
use market_headlines::fetcher::Fetcher;
use market_headlines::store::HeadlineStore;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("market_headlines starting up");

    // Parse CLI and resolve configuration
    let args = Cli::parse();
    let mut config = config::load_config(args.config.as_deref().map(Path::new))?;
    if !args.urls.is_empty() {
        config.urls = args.urls.clone();
    }
    if let Some(threshold) = args.token_threshold {
        config.token_threshold = threshold;
    }
    info!(
        urls = config.urls.len(),
        token_threshold = config.token_threshold,
        timeout_secs = config.timeout_secs,
        "Configuration resolved"
    );

    // An unreachable store is the one failure the whole run stops for, so
    // fail before any network traffic is spent.
    let store = HeadlineStore::connect(&args.database_url).await.map_err(|e| {
        error!(database_url = %args.database_url, error = %e, "Headline store unavailable");
        e
    })?;

    // ---- Fetch all front pages concurrently ----
    let fetcher = Fetcher::new(&config)?;
    let results = fetcher.fetch_all(&config.urls).await;
    // The fetch phase is over; release the client's connections.
    drop(fetcher);

    // ---- Extract and persist, sequentially per URL ----
    let mut total_inserted = 0usize;
    for (url, result) in &results {
        match result {
            Ok(body) => {
                let headlines = extract_headlines(body, config.token_threshold);

                println!("\nHeadlines from {url}:");
                for (i, headline) in headlines.iter().take(args.preview).enumerate() {
                    println!("{}. {headline}", i + 1);
                }
                println!("Total number of headlines: {}", headlines.len());

                let inserted = store.insert_headlines(url, &headlines).await.map_err(|e| {
                    error!(%url, error = %e, "Persistence failed");
                    e
                })?;
                println!("{inserted} new records inserted");
                total_inserted += inserted;
            }
            Err(e) => {
                println!("\nFailed to fetch {url}: {e}");
            }
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        total_inserted,
        "Execution complete"
    );

    Ok(())
}
