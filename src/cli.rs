//! Command-line interface definitions for Market Headlines.
//!
//! This module defines the CLI arguments and options using the `clap`
//! crate. Pipeline tuning (URL list, token threshold, timeout, headers)
//! lives in the TOML config file; the flags here either locate that file
//! or override individual values for one run.

use clap::Parser;

/// Command-line arguments for the Market Headlines scraper.
///
/// # Examples
///
/// ```sh
/// # Scrape the configured sources into the default database
/// market_headlines
///
/// # Point at an explicit config file and database
/// market_headlines -c ./config/scrape.toml -d sqlite:news.db?mode=rwc
///
/// # One-off scrape of a single source with a looser filter
/// market_headlines --url https://www.ft.com/ --token-threshold 4
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Path to a TOML config file (URL list, token threshold, timeout, headers)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Database URL for the headline store
    #[arg(
        short,
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:headlines.db?mode=rwc"
    )]
    pub database_url: String,

    /// Scrape this URL instead of the configured list (repeatable)
    #[arg(long = "url", value_name = "URL")]
    pub urls: Vec<String>,

    /// Override the configured minimum-token filter for this run
    #[arg(long)]
    pub token_threshold: Option<usize>,

    /// How many headlines to print per source
    #[arg(long, default_value_t = 10)]
    pub preview: usize,
}
