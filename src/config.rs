//! Runtime configuration for the scrape pipeline.
//!
//! Everything the pipeline used to hard-code is an explicit value here: the
//! source URL list, the token threshold separating headlines from nav
//! noise, the per-request timeout, and the browser-like request headers.
//!
//! Configuration is TOML. [`load_config`] resolves the file to read in
//! order of precedence:
//! 1. an explicit `--config` path (must exist)
//! 2. `$MARKET_HEADLINES_CONFIG`
//! 3. `config/scrape.toml` relative to the working directory
//! 4. built-in defaults

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

const ENV_PATH: &str = "MARKET_HEADLINES_CONFIG";
const DEFAULT_PATH: &str = "config/scrape.toml";

/// Pipeline configuration.
///
/// Every field has a default, so a partial TOML file only needs to name
/// the values it overrides.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScrapeConfig {
    /// Front-page URLs to scrape.
    pub urls: Vec<String>,
    /// A candidate string is kept only if it has strictly more than this
    /// many whitespace-separated tokens. Short UI labels, bylines, and
    /// nav links fall below it; sentence-like headlines clear it.
    pub token_threshold: usize,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// HTTP headers sent with every request.
    pub headers: HeaderConfig,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            urls: vec![
                "https://www.ft.com/".to_string(),
                "https://www.investing.com".to_string(),
                "https://www.morningstar.com/".to_string(),
            ],
            token_threshold: 6,
            timeout_secs: 30,
            headers: HeaderConfig::default(),
        }
    }
}

/// Request headers, defaulting to an ordinary desktop-browser profile so
/// sources with trivial bot-blocking serve the same markup they serve a
/// browser.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HeaderConfig {
    pub user_agent: String,
    pub accept: String,
    pub accept_language: String,
    pub referer: String,
    pub dnt: String,
    pub connection: String,
}

impl Default for HeaderConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
                         AppleWebKit/537.36 (KHTML, like Gecko) \
                         Chrome/115.0.0.0 Safari/537.36"
                .to_string(),
            accept: "text/html,application/xhtml+xml,application/xml;q=0.9,\
                     image/avif,image/webp,*/*;q=0.8"
                .to_string(),
            accept_language: "en-US,en;q=0.9".to_string(),
            referer: "https://www.google.com/".to_string(),
            dnt: "1".to_string(),
            connection: "keep-alive".to_string(),
        }
    }
}

/// Load configuration from an explicit TOML file.
pub fn load_config_from(path: &Path) -> Result<ScrapeConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading config from {}", path.display()))?;
    parse_config(&content).with_context(|| format!("parsing config {}", path.display()))
}

/// Load configuration using the documented fallback chain.
///
/// An explicit path that does not exist is an error; a missing fallback
/// file just moves on to the next candidate.
pub fn load_config(explicit: Option<&Path>) -> Result<ScrapeConfig> {
    if let Some(p) = explicit {
        return load_config_from(p);
    }
    if let Ok(p) = std::env::var(ENV_PATH) {
        let pb = PathBuf::from(p);
        if !pb.exists() {
            return Err(anyhow!("{ENV_PATH} points to a non-existent path"));
        }
        return load_config_from(&pb);
    }
    let default = PathBuf::from(DEFAULT_PATH);
    if default.exists() {
        return load_config_from(&default);
    }
    Ok(ScrapeConfig::default())
}

fn parse_config(s: &str) -> Result<ScrapeConfig> {
    let config: ScrapeConfig = toml::from_str(s)?;
    if config.urls.iter().any(|u| u.trim().is_empty()) {
        return Err(anyhow!("config contains an empty source URL"));
    }
    Ok(config)
}
