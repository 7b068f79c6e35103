//! Concurrent front-page fetching.
//!
//! One [`Fetcher`] is created per run and holds the single shared
//! [`reqwest::Client`] every request of that run multiplexes over. All
//! URLs are issued at once and joined; the fetch phase therefore costs as
//! long as the slowest response, not the sum. Dropping the `Fetcher` at
//! the end of the run releases the client's connections.
//!
//! Failures are per URL: a timeout, connection reset, or non-2xx status
//! marks that URL failed and leaves its siblings untouched.

use futures::future::join_all;
use reqwest::StatusCode;
use reqwest::header::{
    ACCEPT, ACCEPT_LANGUAGE, CONNECTION, DNT, HeaderMap, HeaderValue, REFERER,
};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info, instrument};

use crate::config::ScrapeConfig;

/// A failed fetch for one URL.
///
/// Transport covers everything `reqwest` reports itself (DNS, connect,
/// timeout, TLS, body read); `Status` is a completed response outside the
/// 2xx range.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("HTTP {status} for {url}")]
    Status { url: String, status: StatusCode },
}

/// Issues concurrent GET requests with a browser-like header set.
pub struct Fetcher {
    client: reqwest::Client,
}

impl Fetcher {
    /// Build a fetcher from configuration.
    ///
    /// The header set, timeout, and redirect cap apply to every request
    /// the fetcher makes.
    pub fn new(config: &ScrapeConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(config.headers.user_agent.as_str())
            .default_headers(Self::header_map(config))
            .timeout(Duration::from_secs(config.timeout_secs))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;
        Ok(Self { client })
    }

    fn header_map(config: &ScrapeConfig) -> HeaderMap {
        let mut headers = HeaderMap::new();
        let pairs = [
            (ACCEPT, &config.headers.accept),
            (ACCEPT_LANGUAGE, &config.headers.accept_language),
            (REFERER, &config.headers.referer),
            (DNT, &config.headers.dnt),
            (CONNECTION, &config.headers.connection),
        ];
        for (name, value) in pairs {
            match HeaderValue::from_str(value) {
                Ok(v) => {
                    headers.insert(name, v);
                }
                Err(_) => {
                    // A malformed configured value falls back to no header
                    // rather than failing construction.
                    error!(header = %name, value = %value, "Skipping invalid header value");
                }
            }
        }
        headers
    }

    /// Fetch every URL concurrently, returning one result per URL.
    ///
    /// Results are paired with their originating URL regardless of
    /// completion order. Failed URLs are logged here; callers decide what
    /// to do with the error beyond that.
    #[instrument(level = "info", skip_all, fields(url_count = urls.len()))]
    pub async fn fetch_all(&self, urls: &[String]) -> Vec<(String, Result<String, FetchError>)> {
        let bodies = join_all(urls.iter().map(|url| self.fetch_page(url))).await;

        let results: Vec<(String, Result<String, FetchError>)> =
            urls.iter().cloned().zip(bodies).collect();

        let failed = results.iter().filter(|(_, r)| r.is_err()).count();
        for (url, result) in &results {
            if let Err(e) = result {
                error!(%url, error = %e, "Fetch failed");
            }
        }
        info!(
            fetched = results.len() - failed,
            failed,
            "Fetch phase complete"
        );
        results
    }

    async fn fetch_page(&self, url: &str) -> Result<String, FetchError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }
        let body = response.text().await?;
        debug!(%url, bytes = body.len(), "Fetched page");
        Ok(body)
    }
}
