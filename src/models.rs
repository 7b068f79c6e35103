//! Data models for scraped headlines.
//!
//! Two shapes flow through the pipeline:
//! - [`FetchedPage`]: a raw page body paired with the URL it came from,
//!   produced by the fetcher before extraction
//! - [`Headline`]: one stored headline row, as persisted by the store and
//!   read back by the sentiment pass

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// A raw page body as downloaded from a news front page.
///
/// Only successfully fetched pages become `FetchedPage`s; failed URLs are
/// carried separately so one broken source never hides its siblings.
#[derive(Debug)]
pub struct FetchedPage {
    /// The URL the body was fetched from.
    pub url: String,
    /// The full response body text.
    pub body: String,
}

/// One stored headline row.
///
/// Rows are created exclusively by the store's conflict-free insert; the
/// `(source, headline)` pair is unique, so re-scraping an unchanged page
/// adds nothing. The sentiment fields start out `NULL` and are filled in
/// later by the scoring pass.
#[derive(Debug, Clone, FromRow)]
pub struct Headline {
    /// Surrogate key assigned by the store.
    pub id: i64,
    /// Short publication label derived from the URL host (e.g. `ft`,
    /// `cnn`), or `None` when the host matched no known pattern.
    pub source: Option<String>,
    /// The extracted headline text, whitespace-trimmed.
    pub headline: String,
    /// The page URL the headline was extracted from.
    pub url: String,
    /// Insertion timestamp, assigned at write time.
    pub scraped: DateTime<Utc>,
    /// Three-way sentiment label, filled in by the scoring pass.
    pub sentiment: Option<String>,
    /// Compound sentiment score, filled in by the scoring pass.
    pub sentiment_score: Option<f64>,
}
