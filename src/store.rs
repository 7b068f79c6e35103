//! Headline persistence with conflict-free inserts.
//!
//! The store owns the only database handle in the pipeline. Persistence
//! runs after the fetch phase has fully completed, one URL batch at a
//! time, so no concurrent-write coordination is needed.
//!
//! Duplicate handling is pushed into the database: `(source, headline)`
//! carries a unique constraint and every insert is
//! `ON CONFLICT DO NOTHING`, so re-scraping an unchanged page is a no-op
//! rather than an error. Each insert auto-commits independently; a batch
//! interrupted partway keeps the rows that already landed.

use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::models::Headline;

/// Matches the scheme, skips an optional `www.`/`edition.` prefix, and
/// captures the next host label.
static SOURCE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"https?://(?:www\.|edition\.)?([a-zA-Z0-9-]+)\.").unwrap());

/// A store failure. Conflicts are not errors; they surface as
/// `inserted = false` from [`HeadlineStore::insert_if_absent`]. Both
/// variants here are fatal for the run's persistence step.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("could not open the headline store: {0}")]
    Unavailable(#[source] sqlx::Error),
    #[error("headline store query failed: {0}")]
    Query(#[source] sqlx::Error),
}

/// Derive the short source label from a page URL.
///
/// `https://www.ft.com/` -> `ft`, `https://edition.cnn.com/markets` ->
/// `cnn`. The label is the first host label after the stripped optional
/// prefix, so a multi-level host like `news.bbc.co.uk` yields `news`. A
/// URL the pattern cannot match yields `None`; the headline batch is still
/// stored, just without a source tag.
pub fn source_from_url(url: &str) -> Option<String> {
    SOURCE_PATTERN
        .captures(url)
        .map(|captures| captures[1].to_string())
}

/// SQLite-backed headline store.
pub struct HeadlineStore {
    pool: SqlitePool,
}

impl HeadlineStore {
    /// Open (and if necessary create) the store at the given URL.
    ///
    /// # Example URLs
    /// - `sqlite:headlines.db?mode=rwc` - file database, created on demand
    /// - `sqlite::memory:` - ephemeral in-memory database
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await
            .map_err(StoreError::Unavailable)?;

        let store = Self { pool };
        store.run_migrations().await?;
        Ok(store)
    }

    /// Create an in-memory store (for testing).
    ///
    /// Capped at one connection: every pooled connection to `:memory:` is
    /// its own empty database, so the pool must never open a second one.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .map_err(StoreError::Unavailable)?;

        let store = Self { pool };
        store.run_migrations().await?;
        Ok(store)
    }

    async fn run_migrations(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS headlines (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                source TEXT,
                headline TEXT NOT NULL,
                url TEXT NOT NULL,
                scraped TEXT NOT NULL,
                sentiment TEXT,
                sentiment_score REAL,
                UNIQUE(source, headline)
            );

            CREATE INDEX IF NOT EXISTS idx_headlines_sentiment ON headlines(sentiment);
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(StoreError::Query)?;

        Ok(())
    }

    /// Persist one URL's extracted headlines, returning how many rows were
    /// actually inserted (skipped duplicates excluded).
    ///
    /// Each insert is attempted independently: a conflict on one headline
    /// never blocks the rest of the batch.
    #[instrument(level = "info", skip_all, fields(%url, candidates = headlines.len()))]
    pub async fn insert_headlines(
        &self,
        url: &str,
        headlines: &[String],
    ) -> Result<usize, StoreError> {
        let source = source_from_url(url);
        let mut inserted = 0usize;
        for headline in headlines {
            if self
                .insert_if_absent(source.as_deref(), headline, url)
                .await?
            {
                inserted += 1;
            }
        }
        info!(
            inserted,
            skipped = headlines.len() - inserted,
            source = source.as_deref().unwrap_or("-"),
            "Stored headline batch"
        );
        Ok(inserted)
    }

    /// Insert a single headline unless `(source, headline)` already
    /// exists. Returns whether a row was written.
    ///
    /// The `scraped` timestamp is taken here, at the moment of the
    /// individual insert, not once per batch.
    pub async fn insert_if_absent(
        &self,
        source: Option<&str>,
        headline: &str,
        url: &str,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO headlines (source, headline, url, scraped)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(source, headline) DO NOTHING
            "#,
        )
        .bind(source)
        .bind(headline)
        .bind(url)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(StoreError::Query)?;

        let inserted = result.rows_affected() > 0;
        if !inserted {
            debug!(source = source.unwrap_or("-"), headline, "Duplicate skipped");
        }
        Ok(inserted)
    }

    /// Rows the sentiment pass has not labeled yet, oldest first.
    pub async fn unscored(&self) -> Result<Vec<Headline>, StoreError> {
        sqlx::query_as::<_, Headline>(
            "SELECT id, source, headline, url, scraped, sentiment, sentiment_score \
             FROM headlines WHERE sentiment IS NULL ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::Query)
    }

    /// Record a sentiment score and label for one row.
    pub async fn update_sentiment(
        &self,
        id: i64,
        score: f64,
        label: &str,
    ) -> Result<(), StoreError> {
        sqlx::query("UPDATE headlines SET sentiment_score = ?, sentiment = ? WHERE id = ?")
            .bind(score)
            .bind(label)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(StoreError::Query)?;
        Ok(())
    }

    /// Total number of stored headlines.
    pub async fn count(&self) -> Result<i64, StoreError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM headlines")
            .fetch_one(&self.pool)
            .await
            .map_err(StoreError::Query)?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch(headlines: &[&str]) -> Vec<String> {
        headlines.iter().map(|h| h.to_string()).collect()
    }

    #[test]
    fn source_is_the_label_after_the_stripped_prefix() {
        assert_eq!(source_from_url("https://www.ft.com/"), Some("ft".into()));
        assert_eq!(
            source_from_url("https://edition.cnn.com/markets"),
            Some("cnn".into())
        );
        assert_eq!(
            source_from_url("https://example.org/a"),
            Some("example".into())
        );
        // Multi-level hosts keep the first label after the prefix.
        assert_eq!(
            source_from_url("https://news.bbc.co.uk/business"),
            Some("news".into())
        );
    }

    #[test]
    fn unmatched_urls_yield_no_source() {
        assert_eq!(source_from_url("not a url"), None);
        assert_eq!(source_from_url("ftp://www.ft.com/"), None);
        assert_eq!(source_from_url("https://localhost/"), None);
    }

    #[tokio::test]
    async fn insert_then_duplicate_is_skipped() {
        let store = HeadlineStore::in_memory().await.unwrap();
        let headline = "Markets rally on strong earnings report today";

        assert!(
            store
                .insert_if_absent(Some("ft"), headline, "https://www.ft.com/")
                .await
                .unwrap()
        );
        assert!(
            !store
                .insert_if_absent(Some("ft"), headline, "https://www.ft.com/")
                .await
                .unwrap()
        );
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn same_headline_under_another_source_is_a_new_row() {
        let store = HeadlineStore::in_memory().await.unwrap();
        let headline = "Central banks weigh coordinated response to market turmoil";

        assert!(
            store
                .insert_if_absent(Some("ft"), headline, "https://www.ft.com/")
                .await
                .unwrap()
        );
        assert!(
            store
                .insert_if_absent(Some("cnn"), headline, "https://edition.cnn.com/")
                .await
                .unwrap()
        );
        assert_eq!(store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn batch_reports_only_newly_inserted_rows() {
        let store = HeadlineStore::in_memory().await.unwrap();
        let url = "https://www.ft.com/";

        let first = batch(&[
            "Markets rally on strong earnings report today",
            "Oil prices slide as supply concerns ease further",
        ]);
        assert_eq!(store.insert_headlines(url, &first).await.unwrap(), 2);

        // One duplicate, one new headline: only the new one counts.
        let second = batch(&[
            "Markets rally on strong earnings report today",
            "Dollar weakens against major currencies in early trading",
        ]);
        assert_eq!(store.insert_headlines(url, &second).await.unwrap(), 1);
        assert_eq!(store.count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn rerunning_an_unchanged_batch_inserts_nothing() {
        let store = HeadlineStore::in_memory().await.unwrap();
        let url = "https://www.morningstar.com/";
        let headlines = batch(&[
            "Fund managers rotate into defensive sectors amid uncertainty",
            "Retail investors pile into short-dated treasury bills again",
        ]);

        assert_eq!(store.insert_headlines(url, &headlines).await.unwrap(), 2);
        assert_eq!(store.insert_headlines(url, &headlines).await.unwrap(), 0);
        assert_eq!(store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn empty_batch_inserts_zero_rows() {
        let store = HeadlineStore::in_memory().await.unwrap();
        assert_eq!(
            store
                .insert_headlines("https://www.ft.com/", &[])
                .await
                .unwrap(),
            0
        );
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn pattern_less_url_is_stored_with_null_source() {
        let store = HeadlineStore::in_memory().await.unwrap();
        let headlines = batch(&["Exchange outage halts trading for several hours on Tuesday"]);

        assert_eq!(
            store
                .insert_headlines("https://localhost/", &headlines)
                .await
                .unwrap(),
            1
        );
        let rows = store.unscored().await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].source, None);
    }

    #[tokio::test]
    async fn sentiment_update_removes_row_from_unscored() {
        let store = HeadlineStore::in_memory().await.unwrap();
        let url = "https://www.ft.com/";
        let headlines = batch(&[
            "Markets rally on strong earnings report today",
            "Banking shares tumble after surprise profit warning issued",
        ]);
        store.insert_headlines(url, &headlines).await.unwrap();

        let rows = store.unscored().await.unwrap();
        assert_eq!(rows.len(), 2);

        store
            .update_sentiment(rows[0].id, 0.6, "positive")
            .await
            .unwrap();

        let remaining = store.unscored().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, rows[1].id);
    }
}
