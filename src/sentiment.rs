//! Sentiment labeling contract for stored headlines.
//!
//! The scoring model itself lives outside this crate; anything that can
//! turn headline text into a compound score plugs in through
//! [`SentimentScorer`]. What is fixed here is everything downstream of the
//! score: the label thresholds and the read-score-write round-trip over
//! rows the pipeline has not labeled yet.

use tracing::{info, instrument};

use crate::store::{HeadlineStore, StoreError};

/// Scores at or above this are labeled positive.
pub const POSITIVE_MIN: f64 = 0.05;
/// Scores strictly below this are labeled negative.
pub const NEGATIVE_MAX: f64 = -0.05;

/// External capability: turn headline text into a compound score.
pub trait SentimentScorer {
    fn score(&self, headline: &str) -> f64;
}

/// Three-way sentiment classification of a compound score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    /// Classify a compound score: at or above 0.05 positive, strictly
    /// below -0.05 negative, everything between neutral.
    pub fn from_score(score: f64) -> Self {
        if score >= POSITIVE_MIN {
            Self::Positive
        } else if score < NEGATIVE_MAX {
            Self::Negative
        } else {
            Self::Neutral
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
            Self::Neutral => "neutral",
        }
    }
}

/// Score and label every unscored row, returning how many were updated.
///
/// Rows are processed oldest first; each update commits independently, so
/// an interrupted pass resumes where it left off on the next run.
#[instrument(level = "info", skip_all)]
pub async fn score_pending<S: SentimentScorer>(
    store: &HeadlineStore,
    scorer: &S,
) -> Result<usize, StoreError> {
    let rows = store.unscored().await?;
    let mut updated = 0usize;
    for row in &rows {
        let score = scorer.score(&row.headline);
        let label = SentimentLabel::from_score(score);
        store.update_sentiment(row.id, score, label.as_str()).await?;
        updated += 1;
    }
    info!(updated, "Labeled pending headlines");
    Ok(updated)
}
