// Data models — the values that flow from the post source through the
// pipeline to the presenters.
//
// Everything here is transient: a request produces them, a presenter renders
// them, and only the analysis cache keeps them around for a while.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Compound scores at or above this are positive.
pub const POSITIVE_THRESHOLD: f64 = 0.05;

/// Compound scores at or below this are negative.
pub const NEGATIVE_THRESHOLD: f64 = -0.05;

/// A post as delivered by a post source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub title: String,
    /// Net engagement score assigned by the platform (can go negative)
    pub score: i64,
    pub url: String,
}

/// Emotion label derived from a title's compound sentiment score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Positive,
    Negative,
    Neutral,
}

impl Emotion {
    /// All labels, in the order used to break ties when ranking counts.
    pub const ALL: [Emotion; 3] = [Emotion::Positive, Emotion::Negative, Emotion::Neutral];

    /// Map a compound score to a label.
    ///
    /// Positive is checked first, so the boundaries are inclusive on both
    /// sides: 0.05 is positive, -0.05 is negative, anything strictly between
    /// is neutral.
    pub fn from_compound(compound: f64) -> Self {
        match compound {
            c if c >= POSITIVE_THRESHOLD => Emotion::Positive,
            c if c <= NEGATIVE_THRESHOLD => Emotion::Negative,
            _ => Emotion::Neutral,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Positive => "positive",
            Emotion::Negative => "negative",
            Emotion::Neutral => "neutral",
        }
    }
}

impl std::fmt::Display for Emotion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One row of the result table. Field order is the column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzedPost {
    pub title: String,
    pub score: i64,
    pub emotion: Emotion,
    pub url: String,
}

/// The outcome of one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Analysis {
    /// Matching posts in the order the source returned them
    pub posts: Vec<AnalyzedPost>,
    /// How many posts the source returned before keyword filtering
    pub fetched: usize,
    /// Matching posts dropped because their title could not be classified
    pub skipped: usize,
    pub analyzed_at: DateTime<Utc>,
}

impl Analysis {
    /// True when the source answered but nothing matched the keyword.
    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }
}
